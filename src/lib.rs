//! Path view-model for the gitdeck Git client.
//!
//! A [`PathViewModel`] tracks one filesystem path, asks the git server what
//! that path is, and exposes either a repository view or a directory browser
//! with clone / init / create-directory actions.

pub mod config;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod view;

pub use config::AgentConfig;
pub use error::{BackendError, BackendResult, ConfigError};
pub use events::{ProgramEvent, ProgramEvents};
pub use services::git::{GitBackend, HttpBackend};
pub use view::{PathStatus, PathView, PathViewContext, PathViewModel};
