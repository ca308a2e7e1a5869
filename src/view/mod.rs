pub mod directories;
pub mod host;
pub mod path_view;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use directories::{ChangeCounts, DirectoryEntry};
pub use host::{repository_target, Navigator, RejectionReporter, TracingRejectionReporter};
pub use path_view::{PathStatus, PathView, PathViewContext, PathViewModel};
pub use repository::{RepositoryContext, RepositoryFactory, RepositoryModel};
