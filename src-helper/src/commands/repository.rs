use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gitdeck::state::Observable;
use gitdeck::view::{RepositoryContext, RepositoryModel};
use gitdeck::ProgramEvent;

/// Stand-in repository view for the headless agent: it only logs.
pub struct LoggedRepository {
    path: Observable<String>,
    closed: AtomicBool,
}

impl LoggedRepository {
    pub fn create(ctx: RepositoryContext) -> Arc<dyn RepositoryModel> {
        tracing::info!(path = %ctx.path.get(), "repository view opened");
        Arc::new(Self { path: ctx.path, closed: AtomicBool::new(false) })
    }
}

impl RepositoryModel for LoggedRepository {
    fn on_program_event(&self, event: &ProgramEvent) {
        tracing::debug!(path = %self.path.get(), event = event.name(), "repository event");
    }

    fn update_animation_frame(&self, _delta: Duration) {}

    fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!(path = %self.path.get(), "repository view closed");
        }
    }
}
