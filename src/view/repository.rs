use std::sync::Arc;
use std::time::Duration;

use crate::events::ProgramEvents;
use crate::services::git::GitBackend;
use crate::state::Observable;
use crate::ProgramEvent;

/// The repository view shown once a path resolves to a git repository.
///
/// Owned by exactly one path view, which calls [`RepositoryModel::shutdown`]
/// before dropping it.
pub trait RepositoryModel: Send + Sync {
    fn on_program_event(&self, event: &ProgramEvent);

    fn update_animation_frame(&self, delta: Duration);

    /// Releases subscriptions and background work. Called once.
    fn shutdown(&self);
}

/// What a repository view is bound to when it is created.
#[derive(Clone)]
pub struct RepositoryContext {
    /// The owning path view's path cell; follows root adoption.
    pub path: Observable<String>,
    pub backend: Arc<dyn GitBackend>,
    pub events: ProgramEvents,
}

pub trait RepositoryFactory: Send + Sync {
    fn create(&self, context: RepositoryContext) -> Arc<dyn RepositoryModel>;
}

impl<F> RepositoryFactory for F
where
    F: Fn(RepositoryContext) -> Arc<dyn RepositoryModel> + Send + Sync,
{
    fn create(&self, context: RepositoryContext) -> Arc<dyn RepositoryModel> {
        self(context)
    }
}
