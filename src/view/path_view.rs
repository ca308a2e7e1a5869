use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::directories::{merge_listing, DirectoryEntry};
use super::host::{repository_target, Navigator, RejectionReporter, TracingRejectionReporter};
use super::repository::{RepositoryContext, RepositoryFactory, RepositoryModel};
use crate::config::{AgentConfig, DEFAULT_FETCH_REMOTE, DEFAULT_FILE_LIMIT};
use crate::events::{ProgramEvent, ProgramEvents};
use crate::services::address::parse_address;
use crate::services::git::{CloneRequest, GitBackend, QuickStatus};
use crate::state::Observable;

pub const DEFAULT_CLONE_DESTINATION: &str = "destination folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStatus {
    Loading,
    Inited,
    Bare,
    Uninited,
    NoSuchPath,
    Cloning,
}

impl PathStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStatus::Loading => "loading",
            PathStatus::Inited => "inited",
            PathStatus::Bare => "bare",
            PathStatus::Uninited => "uninited",
            PathStatus::NoSuchPath => "no-such-path",
            PathStatus::Cloning => "cloning",
        }
    }

    pub fn is_repository(&self) -> bool {
        matches!(self, PathStatus::Inited | PathStatus::Bare)
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborators a [`PathViewModel`] is wired to.
#[derive(Clone)]
pub struct PathViewContext {
    pub backend: Arc<dyn GitBackend>,
    pub events: ProgramEvents,
    pub navigator: Arc<dyn Navigator>,
    pub reporter: Arc<dyn RejectionReporter>,
    pub repositories: Arc<dyn RepositoryFactory>,
    pub file_limit: u32,
    pub fetch_remote: String,
}

impl PathViewContext {
    pub fn new(
        backend: Arc<dyn GitBackend>,
        events: ProgramEvents,
        navigator: Arc<dyn Navigator>,
        repositories: Arc<dyn RepositoryFactory>,
    ) -> Self {
        Self {
            backend,
            events,
            navigator,
            reporter: Arc::new(TracingRejectionReporter),
            repositories,
            file_limit: DEFAULT_FILE_LIMIT,
            fetch_remote: DEFAULT_FETCH_REMOTE.to_string(),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn RejectionReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_config(mut self, config: &AgentConfig) -> Self {
        self.file_limit = config.file_limit;
        self.fetch_remote = config.fetch_remote.clone();
        self
    }
}

/// Serializable picture of the whole view, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathView {
    pub path: String,
    pub dir_name: String,
    pub status: PathStatus,
    pub clone_url: String,
    pub clone_destination: String,
    pub clone_destination_implicit: String,
    pub is_recursive_submodule: bool,
    pub show_directory_created_alert: bool,
    pub has_repository: bool,
    pub directories: Vec<DirectoryEntry>,
}

struct Inner {
    ctx: PathViewContext,
    path: Observable<String>,
    status: Observable<PathStatus>,
    clone_url: Observable<String>,
    clone_destination: Observable<String>,
    is_recursive_submodule: Observable<bool>,
    show_directory_created_alert: Observable<bool>,
    directories: Observable<Vec<DirectoryEntry>>,
    repository: Mutex<Option<Arc<dyn RepositoryModel>>>,
    generation: AtomicU64,
    subscription: Mutex<Option<Uuid>>,
}

/// View-model for a filesystem path: either a repository, or a place to
/// clone, init or pick a repository from.
///
/// Cloning is cheap and shares state.
#[derive(Clone)]
pub struct PathViewModel {
    inner: Arc<Inner>,
}

impl PathViewModel {
    pub fn new(ctx: PathViewContext, path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                path: Observable::new(path.into()),
                status: Observable::new(PathStatus::Loading),
                clone_url: Observable::default(),
                clone_destination: Observable::default(),
                is_recursive_submodule: Observable::new(true),
                show_directory_created_alert: Observable::new(false),
                directories: Observable::default(),
                repository: Mutex::new(None),
                generation: AtomicU64::new(0),
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Subscribes to the program event bus. Idempotent.
    pub fn attach(&self) {
        let mut subscription = lock(&self.inner.subscription);
        if subscription.is_some() {
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let id = self.inner.ctx.events.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                PathViewModel { inner }.on_program_event(event);
            }
        });
        *subscription = Some(id);
    }

    /// Leaves the event bus and shuts the repository view down.
    pub fn detach(&self) {
        if let Some(id) = lock(&self.inner.subscription).take() {
            self.inner.ctx.events.unsubscribe(id);
        }
        self.release_repository();
    }

    // Observable state.

    pub fn path(&self) -> String {
        self.inner.path.get()
    }

    pub fn path_cell(&self) -> &Observable<String> {
        &self.inner.path
    }

    /// Last segment of the path, or `/` for the root.
    pub fn dir_name(&self) -> String {
        self.inner.path.with(|p| dir_name_of(p))
    }

    pub fn status(&self) -> PathStatus {
        self.inner.status.get()
    }

    pub fn status_cell(&self) -> &Observable<PathStatus> {
        &self.inner.status
    }

    pub fn directories(&self) -> Vec<DirectoryEntry> {
        self.inner.directories.get()
    }

    pub fn directories_cell(&self) -> &Observable<Vec<DirectoryEntry>> {
        &self.inner.directories
    }

    pub fn show_directory_created_alert(&self) -> bool {
        self.inner.show_directory_created_alert.get()
    }

    pub fn dismiss_directory_created_alert(&self) {
        self.inner.show_directory_created_alert.set(false);
    }

    pub fn repository(&self) -> Option<Arc<dyn RepositoryModel>> {
        lock(&self.inner.repository).clone()
    }

    pub fn has_repository(&self) -> bool {
        lock(&self.inner.repository).is_some()
    }

    // Clone form.

    pub fn set_clone_url(&self, url: impl Into<String>) {
        self.inner.clone_url.set(url.into());
    }

    pub fn set_clone_destination(&self, destination: impl Into<String>) {
        self.inner.clone_destination.set(destination.into());
    }

    pub fn set_recursive_submodule(&self, recursive: bool) {
        self.inner.is_recursive_submodule.set(recursive);
    }

    /// Destination used when none is typed in: the project name from the url.
    pub fn clone_destination_implicit(&self) -> String {
        self.inner
            .clone_url
            .with(|url| parse_address(url).map(|a| a.short_project))
            .unwrap_or_else(|| DEFAULT_CLONE_DESTINATION.to_string())
    }

    fn clone_destination_effective(&self) -> String {
        let explicit = self.inner.clone_destination.get();
        if explicit.trim().is_empty() {
            self.clone_destination_implicit()
        } else {
            explicit
        }
    }

    pub fn render(&self) -> PathView {
        PathView {
            path: self.path(),
            dir_name: self.dir_name(),
            status: self.status(),
            clone_url: self.inner.clone_url.get(),
            clone_destination: self.inner.clone_destination.get(),
            clone_destination_implicit: self.clone_destination_implicit(),
            is_recursive_submodule: self.inner.is_recursive_submodule.get(),
            show_directory_created_alert: self.show_directory_created_alert(),
            has_repository: self.has_repository(),
            directories: self.directories(),
        }
    }

    // Operations.

    /// Called by the host when the view becomes visible.
    pub async fn shown(&self) {
        self.refresh_status().await;
    }

    /// Classifies the current path and updates state to match.
    ///
    /// Failures leave state untouched. A response that comes back after a
    /// newer refresh has started is dropped.
    pub async fn refresh_status(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.path();

        let quick = match self.inner.ctx.backend.quick_status(&path).await {
            Ok(quick) => quick,
            Err(err) => {
                debug!(%path, error = %err, "quickstatus failed");
                return;
            }
        };
        if self.is_stale(generation) {
            debug!(%path, generation, "dropping stale quickstatus");
            return;
        }

        match quick {
            QuickStatus::Inited { git_root_path } => self.enter_repository(git_root_path, PathStatus::Inited),
            QuickStatus::Bare { git_root_path } => self.enter_repository(git_root_path, PathStatus::Bare),
            QuickStatus::Uninited => self.enter_browser(PathStatus::Uninited, generation).await,
            QuickStatus::NoSuchPath => self.enter_browser(PathStatus::NoSuchPath, generation).await,
        }
    }

    fn enter_repository(&self, git_root_path: String, status: PathStatus) {
        let path = self.path();
        if path != git_root_path {
            info!(from = %path, to = %git_root_path, "adopting repository root");
            self.inner.path.set(git_root_path.clone());
            let events = &self.inner.ctx.events;
            events.dispatch(ProgramEvent::NavigatedToPath { path: git_root_path });
            events.dispatch(ProgramEvent::WorkingTreeChanged);
        }
        self.set_status(status);
        self.ensure_repository();
    }

    async fn enter_browser(&self, status: PathStatus, generation: u64) {
        self.set_status(status);
        self.release_repository();
        self.discover_directories(generation).await;
    }

    /// Lists candidate directories for the current path and refreshes each
    /// known entry: fetch, then status, then the derived fields.
    async fn discover_directories(&self, generation: u64) {
        let term = self.path();
        let listing = match self.inner.ctx.backend.list_directories(&term).await {
            Ok(listing) => listing,
            Err(err) => {
                debug!(%term, error = %err, "listDirectories failed");
                return;
            }
        };
        if self.is_stale(generation) {
            debug!(%term, generation, "dropping stale directory listing");
            return;
        }

        let mut added = 0;
        self.inner.directories.update(|entries| added = merge_listing(entries, &listing));
        debug!(%term, added, "merged directory listing");

        let paths: Vec<String> =
            self.inner.directories.with(|entries| entries.iter().map(|e| e.full_path.clone()).collect());
        let mut pipelines = JoinSet::new();
        for full_path in paths {
            let this = self.clone();
            pipelines.spawn(async move { this.refresh_directory(&full_path).await });
        }
        while let Some(joined) = pipelines.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "directory refresh task failed");
            }
        }
    }

    async fn refresh_directory(&self, full_path: &str) {
        let backend = &self.inner.ctx.backend;
        // only there to make the status below accurate
        if let Err(err) = backend.fetch(full_path, &self.inner.ctx.fetch_remote).await {
            debug!(path = %full_path, error = %err, "fetch failed");
        }
        let result = backend.status(full_path, self.inner.ctx.file_limit).await;
        if let Err(err) = &result {
            warn!(path = %full_path, error = %err, "status failed");
        }
        self.inner.directories.update(|entries| {
            if let Some(entry) = entries.iter_mut().find(|e| e.full_path == full_path) {
                match &result {
                    Ok(status) => entry.apply_status(status),
                    Err(err) => entry.mark_failed(err),
                }
            }
        });
    }

    pub async fn init_repository(&self) {
        let path = self.path();
        if let Err(err) = self.inner.ctx.backend.init(&path).await {
            self.inner.ctx.reporter.unhandled_rejection(&err);
        }
        self.refresh_status().await;
    }

    /// Clones the form's url under the current path. Returns the new
    /// repository's path on success.
    pub async fn clone_repository(&self) -> Option<String> {
        self.set_status(PathStatus::Cloning);
        let request = CloneRequest {
            path: self.path(),
            url: self.inner.clone_url.get(),
            destination_dir: self.clone_destination_effective(),
            is_recursive_submodule: self.inner.is_recursive_submodule.get(),
        };
        info!(url = %request.url, dest = %request.destination_dir, "cloning");

        let cloned = match self.inner.ctx.backend.clone_repository(&request).await {
            Ok(response) => {
                self.inner.ctx.navigator.browse_to(&repository_target(&response.path));
                Some(response.path)
            }
            Err(err) => {
                self.inner.ctx.reporter.unhandled_rejection(&err);
                None
            }
        };
        self.inner.ctx.events.dispatch(ProgramEvent::WorkingTreeChanged);
        cloned
    }

    pub async fn create_dir(&self) {
        self.inner.show_directory_created_alert.set(true);
        let path = self.path();
        if let Err(err) = self.inner.ctx.backend.create_dir(&path).await {
            self.inner.ctx.reporter.unhandled_rejection(&err);
        }
        self.refresh_status().await;
    }

    pub fn select_directory(&self, entry: &DirectoryEntry) {
        self.inner.ctx.navigator.browse_to(&repository_target(&entry.full_path));
    }

    pub fn on_program_event(&self, event: &ProgramEvent) {
        if matches!(event, ProgramEvent::WorkingTreeChanged | ProgramEvent::RequestAppContentRefresh) {
            self.spawn_refresh();
        }
        if let Some(repository) = self.repository() {
            repository.on_program_event(event);
        }
    }

    pub fn update_animation_frame(&self, delta: Duration) {
        if let Some(repository) = self.repository() {
            repository.update_animation_frame(delta);
        }
    }

    /// Starts a refresh on the current runtime without waiting for it.
    pub fn spawn_refresh(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let this = self.clone();
                handle.spawn(async move { this.refresh_status().await });
            }
            Err(_) => debug!("no runtime, skipping refresh"),
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) != generation
    }

    fn set_status(&self, status: PathStatus) {
        let previous = self.status();
        if self.inner.status.set(status) {
            info!(path = %self.path(), from = %previous, to = %status, "path status");
        }
    }

    fn ensure_repository(&self) {
        if self.has_repository() {
            return;
        }
        // built unlocked: a repository view may dispatch events from its constructor
        let ctx = &self.inner.ctx;
        let created = ctx.repositories.create(RepositoryContext {
            path: self.inner.path.clone(),
            backend: ctx.backend.clone(),
            events: ctx.events.clone(),
        });
        let surplus = {
            let mut repository = lock(&self.inner.repository);
            if repository.is_none() {
                *repository = Some(created);
                None
            } else {
                Some(created)
            }
        };
        if let Some(surplus) = surplus {
            debug!("repository view raced, dropping the extra one");
            surplus.shutdown();
        }
    }

    fn release_repository(&self) {
        let released = lock(&self.inner.repository).take();
        if let Some(repository) = released {
            repository.shutdown();
        }
    }
}

impl std::fmt::Debug for PathViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathViewModel")
            .field("path", &self.path())
            .field("status", &self.status())
            .field("directories", &self.inner.directories.with(|d| d.len()))
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn dir_name_of(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("/")
        .to_string()
}
