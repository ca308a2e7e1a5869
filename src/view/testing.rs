//! Scripted collaborators for path view tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::host::{Navigator, RejectionReporter};
use super::path_view::{PathViewContext, PathViewModel};
use super::repository::{RepositoryContext, RepositoryModel};
use crate::error::{BackendError, BackendResult};
use crate::events::{ProgramEvent, ProgramEvents};
use crate::services::git::{CloneRequest, CloneResponse, GitBackend, QuickStatus, WorkingTreeStatus};

fn fail(endpoint: &str, msg: &str) -> BackendError {
    BackendError::Server {
        endpoint: endpoint.to_string(),
        status: 500,
        message: msg.to_string(),
        error_code: None,
    }
}

/// The server's own message for scripted failures, the full text otherwise.
pub fn reason(error: &BackendError) -> String {
    match error {
        BackendError::Server { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// A quickstatus answer, optionally held back until its gate is notified.
pub struct Scripted {
    pub gate: Option<Arc<Notify>>,
    pub result: Result<QuickStatus, String>,
}

#[derive(Default)]
pub struct FakeBackend {
    /// Consumed front to back before `quick_by_path` is consulted.
    pub quick_queue: Mutex<VecDeque<Scripted>>,
    pub quick_by_path: Mutex<HashMap<String, QuickStatus>>,
    pub listings: Mutex<HashMap<String, Vec<String>>>,
    /// Held back until notified; taken by the first listing call.
    pub listing_gate: Mutex<Option<Arc<Notify>>>,
    pub fetch_errors: Mutex<HashMap<String, String>>,
    pub statuses: Mutex<HashMap<String, Result<WorkingTreeStatus, String>>>,
    pub clone_result: Mutex<Option<Result<String, String>>>,
    pub init_error: Mutex<Option<String>>,
    pub create_dir_error: Mutex<Option<String>>,
    pub create_dir_gate: Mutex<Option<Arc<Notify>>>,
    pub calls: Mutex<Vec<String>>,
    pub clone_requests: Mutex<Vec<CloneRequest>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_quick(&self, path: &str, status: QuickStatus) {
        self.quick_by_path.lock().unwrap().insert(path.to_string(), status);
    }

    pub fn push_quick(&self, gate: Option<Arc<Notify>>, result: Result<QuickStatus, String>) {
        self.quick_queue.lock().unwrap().push_back(Scripted { gate, result });
    }

    pub fn set_listing(&self, term: &str, paths: &[&str]) {
        self.listings
            .lock()
            .unwrap()
            .insert(term.to_string(), paths.iter().map(|p| p.to_string()).collect());
    }

    pub fn set_status(&self, path: &str, result: Result<WorkingTreeStatus, String>) {
        self.statuses.lock().unwrap().insert(path.to_string(), result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitBackend for FakeBackend {
    async fn quick_status(&self, path: &str) -> BackendResult<QuickStatus> {
        self.record(format!("quickstatus {path}"));
        let scripted = self.quick_queue.lock().unwrap().pop_front();
        if let Some(Scripted { gate, result }) = scripted {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            return result.map_err(|e| fail("/quickstatus", &e));
        }
        Ok(self
            .quick_by_path
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(QuickStatus::NoSuchPath))
    }

    async fn list_directories(&self, term: &str) -> BackendResult<Vec<String>> {
        self.record(format!("listDirectories {term}"));
        let gate = self.listing_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.listings
            .lock()
            .unwrap()
            .get(term)
            .cloned()
            .ok_or_else(|| fail("/fs/listDirectories", "no listing"))
    }

    async fn fetch(&self, path: &str, remote: &str) -> BackendResult<()> {
        self.record(format!("fetch {path} {remote}"));
        tokio::task::yield_now().await;
        match self.fetch_errors.lock().unwrap().get(path) {
            Some(e) => Err(fail("/fetch", e)),
            None => Ok(()),
        }
    }

    async fn status(&self, path: &str, file_limit: u32) -> BackendResult<WorkingTreeStatus> {
        self.record(format!("status {path} {file_limit}"));
        match self.statuses.lock().unwrap().get(path) {
            Some(Ok(status)) => Ok(status.clone()),
            Some(Err(e)) => Err(fail("/status", e)),
            None => Ok(WorkingTreeStatus::default()),
        }
    }

    async fn init(&self, path: &str) -> BackendResult<()> {
        self.record(format!("init {path}"));
        match self.init_error.lock().unwrap().clone() {
            Some(e) => Err(fail("/init", &e)),
            None => Ok(()),
        }
    }

    async fn clone_repository(&self, request: &CloneRequest) -> BackendResult<CloneResponse> {
        self.record(format!("clone {} {}", request.url, request.destination_dir));
        self.clone_requests.lock().unwrap().push(request.clone());
        match self.clone_result.lock().unwrap().clone() {
            Some(Ok(path)) => Ok(CloneResponse { path }),
            Some(Err(e)) => Err(fail("/clone", &e)),
            None => Err(fail("/clone", "clone not scripted")),
        }
    }

    async fn create_dir(&self, dir: &str) -> BackendResult<()> {
        self.record(format!("createDir {dir}"));
        let gate = self.create_dir_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.create_dir_error.lock().unwrap().clone() {
            Some(e) => Err(fail("/createDir", &e)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub targets: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn browse_to(&self, target: &str) {
        self.targets.lock().unwrap().push(target.to_string());
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub errors: Mutex<Vec<String>>,
}

impl RejectionReporter for RecordingReporter {
    fn unhandled_rejection(&self, error: &BackendError) {
        self.errors.lock().unwrap().push(reason(error));
    }
}

#[derive(Default)]
pub struct RecordingRepository {
    pub path: Mutex<String>,
    pub events: Mutex<Vec<String>>,
    pub frames: Mutex<Vec<Duration>>,
    pub shut_down: Mutex<bool>,
}

impl RepositoryModel for RecordingRepository {
    fn on_program_event(&self, event: &ProgramEvent) {
        self.events.lock().unwrap().push(event.name().to_string());
    }

    fn update_animation_frame(&self, delta: Duration) {
        self.frames.lock().unwrap().push(delta);
    }

    fn shutdown(&self) {
        *self.shut_down.lock().unwrap() = true;
    }
}

/// A path view wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub view: PathViewModel,
    pub backend: Arc<FakeBackend>,
    pub events: ProgramEvents,
    pub navigator: Arc<RecordingNavigator>,
    pub reporter: Arc<RecordingReporter>,
    pub repositories: Arc<Mutex<Vec<Arc<RecordingRepository>>>>,
    pub seen_events: Arc<Mutex<Vec<ProgramEvent>>>,
    /// Dispatched on the bus by the factory while it builds a repository view.
    pub announce_on_create: Arc<Mutex<Option<ProgramEvent>>>,
}

impl Harness {
    pub fn new(path: &str) -> Self {
        Self::with_backend(path, FakeBackend::new())
    }

    pub fn with_backend(path: &str, backend: Arc<FakeBackend>) -> Self {
        let events = ProgramEvents::new();
        let seen_events = Arc::new(Mutex::new(Vec::new()));
        let seen = seen_events.clone();
        events.subscribe(move |e| seen.lock().unwrap().push(e.clone()));

        let navigator = Arc::new(RecordingNavigator::default());
        let reporter = Arc::new(RecordingReporter::default());
        let repositories: Arc<Mutex<Vec<Arc<RecordingRepository>>>> = Arc::default();

        let announce_on_create: Arc<Mutex<Option<ProgramEvent>>> = Arc::default();

        let created = repositories.clone();
        let announce = announce_on_create.clone();
        let factory = move |ctx: RepositoryContext| -> Arc<dyn RepositoryModel> {
            let repo = Arc::new(RecordingRepository::default());
            *repo.path.lock().unwrap() = ctx.path.get();
            created.lock().unwrap().push(repo.clone());
            let event = announce.lock().unwrap().clone();
            if let Some(event) = event {
                ctx.events.dispatch(event);
            }
            repo
        };

        let ctx = PathViewContext::new(backend.clone(), events.clone(), navigator.clone(), Arc::new(factory))
            .with_reporter(reporter.clone());
        let view = PathViewModel::new(ctx, path);

        Self { view, backend, events, navigator, reporter, repositories, seen_events, announce_on_create }
    }

    pub fn event_names(&self) -> Vec<String> {
        self.seen_events.lock().unwrap().iter().map(|e| e.name().to_string()).collect()
    }

    pub fn repository(&self, index: usize) -> Arc<RecordingRepository> {
        self.repositories.lock().unwrap()[index].clone()
    }

    pub fn repository_count(&self) -> usize {
        self.repositories.lock().unwrap().len()
    }
}
