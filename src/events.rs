use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

// Centralized program event names, kept in parity with the web frontend
pub const NAVIGATED_TO_PATH: &str = "navigated-to-path";
pub const WORKING_TREE_CHANGED: &str = "working-tree-changed";
pub const REQUEST_APP_CONTENT_REFRESH: &str = "request-app-content-refresh";

/// Application-wide notifications passed between components.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramEvent {
    NavigatedToPath { path: String },
    WorkingTreeChanged,
    RequestAppContentRefresh,
    /// Anything this crate does not interpret; forwarded untouched.
    Other { event: String, data: serde_json::Value },
}

impl ProgramEvent {
    pub fn name(&self) -> &str {
        match self {
            ProgramEvent::NavigatedToPath { .. } => NAVIGATED_TO_PATH,
            ProgramEvent::WorkingTreeChanged => WORKING_TREE_CHANGED,
            ProgramEvent::RequestAppContentRefresh => REQUEST_APP_CONTENT_REFRESH,
            ProgramEvent::Other { event, .. } => event,
        }
    }

    /// Builds an event from its wire name, mapping known names to their variants.
    pub fn from_name(event: &str, data: serde_json::Value) -> Self {
        match event {
            NAVIGATED_TO_PATH => ProgramEvent::NavigatedToPath {
                path: data
                    .get("path")
                    .and_then(|p| p.as_str())
                    .unwrap_or_default()
                    .to_string(),
            },
            WORKING_TREE_CHANGED => ProgramEvent::WorkingTreeChanged,
            REQUEST_APP_CONTENT_REFRESH => ProgramEvent::RequestAppContentRefresh,
            other => ProgramEvent::Other { event: other.to_string(), data },
        }
    }
}

type Listener = Arc<dyn Fn(&ProgramEvent) + Send + Sync>;

/// Event bus shared by every component of the app. Cloning shares the bus.
#[derive(Clone, Default)]
pub struct ProgramEvents {
    listeners: Arc<Mutex<Vec<(Uuid, Listener)>>>,
}

impl ProgramEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Uuid
    where
        F: Fn(&ProgramEvent) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Delivers `event` to every listener, in subscription order.
    pub fn dispatch(&self, event: ProgramEvent) {
        // snapshot so listeners may subscribe or dispatch re-entrantly
        let snapshot: Vec<Listener> = self.lock().iter().map(|(_, l)| l.clone()).collect();
        tracing::trace!(event = event.name(), listeners = snapshot.len(), "dispatch");
        for listener in snapshot {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Uuid, Listener)>> {
        // listeners never run under the lock, so the list survives a poisoning
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ProgramEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
