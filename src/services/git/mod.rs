pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::BackendResult;

pub use http::HttpBackend;
pub use types::{CloneRequest, CloneResponse, FileStatus, QuickStatus, WorkingTreeStatus};

/// The REST surface of the git server that the path view consumes.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// `GET /quickstatus`
    async fn quick_status(&self, path: &str) -> BackendResult<QuickStatus>;

    /// `GET /fs/listDirectories`. The first element is the common root.
    async fn list_directories(&self, term: &str) -> BackendResult<Vec<String>>;

    /// `POST /fetch`
    async fn fetch(&self, path: &str, remote: &str) -> BackendResult<()>;

    /// `GET /status`
    async fn status(&self, path: &str, file_limit: u32) -> BackendResult<WorkingTreeStatus>;

    /// `POST /init`
    async fn init(&self, path: &str) -> BackendResult<()>;

    /// `POST /clone`
    async fn clone_repository(&self, request: &CloneRequest) -> BackendResult<CloneResponse>;

    /// `POST /createDir`
    async fn create_dir(&self, dir: &str) -> BackendResult<()>;
}
