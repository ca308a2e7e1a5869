use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::types::{CloneRequest, CloneResponse, ErrorBody, QuickStatusResponse};
use super::{GitBackend, QuickStatus, WorkingTreeStatus};
use crate::config::AgentConfig;
use crate::error::{BackendError, BackendResult};

/// [`GitBackend`] over the server's JSON REST api.
///
/// GET parameters travel in the query string, POST parameters as a JSON body.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BackendError::Transport { endpoint: "client".into(), source })?;
        Ok(Self { client, base_url: base_url.into() })
    }

    pub fn from_config(config: &AgentConfig) -> BackendResult<Self> {
        Self::new(config.server_url.clone(), Duration::from_secs(config.request_timeout_secs))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> BackendResult<T> {
        tracing::debug!(endpoint, "GET");
        let response = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint: endpoint.into(), source })?;
        decode(endpoint, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> BackendResult<T> {
        tracing::debug!(endpoint, "POST");
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|source| BackendError::Transport { endpoint: endpoint.into(), source })?;
        decode(endpoint, response).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> BackendResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|source| BackendError::Transport { endpoint: endpoint.into(), source })?;

    if !status.is_success() {
        return Err(server_error(endpoint, status.as_u16(), &text));
    }

    // mutating endpoints may answer with an empty body
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(|e| BackendError::Decode {
        endpoint: endpoint.into(),
        reason: e.to_string(),
    })
}

fn server_error(endpoint: &str, status: u16, text: &str) -> BackendError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body.message().unwrap_or_else(|| {
        if text.trim().is_empty() {
            "no response body".to_string()
        } else {
            text.trim().to_string()
        }
    });
    BackendError::Server { endpoint: endpoint.into(), status, message, error_code: body.error_code }
}

#[async_trait]
impl GitBackend for HttpBackend {
    async fn quick_status(&self, path: &str) -> BackendResult<QuickStatus> {
        let raw: QuickStatusResponse = self.get("/quickstatus", &[("path", path.to_string())]).await?;
        raw.try_into()
    }

    async fn list_directories(&self, term: &str) -> BackendResult<Vec<String>> {
        self.get("/fs/listDirectories", &[("term", term.to_string())]).await
    }

    async fn fetch(&self, path: &str, remote: &str) -> BackendResult<()> {
        let _: serde_json::Value = self.post("/fetch", &json!({ "path": path, "remote": remote })).await?;
        Ok(())
    }

    async fn status(&self, path: &str, file_limit: u32) -> BackendResult<WorkingTreeStatus> {
        self.get("/status", &[("path", path.to_string()), ("fileLimit", file_limit.to_string())]).await
    }

    async fn init(&self, path: &str) -> BackendResult<()> {
        let _: serde_json::Value = self.post("/init", &json!({ "path": path })).await?;
        Ok(())
    }

    async fn clone_repository(&self, request: &CloneRequest) -> BackendResult<CloneResponse> {
        self.post("/clone", request).await
    }

    async fn create_dir(&self, dir: &str) -> BackendResult<()> {
        let _: serde_json::Value = self.post("/createDir", &json!({ "dir": dir })).await?;
        Ok(())
    }
}
