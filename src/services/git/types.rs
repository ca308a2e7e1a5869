use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Classification of a filesystem path, as reported by `/quickstatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickStatus {
    Inited { git_root_path: String },
    Bare { git_root_path: String },
    Uninited,
    NoSuchPath,
}

/// Raw `/quickstatus` body before it is checked into a [`QuickStatus`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStatusResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub git_root_path: Option<String>,
}

impl TryFrom<QuickStatusResponse> for QuickStatus {
    type Error = BackendError;

    fn try_from(raw: QuickStatusResponse) -> Result<Self, Self::Error> {
        let QuickStatusResponse { kind, git_root_path } = raw;
        let root = || {
            git_root_path.clone().ok_or_else(|| BackendError::Decode {
                endpoint: "/quickstatus".into(),
                reason: format!("`{kind}` without gitRootPath"),
            })
        };
        match kind.as_str() {
            "inited" => Ok(QuickStatus::Inited { git_root_path: root()? }),
            "bare" => Ok(QuickStatus::Bare { git_root_path: root()? }),
            "uninited" => Ok(QuickStatus::Uninited),
            "no-such-path" => Ok(QuickStatus::NoSuchPath),
            other => Err(BackendError::UnknownStatusType(other.to_string())),
        }
    }
}

/// Per-file flags from `/status`. Absent flags are false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileStatus {
    pub conflict: bool,
    pub is_new: bool,
    pub removed: bool,
    pub renamed: bool,
    pub staged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkingTreeStatus {
    pub branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub files: BTreeMap<String, FileStatus>,
    pub is_more_to_load: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRequest {
    pub path: String,
    pub url: String,
    pub destination_dir: String,
    pub is_recursive_submodule: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloneResponse {
    pub path: String,
}

/// Error body the server sends alongside a non-success status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorBody {
    pub error: Option<serde_json::Value>,
    pub error_code: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.error {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}
