use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {message}")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    #[error("could not decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("unknown quickstatus type `{0}`")]
    UnknownStatusType(String),
}

impl BackendError {
    /// Error code reported by the server, if the failure came with one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            BackendError::Server { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot resolve home directory")]
    NoHome,

    #[error("config io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;
