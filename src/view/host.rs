use crate::error::BackendError;

/// Application routing, provided by whatever hosts the view.
pub trait Navigator: Send + Sync {
    fn browse_to(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn browse_to(&self, target: &str) {
        self(target)
    }
}

/// Shared sink for failures of user-initiated actions.
pub trait RejectionReporter: Send + Sync {
    fn unhandled_rejection(&self, error: &BackendError);
}

/// Default reporter: logs and moves on.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRejectionReporter;

impl RejectionReporter for TracingRejectionReporter {
    fn unhandled_rejection(&self, error: &BackendError) {
        tracing::error!(error = %error, code = ?error.error_code(), "unhandled rejection");
    }
}

/// Navigation target of the repository view for `path`.
pub fn repository_target(path: &str) -> String {
    format!("repository?path={}", urlencoding::encode(path))
}
