use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use gitdeck::view::{Navigator, PathView};
use gitdeck::{AgentConfig, HttpBackend, PathViewContext, PathViewModel, ProgramEvents};
use serde::Serialize;

use super::repository::LoggedRepository;

/// Navigation requests made by the view, kept for the final report.
#[derive(Default)]
pub struct NavigationLog(Mutex<Vec<String>>);

impl NavigationLog {
    pub fn targets(&self) -> Vec<String> {
        self.0.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl Navigator for NavigationLog {
    fn browse_to(&self, target: &str) {
        tracing::info!(target, "navigate");
        if let Ok(mut targets) = self.0.lock() {
            targets.push(target.to_string());
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub view: PathView,
    pub navigated_to: Vec<String>,
}

pub struct Session {
    pub view: PathViewModel,
    pub navigation: Arc<NavigationLog>,
}

impl Session {
    pub fn open(config: &AgentConfig, path: &str) -> Result<Self> {
        let backend = HttpBackend::from_config(config)
            .with_context(|| format!("Failed to create client for {}", config.server_url))?;
        let navigation = Arc::new(NavigationLog::default());
        let ctx = PathViewContext::new(
            Arc::new(backend),
            ProgramEvents::new(),
            navigation.clone(),
            Arc::new(LoggedRepository::create),
        )
        .with_config(config);

        let view = PathViewModel::new(ctx, expand_tilde(path));
        view.attach();
        Ok(Self { view, navigation })
    }

    pub fn report(&self) -> Report {
        Report { view: self.view.render(), navigated_to: self.navigation.targets() }
    }

    pub fn close(self) -> Report {
        let report = self.report();
        self.view.detach();
        report
    }
}

/// Expand tilde in path
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

pub async fn status(config: &AgentConfig, path: &str) -> Result<Report> {
    let session = Session::open(config, path)?;
    session.view.shown().await;
    Ok(session.close())
}

pub async fn init(config: &AgentConfig, path: &str) -> Result<Report> {
    let session = Session::open(config, path)?;
    session.view.init_repository().await;
    Ok(session.close())
}

pub async fn mkdir(config: &AgentConfig, path: &str) -> Result<Report> {
    let session = Session::open(config, path)?;
    session.view.create_dir().await;
    Ok(session.close())
}

pub async fn clone(
    config: &AgentConfig,
    path: &str,
    url: &str,
    dest: Option<String>,
    recursive: bool,
) -> Result<Report> {
    let session = Session::open(config, path)?;
    session.view.set_clone_url(url);
    if let Some(dest) = dest {
        session.view.set_clone_destination(dest);
    }
    session.view.set_recursive_submodule(recursive);

    let cloned = session.view.clone_repository().await;
    let report = session.close();
    cloned.with_context(|| format!("Failed to clone {url}"))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), "/abs/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/code"), format!("{}/code", home.to_string_lossy()));
        }
    }

    #[test]
    fn test_navigation_log() {
        let log = NavigationLog::default();
        log.browse_to("repository?path=%2Fa");
        assert_eq!(log.targets(), vec!["repository?path=%2Fa".to_string()]);
    }
}
