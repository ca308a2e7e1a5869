use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8448/api";
pub const DEFAULT_FILE_LIMIT: u32 = 100;
pub const DEFAULT_FETCH_REMOTE: &str = "origin";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
  pub server_url: String,
  /// Cap on files reported per directory by `/status`.
  pub file_limit: u32,
  pub fetch_remote: String,
  pub request_timeout_secs: u64,
}

impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      server_url: DEFAULT_SERVER_URL.to_string(),
      file_limit: DEFAULT_FILE_LIMIT,
      fetch_remote: DEFAULT_FETCH_REMOTE.to_string(),
      request_timeout_secs: 30,
    }
  }
}

fn dir_name_from(app_name: Option<&str>) -> String {
  let from_env = std::env::var("GITDECK_DIR_NAME").ok();
  let name = from_env.as_deref().or(app_name).unwrap_or("gitdeck");
  if name.starts_with('.') { name.to_string() } else { format!(".{}", name) }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
  move |source| ConfigError::Io { path: path.display().to_string(), source }
}

pub fn ensure_config_dir(app_name: Option<&str>) -> Result<PathBuf, ConfigError> {
  let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
  let dir = home.join(dir_name_from(app_name));
  fs::create_dir_all(&dir).map_err(io_err(&dir))?;
  Ok(dir)
}

pub fn config_file_path(app_name: Option<&str>) -> Result<PathBuf, ConfigError> {
  Ok(ensure_config_dir(app_name)?.join(CONFIG_FILE))
}

/// Reads the config at `path`; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AgentConfig, ConfigError> {
  match fs::read(path) {
    Ok(bytes) => Ok(serde_json::from_slice::<AgentConfig>(&bytes)?),
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(AgentConfig::default()),
    Err(e) => Err(io_err(path)(e)),
  }
}

pub fn save_config_to(path: &Path, config: &AgentConfig) -> Result<(), ConfigError> {
  let tmp = path.with_extension("json.tmp");
  let data = serde_json::to_vec_pretty(config)?;
  fs::write(&tmp, data).map_err(io_err(&tmp))?;
  fs::rename(&tmp, path).map_err(io_err(path))
}

/// Loads the user's config and applies `GITDECK_SERVER_URL` on top.
pub fn load_config(app_name: Option<&str>) -> Result<AgentConfig, ConfigError> {
  let mut config = load_config_from(&config_file_path(app_name)?)?;
  if let Ok(url) = std::env::var("GITDECK_SERVER_URL") {
    if !url.trim().is_empty() { config.server_url = url; }
  }
  Ok(config)
}

pub fn save_config(app_name: Option<&str>, config: &AgentConfig) -> Result<(), ConfigError> {
  save_config_to(&config_file_path(app_name)?, config)
}
