/// Agent version, reported by `gitdeck-agent health`
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Agent binary name
pub const AGENT_NAME: &str = "gitdeck-agent";
