//! Clone address parsing.
//!
//! Only as much of a remote address is understood as the clone form needs:
//! the host (when there is one) and the project path, from which the default
//! destination folder name is derived.

/// A parsed clone address.
///
/// # Supported formats
///
/// - `https://<host>/<path>.git`, `http://`, `git://`
/// - `ssh://[user@]<host>[:port]/<path>.git`
/// - `<user>@<host>:<path>.git` (scp-like)
/// - local paths, `/srv/git/<name>.git` or `C:\repos\<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAddress {
    pub address: String,
    pub host: Option<String>,
    /// Path of the project on the host, without a `.git` suffix.
    pub project: String,
    /// Last segment of `project`.
    pub short_project: String,
}

pub fn parse_address(address: &str) -> Option<RemoteAddress> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (host, path) = if let Some((_, rest)) = trimmed.split_once("://") {
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let host = authority.rsplit('@').next().unwrap_or(authority);
        let host = host.split(':').next().unwrap_or(host);
        (Some(host.to_string()), path.to_string())
    } else if let Some((host, path)) = scp_like(trimmed) {
        (Some(host.to_string()), path.to_string())
    } else {
        (None, trimmed.replace('\\', "/"))
    };

    let project = path.trim_matches('/');
    let project = project.strip_suffix(".git").unwrap_or(project).trim_end_matches('/');
    let short_project = project.rsplit('/').next().unwrap_or(project);
    if short_project.is_empty() {
        return None;
    }

    Some(RemoteAddress {
        address: trimmed.to_string(),
        host: host.filter(|h| !h.is_empty()),
        project: project.to_string(),
        short_project: short_project.to_string(),
    })
}

/// `user@host:path`, where the colon comes before any slash.
fn scp_like(address: &str) -> Option<(&str, &str)> {
    let (user_host, path) = address.split_once(':')?;
    if user_host.contains('/') || path.starts_with('\\') {
        return None;
    }
    let (_, host) = user_host.split_once('@')?;
    Some((host, path))
}
