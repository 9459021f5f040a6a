//! Remote locator resolution, used only to word the "may not exist" error.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("invalid URL: {locator}")]
    InvalidLocator { locator: String },

    #[error("invalid URL path: {path}")]
    InvalidPath { path: String },
}

/// `owner/repo` pair taken from the last two path segments of a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parse a remote locator into its owner and repository name.
///
/// Accepts URLs (`https://host/owner/repo.git`, `ssh://git@host/owner/repo`),
/// scp-like locators (`git@host:owner/repo.git`) and absolute local paths.
pub fn parse_remote(locator: &str) -> Result<RemoteRef, RemoteError> {
    let locator = locator.trim();
    let url = to_url(locator).ok_or_else(|| RemoteError::InvalidLocator {
        locator: locator.to_string(),
    })?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., owner, repo] => Ok(RemoteRef {
            owner: (*owner).to_string(),
            repo: repo.strip_suffix(".git").unwrap_or(*repo).to_string(),
        }),
        _ => Err(RemoteError::InvalidPath {
            path: url.path().to_string(),
        }),
    }
}

fn to_url(locator: &str) -> Option<Url> {
    if locator.is_empty() {
        return None;
    }
    if Path::new(locator).is_absolute() {
        return Url::from_file_path(locator).ok();
    }
    if let Some((host, path)) = split_scp_like(locator) {
        return Url::parse(&format!("ssh://{host}/{}", path.trim_start_matches('/'))).ok();
    }
    Url::parse(locator).ok()
}

/// `[user@]host:path` with no scheme and no `/` before the first `:`.
fn split_scp_like(locator: &str) -> Option<(&str, &str)> {
    if locator.contains("://") {
        return None;
    }
    let (host, path) = locator.split_once(':')?;
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some((host, path))
}
