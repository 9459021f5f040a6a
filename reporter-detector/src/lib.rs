//! Working-copy discovery for `reporter-detector`.
//!
//! `discover(path)` decides whether `path` is itself a git working copy (one
//! candidate) or a directory holding several (every immediate subdirectory
//! that is a working copy). Hidden entries are not skipped; git decides.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Candidate directories found under a starting path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// The starting path is inside a working copy.
    Single(PathBuf),
    /// Immediate subdirectories that are working copies, sorted by path.
    Many(Vec<PathBuf>),
}

impl Discovery {
    pub fn candidates(&self) -> &[PathBuf] {
        match self {
            Discovery::Single(path) => std::slice::from_ref(path),
            Discovery::Many(paths) => paths,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Discovery::Single(_))
    }
}

/// Errors from discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("Error reading directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `true` when `dir` is inside a git working tree.
///
/// A missing `git` binary counts as "not a repository".
pub fn is_git_repository(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Classify `path` as a single working copy or a directory of them.
pub fn discover(path: &Path) -> Result<Discovery, DiscoverError> {
    if !path.is_dir() {
        return Err(DiscoverError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    let read_err = |source| DiscoverError::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    if is_git_repository(path) {
        tracing::debug!(path = %path.display(), "path is a working copy");
        // `.` and `..` have no final segment to name the repository by.
        let root = fs::canonicalize(path).map_err(read_err)?;
        return Ok(Discovery::Single(root));
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let candidate = entry.path();
        if !candidate.is_dir() {
            continue;
        }
        if is_git_repository(&candidate) {
            found.push(candidate);
        } else {
            tracing::debug!(path = %candidate.display(), "skipping non-repository directory");
        }
    }
    found.sort();

    tracing::debug!(count = found.len(), "discovered working copies");
    Ok(Discovery::Many(found))
}
