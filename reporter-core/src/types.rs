//! Domain types shared by the probe, the sequencer, and the report.
//!
//! All path fields use `PathBuf`. Values parsed from git output are validated
//! once at the probe boundary and travel as these types afterwards.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Display name of a repository: the final segment of its root path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl RepoName {
    /// Name derived from the last path segment, falling back to the full path
    /// for roots such as `/`.
    pub fn from_path(path: &Path) -> Self {
        Self(
            path.file_name()
                .unwrap_or(path.as_os_str())
                .to_string_lossy()
                .into_owned(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Number of commits the local branch lacks, kept as git printed it.
///
/// The count is only ever compared against `"0"` and `"1"` or interpolated
/// into messages, so it is never converted to an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehindCount(String);

impl BehindCount {
    /// Accepts a non-empty run of ASCII digits, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }

    /// `"commit"` for exactly one, `"commits"` otherwise.
    pub fn noun(&self) -> &'static str {
        if self.0 == "1" {
            "commit"
        } else {
            "commits"
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BehindCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A resolved working-copy root. Built once per probed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryTarget {
    /// Absolute path to the top-level directory of the checkout.
    pub root: PathBuf,
    pub name: RepoName,
}

impl RepositoryTarget {
    pub fn from_root(root: PathBuf) -> Self {
        let name = RepoName::from_path(&root);
        Self { root, name }
    }
}

/// Format used for commit dates in reports. Matches git's default date
/// format in the C locale, e.g. `Fri Nov 24 10:56:42 2023 +0100`.
pub const COMMIT_DATE_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Metadata of the newest upstream commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastCommit {
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub short_hash: String,
    pub subject: String,
}

impl LastCommit {
    pub fn formatted_date(&self) -> String {
        self.date.format(COMMIT_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for LastCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}\n{} {}",
            self.author,
            self.formatted_date(),
            self.short_hash,
            self.subject
        )
    }
}

/// Result of one probe cycle against a diverged repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub repository: RepositoryTarget,
    pub behind: BehindCount,
    pub last_commit: LastCommit,
}

impl DriftReport {
    /// `<name> is <n> commit(s) behind`
    pub fn headline(&self) -> String {
        format!(
            "{} is {} {} behind",
            self.repository.name,
            self.behind,
            self.behind.noun()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
