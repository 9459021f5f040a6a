//! `.rprc` configuration.
//!
//! # Lookup
//!
//! The first `.rprc` found walking from the starting directory up through its
//! parents wins. There is no global fallback file.
//!
//! # Precedence
//!
//! defaults < file < command-line flags. Empty `branch` / `remote_name`
//! values in the file leave the defaults in place; boolean flags only ever
//! switch a setting on.
//!
//! # API pattern
//!
//! Functions take an explicit starting directory or file path; tests use
//! `TempDir` roots and never depend on the process working directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = ".rprc";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 30;

const SUPPORTED_KEYS: &[&str] = &[
    "branch",
    "update",
    "include",
    "exclude",
    "force",
    "remote_name",
    "fetch_attempts",
    "timeout_secs",
];

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Raw contents of an `.rprc` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub update: Option<bool>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub force: Option<bool>,
    #[serde(default)]
    pub remote_name: Option<String>,
    #[serde(default)]
    pub fetch_attempts: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub branch: Option<String>,
    pub remote_name: Option<String>,
    pub update: bool,
    pub force: bool,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings handed to the sync layer. Read-only from there on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub branch: String,
    pub remote_name: String,
    pub auto_update: bool,
    pub force_resolve_conflicts: bool,
    pub include: BTreeSet<String>,
    pub exclude: BTreeSet<String>,
    pub fetch_attempts: u32,
    /// Deadline per git invocation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            remote_name: DEFAULT_REMOTE.to_string(),
            auto_update: false,
            force_resolve_conflicts: false,
            include: BTreeSet::new(),
            exclude: BTreeSet::new(),
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            timeout: None,
        }
    }
}

impl SyncConfig {
    /// Merge an optional file and command-line overrides onto the defaults.
    pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Self {
        let mut config = SyncConfig::default();

        if let Some(file) = file {
            if let Some(branch) = file.branch.filter(|b| !b.trim().is_empty()) {
                config.branch = branch;
            }
            if let Some(remote) = file.remote_name.filter(|r| !r.trim().is_empty()) {
                config.remote_name = remote;
            }
            config.auto_update = file.update.unwrap_or(false);
            config.force_resolve_conflicts = file.force.unwrap_or(false);
            config.include = file.include.unwrap_or_default().into_iter().collect();
            config.exclude = file.exclude.unwrap_or_default().into_iter().collect();
            if let Some(attempts) = file.fetch_attempts {
                config.fetch_attempts = attempts.max(1);
            }
            config.timeout = timeout_from_secs(file.timeout_secs);
        }

        if let Some(branch) = overrides.branch {
            config.branch = branch;
        }
        if let Some(remote) = overrides.remote_name {
            config.remote_name = remote;
        }
        if overrides.update {
            config.auto_update = true;
        }
        if overrides.force {
            config.force_resolve_conflicts = true;
        }
        if overrides.timeout_secs.is_some() {
            config.timeout = timeout_from_secs(overrides.timeout_secs);
        }

        config
    }

    /// Include/exclude policy applied to a repository name.
    pub fn includes(&self, name: &str) -> bool {
        is_included(name, &self.include, &self.exclude)
    }
}

/// `true` when `name` survives the include/exclude policy.
///
/// A non-empty include list is an allow-list, the exclude list removes the
/// names it holds, and a name present in both lists is included.
pub fn is_included(name: &str, include: &BTreeSet<String>, exclude: &BTreeSet<String>) -> bool {
    if include.contains(name) {
        return true;
    }
    if exclude.contains(name) {
        return false;
    }
    include.is_empty()
}

fn timeout_from_secs(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|s| *s > 0).map(Duration::from_secs)
}

// ---------------------------------------------------------------------------
// 2. Lookup
// ---------------------------------------------------------------------------

/// Nearest `.rprc` at or above `start`, if any.
pub fn find_config_file_at(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load and validate a single `.rprc` file.
///
/// An empty file yields [`FileConfig::default`]. Unknown top-level keys are
/// rejected with [`ConfigError::UnsupportedKey`].
pub fn load_at(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

/// Find the nearest `.rprc` above `start` and load it.
pub fn load_nearest(start: &Path) -> Result<Option<(PathBuf, FileConfig)>, ConfigError> {
    let Some(path) = find_config_file_at(start) else {
        return Ok(None);
    };
    let config = load_at(&path)?;
    Ok(Some((path, config)))
}

fn parse(path: &Path, contents: &str) -> Result<FileConfig, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_yaml::Value = serde_yaml::from_str(contents).map_err(parse_err)?;
    if value.is_null() {
        return Ok(FileConfig::default());
    }

    let serde_yaml::Value::Mapping(mapping) = &value else {
        return Err(parse_err(serde::de::Error::custom(
            "expected a mapping of settings at the top level",
        )));
    };
    for key in mapping.keys() {
        let key = match key.as_str() {
            Some(key) => key.to_string(),
            None => format!("{key:?}"),
        };
        if !SUPPORTED_KEYS.contains(&key.as_str()) {
            return Err(ConfigError::UnsupportedKey {
                path: path.to_path_buf(),
                key,
            });
        }
    }

    serde_yaml::from_value(value).map_err(parse_err)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = SyncConfig::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.remote_name, "origin");
        assert!(!config.auto_update);
        assert!(!config.force_resolve_conflicts);
        assert_eq!(config.fetch_attempts, 30);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn empty_file_strings_keep_defaults() {
        let file = FileConfig {
            branch: Some(String::new()),
            remote_name: Some("  ".to_string()),
            ..FileConfig::default()
        };
        let config = SyncConfig::resolve(Some(file), Overrides::default());
        assert_eq!(config.branch, "main");
        assert_eq!(config.remote_name, "origin");
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            branch: Some("develop".to_string()),
            remote_name: Some("upstream".to_string()),
            update: Some(false),
            timeout_secs: Some(30),
            ..FileConfig::default()
        };
        let overrides = Overrides {
            branch: Some("release".to_string()),
            update: true,
            timeout_secs: Some(5),
            ..Overrides::default()
        };
        let config = SyncConfig::resolve(Some(file), overrides);
        assert_eq!(config.branch, "release");
        assert_eq!(config.remote_name, "upstream");
        assert!(config.auto_update);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn zero_timeout_and_attempts_are_normalized() {
        let file = FileConfig {
            fetch_attempts: Some(0),
            timeout_secs: Some(0),
            ..FileConfig::default()
        };
        let config = SyncConfig::resolve(Some(file), Overrides::default());
        assert_eq!(config.fetch_attempts, 1);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn include_takes_precedence_over_exclude() {
        assert!(is_included("api", &set(&["api"]), &set(&["api"])));
        assert!(!is_included("web", &set(&["api"]), &set(&[])));
        assert!(!is_included("api", &set(&[]), &set(&["api"])));
        assert!(is_included("anything", &set(&[]), &set(&[])));
    }

    #[test]
    fn find_config_walks_parents() {
        let root = TempDir::new().expect("tempdir");
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "branch: develop\n").expect("write");

        let found = find_config_file_at(&nested).expect("found");
        assert_eq!(found, root.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn comment_only_file_is_empty_config() {
        let root = TempDir::new().expect("tempdir");
        let path = root.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "# nothing here\n").expect("write");
        assert_eq!(load_at(&path).expect("load"), FileConfig::default());
    }
}
