//! Error types for reporter-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading the `.rprc` configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; the message carries serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A top-level key outside the supported set.
    #[error("unsupported key in config file: {key} ({path})")]
    UnsupportedKey { path: PathBuf, key: String },
}
