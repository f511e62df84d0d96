//! Error types for gilded-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration does not name a content root.
    #[error("config at {path} does not set `dir` (the content root)")]
    MissingDir { path: PathBuf },
}
