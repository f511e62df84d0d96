//! Client configuration.
//!
//! # File layout
//!
//! ```text
//! # gilded.yaml
//! dir: content          # content root, relative to this file
//! verbose: true         # optional, defaults to false
//! url: https://example.org/xmlrpc.php
//! username: admin       # everything else is passed through to the remote client
//! ```
//!
//! # API pattern
//!
//! `load_at(path)` reads an explicit file; tests always go through it with a
//! `TempDir`-backed path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gilded.yaml";

/// Options a sync client is constructed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Root of the content tree (`taxonomies.json`, `posts/`, `resources/`).
    pub dir: PathBuf,
    #[serde(default)]
    pub verbose: bool,
    /// Remote-connection options, untouched by the client itself.
    #[serde(flatten)]
    pub connection: BTreeMap<String, serde_yaml::Value>,
}

impl ClientOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            verbose: false,
            connection: BTreeMap::new(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Look up a passthrough connection option as a string.
    pub fn connection_str(&self, key: &str) -> Option<&str> {
        self.connection.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawOptions {
    dir: Option<PathBuf>,
    #[serde(default)]
    verbose: bool,
    #[serde(flatten)]
    connection: BTreeMap<String, serde_yaml::Value>,
}

/// Load client options from the YAML file at `path`.
///
/// Returns `ConfigError::Io` if the file cannot be read, `ConfigError::Parse`
/// (with path + line context) if it is malformed, and `ConfigError::MissingDir`
/// if no content root is set. A relative `dir` is resolved against the
/// directory holding the config file.
pub fn load_at(path: &Path) -> Result<ClientOptions, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawOptions = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(dir) = raw.dir else {
        return Err(ConfigError::MissingDir {
            path: path.to_path_buf(),
        });
    };
    let dir = if dir.is_relative() {
        path.parent().unwrap_or(Path::new("")).join(dir)
    } else {
        dir
    };

    Ok(ClientOptions {
        dir,
        verbose: raw.verbose,
        connection: raw.connection,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
