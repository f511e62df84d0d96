//! Error types for gilded-sync.

use std::path::PathBuf;

use thiserror::Error;

use gilded_core::error::ConfigError;
use gilded_core::{PostPath, Taxonomy, TermSlug};

use crate::remote::RemoteError;
use crate::walker::WalkError;

/// All errors that can arise from validate and sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote endpoint refused the connection during the version check.
    #[error("Could not connect to WordPress.")]
    ConnectionFailed,

    /// The server answered "method not found" for the Gilded extension methods.
    #[error("XML-RPC extensions for Gilded WordPress are not installed.")]
    ExtensionMissing,

    /// Server and client disagree on major version, or the server is older.
    #[error(
        "Incompatible versions for Gilded WordPress. Version {local} is installed as a client, \
         but the WordPress server is running version {remote}."
    )]
    IncompatibleVersion { local: String, remote: String },

    /// A remote call failed; passed through with its original message.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// Listing the content tree failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A content file holds malformed JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A term in `taxonomies.json` is incomplete or duplicated.
    #[error("invalid term in taxonomy '{taxonomy}': {reason}")]
    InvalidTerm { taxonomy: Taxonomy, reason: String },

    /// A post file cannot be synced as written.
    #[error("invalid post {path}: {reason}")]
    InvalidPost { path: PathBuf, reason: String },

    /// A post references a term that `taxonomies.json` does not define.
    #[error("post '{post}' references unknown term '{slug}' in taxonomy '{taxonomy}'")]
    UnknownTerm {
        post: PostPath,
        taxonomy: Taxonomy,
        slug: TermSlug,
    },

    /// The server answered with a value of the wrong shape.
    #[error("unexpected response from {method}: {detail}")]
    UnexpectedResponse { method: String, detail: String },

    /// Client configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Whether this failure means the WordPress server was unreachable.
    pub fn is_connection_refused(&self) -> bool {
        match self {
            SyncError::ConnectionFailed => true,
            SyncError::Remote(err) => err.is_connection_refused(),
            _ => false,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::UnexpectedResponse`].
pub(crate) fn unexpected(method: &str, detail: impl Into<String>) -> SyncError {
    SyncError::UnexpectedResponse {
        method: method.to_owned(),
        detail: detail.into(),
    }
}
