//! # gilded-sync
//!
//! Pushes a local content directory into WordPress.
//!
//! A [`Client`] wraps a [`RemoteApi`] (an authenticated XML-RPC endpoint) and
//! the [`ClientOptions`](gilded_core::ClientOptions) naming the content root.
//! [`Client::validate`] checks the server version and the local files;
//! [`Client::sync`] creates, updates and deletes terms, posts and resources so
//! the server matches the directory. Unchanged content is detected by
//! checksum and never re-sent.
//!
//! Everything runs sequentially on the calling thread: each remote call
//! completes before the next starts.

pub mod binder;
pub mod checksum;
pub mod client;
pub mod error;
pub mod local;
pub mod logger;
pub mod pipeline;
pub mod posts;
pub mod remote;
pub mod resources;
pub mod terms;
pub mod version;
pub mod walker;

pub use binder::{BoundMethod, Completion};
pub use checksum::{checksum, checksum_bytes, flatten};
pub use client::{create_client, Client};
pub use error::SyncError;
pub use local::{lint, scan, LintSummary, ScanEntry, ScanKind};
pub use logger::{LogLogger, Logger};
pub use remote::{RemoteApi, RemoteError, RemoteErrorCode, RemoteValue};
pub use version::{validate_version, Version, CLIENT_VERSION};
pub use walker::{recurse, WalkError};
