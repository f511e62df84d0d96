//! Remote API surface.
//!
//! The sync client never speaks XML-RPC itself. It talks to a [`RemoteApi`]
//! implementation that owns transport and authentication, exchanging
//! [`RemoteValue`]s (the XML-RPC value model) and reporting [`RemoteError`]s.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use gilded_core::ContentValue;

/// XML-RPC fault code for "requested method not found".
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Remote method names used by the sync client.
pub mod methods {
    pub const GET_VERSION: &str = "gw.getVersion";
    pub const GET_POST_PATHS: &str = "gw.getPostPaths";
    pub const GET_RESOURCES: &str = "gw.getResources";
    pub const ADD_RESOURCE: &str = "gw.addResource";
    pub const DELETE_RESOURCE: &str = "gw.deleteResource";
    pub const GET_TERMS: &str = "wp.getTerms";
    pub const NEW_TERM: &str = "wp.newTerm";
    pub const EDIT_TERM: &str = "wp.editTerm";
    pub const DELETE_TERM: &str = "wp.deleteTerm";
    pub const NEW_POST: &str = "wp.newPost";
    pub const EDIT_POST: &str = "wp.editPost";
    pub const DELETE_POST: &str = "wp.deletePost";
}

/// Authenticated access to a WordPress XML-RPC endpoint.
///
/// Implementors prepend whatever credentials the endpoint needs (blog id,
/// username, password); `args` holds only the method's own arguments.
pub trait RemoteApi {
    fn authenticated_call(
        &mut self,
        method: &str,
        args: &[RemoteValue],
    ) -> Result<RemoteValue, RemoteError>;
}

impl<T: RemoteApi + ?Sized> RemoteApi for Box<T> {
    fn authenticated_call(
        &mut self,
        method: &str,
        args: &[RemoteValue],
    ) -> Result<RemoteValue, RemoteError> {
        (**self).authenticated_call(method, args)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RemoteValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Base64(Vec<u8>),
    Array(Vec<RemoteValue>),
    Struct(BTreeMap<String, RemoteValue>),
}

impl RemoteValue {
    /// Build a struct from `(key, value)` pairs.
    pub fn structure<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<RemoteValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Struct(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RemoteValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload; WordPress often sends ids as strings, so numeric
    /// strings are accepted too.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RemoteValue::Int(n) => Some(*n),
            RemoteValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[RemoteValue]> {
        match self {
            RemoteValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, RemoteValue>> {
        match self {
            RemoteValue::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Member of a struct value.
    pub fn get(&self, key: &str) -> Option<&RemoteValue> {
        self.as_struct().and_then(|map| map.get(key))
    }

    fn kind(&self) -> &'static str {
        match self {
            RemoteValue::Nil => "nil",
            RemoteValue::Bool(_) => "boolean",
            RemoteValue::Int(_) => "int",
            RemoteValue::Double(_) => "double",
            RemoteValue::String(_) => "string",
            RemoteValue::DateTime(_) => "dateTime.iso8601",
            RemoteValue::Base64(_) => "base64",
            RemoteValue::Array(_) => "array",
            RemoteValue::Struct(_) => "struct",
        }
    }
}

impl fmt::Display for RemoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteValue::String(s) => write!(f, "{s:?}"),
            RemoteValue::Int(n) => write!(f, "{n}"),
            other => f.write_str(other.kind()),
        }
    }
}

impl From<&str> for RemoteValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for RemoteValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for RemoteValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for RemoteValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for RemoteValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Base64(bytes)
    }
}

impl From<Vec<RemoteValue>> for RemoteValue {
    fn from(items: Vec<RemoteValue>) -> Self {
        Self::Array(items)
    }
}

impl From<ContentValue> for RemoteValue {
    fn from(value: ContentValue) -> Self {
        match value {
            ContentValue::Null => Self::Nil,
            ContentValue::Bool(b) => Self::Bool(b),
            ContentValue::Int(n) => Self::Int(n),
            ContentValue::Float(n) => Self::Double(n),
            ContentValue::String(s) => Self::String(s),
            ContentValue::Date(d) => Self::DateTime(d),
            ContentValue::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            ContentValue::Map(map) => Self::Struct(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structured code attached to a remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorCode {
    /// The transport could not reach the server at all.
    ConnectionRefused,
    /// An XML-RPC fault returned by the server.
    Fault(i32),
    /// Any other transport-level code.
    Other(String),
}

/// A failed remote call.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub code: Option<RemoteErrorCode>,
    pub message: String,
}

impl RemoteError {
    /// A failure without a structured code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn fault(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(RemoteErrorCode::Fault(code)),
            message: message.into(),
        }
    }

    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self {
            code: Some(RemoteErrorCode::ConnectionRefused),
            message: message.into(),
        }
    }

    pub fn is_connection_refused(&self) -> bool {
        self.code == Some(RemoteErrorCode::ConnectionRefused)
    }
}
