//! Client/server version compatibility.
//!
//! The server must implement the same major version as this client and the
//! same or a newer minor version (a `^major.minor` range). Patch levels are
//! ignored on both sides.

use std::fmt;

use crate::client::Client;
use crate::error::{unexpected, SyncError};
use crate::remote::{methods, RemoteApi, RemoteError, RemoteErrorCode, METHOD_NOT_FOUND};

/// Version of this client, compared against the server's extension version.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DATABASE_HINT: &str =
    "\nPlease ensure that your database server is running and WordPress is functioning properly.";

/// The comparable part of a `major.minor[.patch]` version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
}

impl Version {
    /// Parse the leading digits of the first two dot-separated components.
    ///
    /// Anything from the third component on is ignored, so `2.3`, `2.3.0`
    /// and `2.3.0-beta.1` are all `2.3`.
    pub fn parse(version: &str) -> Option<Self> {
        let mut parts = version.trim().splitn(3, '.');
        let major = leading_number(parts.next()?)?;
        let minor = leading_number(parts.next()?)?;
        Some(Self { major, minor })
    }

    /// Whether a server running `self` can serve a client at `client`.
    pub fn serves(&self, client: &Version) -> bool {
        self.major == client.major && self.minor >= client.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn leading_number(part: &str) -> Option<u64> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Check that a server at `remote` is compatible with a client at `local`.
///
/// An unparseable version on either side is incompatible.
pub fn validate_version(local: &str, remote: &str) -> Result<(), SyncError> {
    let compatible = match (Version::parse(local), Version::parse(remote)) {
        (Some(local), Some(remote)) => remote.serves(&local),
        _ => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(SyncError::IncompatibleVersion {
            local: local.to_owned(),
            remote: remote.to_owned(),
        })
    }
}

/// Map a failed version request onto the client's error taxonomy.
///
/// XML-RPC being disabled and bad credentials already come with good
/// messages from WordPress and pass through untouched.
pub fn classify_remote_error(mut err: RemoteError) -> SyncError {
    match err.code {
        Some(RemoteErrorCode::ConnectionRefused) => SyncError::ConnectionFailed,
        Some(RemoteErrorCode::Fault(METHOD_NOT_FOUND)) => SyncError::ExtensionMissing,
        Some(_) => SyncError::Remote(err),
        None => {
            err.message.push_str(DATABASE_HINT);
            SyncError::Remote(err)
        }
    }
}

impl<R: RemoteApi> Client<R> {
    /// Ask the server for its extension version and check it against ours.
    pub fn check_version(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Verifying XML-RPC version...");
        self.method(methods::GET_VERSION)
            .call(Vec::new(), |client, outcome| {
                let value = outcome.map_err(classify_remote_error)?;
                let remote = value.as_str().ok_or_else(|| {
                    unexpected(
                        methods::GET_VERSION,
                        format!("expected a version string, got {value}"),
                    )
                })?;
                validate_version(CLIENT_VERSION, remote)?;
                client.verbose_log("XML-RPC version matches client version.");
                Ok(())
            })
    }
}
