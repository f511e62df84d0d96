//! Resources: arbitrary files below `<dir>/resources/`, uploaded byte for byte.
//!
//! The server keeps an md5 checksum per resource path; a resource is only
//! re-uploaded when the local bytes hash differently.

use std::collections::BTreeMap;
use std::path::Path;

use crate::checksum::checksum_bytes;
use crate::client::Client;
use crate::error::{io_err, unexpected, SyncError};
use crate::pipeline::for_each_sequential;
use crate::remote::{methods, RemoteApi, RemoteValue};
use crate::walker::{recurse, relative_key};

/// Directory holding resources, relative to the content root.
pub const RESOURCES_DIR: &str = "resources";

fn parse_resources(value: RemoteValue) -> Result<BTreeMap<String, String>, SyncError> {
    let entries = value.as_struct().ok_or_else(|| {
        unexpected(methods::GET_RESOURCES, format!("expected a struct, got {value}"))
    })?;
    Ok(entries
        .iter()
        .map(|(path, checksum)| {
            let checksum = checksum.as_str().unwrap_or_default().to_owned();
            (path.clone(), checksum)
        })
        .collect())
}

impl<R: RemoteApi> Client<R> {
    /// Upload changed resources and delete remote ones with no local file.
    pub fn sync_resources(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Synchronizing resources...");
        let mut remote = self
            .method(methods::GET_RESOURCES)
            .call(Vec::new(), |_, outcome| parse_resources(outcome?))?;

        let resources_dir = self.path(RESOURCES_DIR);
        recurse(
            self,
            &resources_dir,
            &mut |client: &mut Self, file: &Path| -> Result<(), SyncError> {
                let key = relative_key(&resources_dir, file);
                let bytes = std::fs::read(file).map_err(|e| io_err(file, e))?;
                let local = checksum_bytes(&bytes);
                match remote.remove(&key) {
                    Some(existing) if existing == local => {
                        tracing::debug!("resource {key} unchanged");
                        Ok(())
                    }
                    _ => client.upload_resource(&key, bytes),
                }
            },
        )?;

        for_each_sequential(self, remote.into_keys(), |client, key| {
            client.delete_resource(&key)
        })?;
        self.verbose_log("Resources synchronized.");
        Ok(())
    }

    fn upload_resource(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SyncError> {
        self.method(methods::ADD_RESOURCE).call(
            vec![RemoteValue::from(key), RemoteValue::Base64(bytes)],
            |client, outcome| {
                outcome?;
                client.verbose_log(&format!("Uploaded resource {key}."));
                Ok(())
            },
        )
    }

    fn delete_resource(&mut self, key: &str) -> Result<(), SyncError> {
        self.method(methods::DELETE_RESOURCE)
            .call(vec![RemoteValue::from(key)], |client, outcome| {
                outcome?;
                client.verbose_log(&format!("Deleted resource {key}."));
                Ok(())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_listing_maps_path_to_checksum() {
        let value = RemoteValue::structure([
            ("css/site.css", RemoteValue::from("5d41402abc4b2a76b9719d911017c592")),
            ("img/logo.png", RemoteValue::Nil),
        ]);
        let parsed = parse_resources(value).unwrap();
        assert_eq!(parsed["css/site.css"], "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(parsed["img/logo.png"], "");
    }

    #[test]
    fn non_struct_listing_is_unexpected() {
        let err = parse_resources(RemoteValue::Array(Vec::new())).unwrap_err();
        assert!(matches!(err, SyncError::UnexpectedResponse { .. }), "got: {err}");
    }
}
