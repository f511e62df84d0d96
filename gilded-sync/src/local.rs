//! Offline inspection of a content directory.
//!
//! Everything here reads the local tree only, so it works without a server:
//! `lint` runs the same checks as [`Client::validate`](crate::Client::validate)
//! minus the version check, and `scan` lists the checksums sync would compare.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::checksum::{checksum, checksum_bytes};
use crate::error::{io_err, SyncError};
use crate::posts::check_posts;
use crate::resources::RESOURCES_DIR;
use crate::terms::{check_taxonomies, load_taxonomies, Term};
use crate::walker::{recurse, relative_key};

/// Counts of everything a lint pass found valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LintSummary {
    pub taxonomies: usize,
    pub terms: usize,
    pub posts: usize,
    pub resources: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    Post,
    Resource,
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanKind::Post => f.write_str("post"),
            ScanKind::Resource => f.write_str("resource"),
        }
    }
}

/// A post or resource with the checksum sync compares against the server's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    pub kind: ScanKind,
    pub key: String,
    pub checksum: String,
}

/// Validate terms and posts below `dir` and count resources.
pub fn lint(dir: &Path) -> Result<LintSummary, SyncError> {
    let taxonomies = load_taxonomies(dir)?;
    check_taxonomies(&taxonomies)?;
    let posts = check_posts(dir, &taxonomies)?;

    let mut resources = 0usize;
    recurse(
        &mut resources,
        &dir.join(RESOURCES_DIR),
        &mut |count: &mut usize, _: &Path| -> Result<(), SyncError> {
            *count += 1;
            Ok(())
        },
    )?;

    fn count_terms(terms: &[Term]) -> usize {
        terms.iter().map(|t| 1 + count_terms(&t.children)).sum()
    }

    Ok(LintSummary {
        taxonomies: taxonomies.len(),
        terms: taxonomies.values().map(|terms| count_terms(terms)).sum(),
        posts: posts.len(),
        resources,
    })
}

/// Every post and resource below `dir`, in sync order.
pub fn scan(dir: &Path) -> Result<Vec<ScanEntry>, SyncError> {
    let taxonomies = load_taxonomies(dir)?;
    let mut entries: Vec<ScanEntry> = check_posts(dir, &taxonomies)?
        .into_iter()
        .map(|post| ScanEntry {
            kind: ScanKind::Post,
            checksum: checksum(&post.comparable()),
            key: post.path.0,
        })
        .collect();

    let resources_dir = dir.join(RESOURCES_DIR);
    recurse(
        &mut entries,
        &resources_dir,
        &mut |entries: &mut Vec<ScanEntry>, file: &Path| -> Result<(), SyncError> {
            let bytes = std::fs::read(file).map_err(|e| io_err(file, e))?;
            entries.push(ScanEntry {
                kind: ScanKind::Resource,
                key: relative_key(&resources_dir, file),
                checksum: checksum_bytes(&bytes),
            });
            Ok(())
        },
    )?;
    Ok(entries)
}
