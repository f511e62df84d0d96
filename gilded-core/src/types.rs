//! Domain newtypes for synced content.
//!
//! Post paths always use `/` as separator regardless of platform, because they
//! double as keys on the WordPress side.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed WordPress taxonomy name (e.g. `category`, `post_tag`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Taxonomy(pub String);

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Taxonomy {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Taxonomy {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A term slug, unique within its taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermSlug(pub String);

impl fmt::Display for TermSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TermSlug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TermSlug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Location of a post relative to the posts directory, without extension.
///
/// `page/about/team` is the `team` page whose parent is `page/about`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostPath(pub String);

impl PostPath {
    /// First path component: the WordPress post type.
    pub fn post_type(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// Last path component: the post slug.
    pub fn slug(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Path of the parent post, if this post is nested below another one.
    pub fn parent(&self) -> Option<PostPath> {
        let (head, _) = self.0.rsplit_once('/')?;
        // `page/about` has no parent post; only `page/about/team` does.
        if head.contains('/') {
            Some(PostPath(head.to_owned()))
        } else {
            None
        }
    }

    /// Number of `/`-separated components.
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }
}

impl fmt::Display for PostPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PostPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PostPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
