//! Gilded core library: content values, domain newtypes, configuration, errors.
//!
//! Public API surface:
//! - [`content`]: [`ContentValue`], the shape everything is checksummed as
//! - [`types`]: newtypes for taxonomies, term slugs and post paths
//! - [`config`]: [`ClientOptions`] and YAML loading
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod content;
pub mod error;
pub mod types;

pub use config::ClientOptions;
pub use content::ContentValue;
pub use error::ConfigError;
pub use types::{PostPath, Taxonomy, TermSlug};
