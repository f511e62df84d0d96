//! Taxonomy terms.
//!
//! Terms are declared in `<dir>/taxonomies.json`:
//!
//! ```json
//! {
//!   "category": [
//!     { "name": "News", "slug": "news", "children": [
//!       { "name": "Releases", "slug": "releases", "description": "Release notes" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Sync matches terms by slug. Parents are synced before their children so a
//! child can point at its parent's remote id.

use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use gilded_core::{ContentValue, Taxonomy, TermSlug};

use crate::checksum::checksum;
use crate::client::Client;
use crate::error::{io_err, unexpected, SyncError};
use crate::pipeline::for_each_sequential;
use crate::remote::{methods, RemoteApi, RemoteValue};

/// File holding every taxonomy's terms, relative to the content root.
pub const TAXONOMIES_FILE: &str = "taxonomies.json";

/// A locally declared term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: TermSlug,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Term>,
}

/// Terms per taxonomy, top-level terms in declaration order.
pub type Taxonomies = BTreeMap<Taxonomy, Vec<Term>>;

/// A term as reported by `wp.getTerms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTerm {
    pub id: i64,
    pub name: String,
    pub slug: TermSlug,
    pub description: String,
    pub parent: i64,
}

impl RemoteTerm {
    fn comparable(&self) -> ContentValue {
        comparable(&self.name, &self.slug, &self.description, self.parent)
    }
}

fn comparable(name: &str, slug: &TermSlug, description: &str, parent: i64) -> ContentValue {
    ContentValue::map([
        ("name", ContentValue::from(name)),
        ("slug", ContentValue::from(&slug.0)),
        ("description", ContentValue::from(description)),
        ("parent", ContentValue::Int(parent)),
    ])
}

/// Load `taxonomies.json` from the content root. A missing file means no taxonomies.
pub fn load_taxonomies(dir: &Path) -> Result<Taxonomies, SyncError> {
    let path = dir.join(TAXONOMIES_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Taxonomies::new()),
        Err(err) => return Err(io_err(&path, err)),
    };
    serde_json::from_str(&contents).map_err(|source| SyncError::Json { path, source })
}

/// Every term needs a name and a slug, and slugs are unique per taxonomy.
pub fn check_taxonomies(taxonomies: &Taxonomies) -> Result<(), SyncError> {
    for (taxonomy, terms) in taxonomies {
        let mut seen = BTreeSet::new();
        check_terms(taxonomy, terms, &mut seen)?;
    }
    Ok(())
}

fn check_terms<'t>(
    taxonomy: &Taxonomy,
    terms: &'t [Term],
    seen: &mut BTreeSet<&'t TermSlug>,
) -> Result<(), SyncError> {
    for term in terms {
        let invalid = |reason: String| SyncError::InvalidTerm {
            taxonomy: taxonomy.clone(),
            reason,
        };
        if term.slug.0.trim().is_empty() {
            return Err(invalid(format!("term '{}' has no slug", term.name)));
        }
        if term.name.trim().is_empty() {
            return Err(invalid(format!("term '{}' has no name", term.slug)));
        }
        if !seen.insert(&term.slug) {
            return Err(invalid(format!("duplicate slug '{}'", term.slug)));
        }
        check_terms(taxonomy, &term.children, seen)?;
    }
    Ok(())
}

/// All slugs declared per taxonomy, nested terms included.
pub fn known_slugs(taxonomies: &Taxonomies) -> BTreeMap<Taxonomy, BTreeSet<TermSlug>> {
    fn collect(terms: &[Term], into: &mut BTreeSet<TermSlug>) {
        for term in terms {
            into.insert(term.slug.clone());
            collect(&term.children, into);
        }
    }

    taxonomies
        .iter()
        .map(|(taxonomy, terms)| {
            let mut slugs = BTreeSet::new();
            collect(terms, &mut slugs);
            (taxonomy.clone(), slugs)
        })
        .collect()
}

fn parse_remote_terms(value: RemoteValue) -> Result<Vec<RemoteTerm>, SyncError> {
    let items = value
        .as_array()
        .ok_or_else(|| unexpected(methods::GET_TERMS, format!("expected an array, got {value}")))?;

    items
        .iter()
        .map(|item| -> Result<RemoteTerm, SyncError> {
            let text = |key: &str| {
                item.get(key)
                    .and_then(RemoteValue::as_str)
                    .unwrap_or_default()
                    .to_owned()
            };
            let id = item
                .get("term_id")
                .and_then(RemoteValue::as_i64)
                .ok_or_else(|| unexpected(methods::GET_TERMS, "term without term_id"))?;
            Ok(RemoteTerm {
                id,
                name: text("name"),
                slug: TermSlug::from(text("slug")),
                description: text("description"),
                parent: item.get("parent").and_then(RemoteValue::as_i64).unwrap_or(0),
            })
        })
        .collect()
}

fn term_struct(taxonomy: &Taxonomy, term: &Term, parent: i64) -> RemoteValue {
    RemoteValue::structure([
        ("taxonomy", RemoteValue::from(taxonomy.0.as_str())),
        ("name", RemoteValue::from(term.name.as_str())),
        ("slug", RemoteValue::from(term.slug.0.as_str())),
        ("description", RemoteValue::from(term.description.as_str())),
        ("parent", RemoteValue::Int(parent)),
    ])
}

impl<R: RemoteApi> Client<R> {
    /// Check `taxonomies.json` without contacting the server.
    pub fn validate_terms(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Validating terms...");
        let taxonomies = load_taxonomies(&self.options().dir)?;
        check_taxonomies(&taxonomies)?;
        self.verbose_log("All terms are valid.");
        Ok(())
    }

    /// Create, update and delete remote terms so they match `taxonomies.json`.
    pub fn sync_terms(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Synchronizing terms...");
        let taxonomies = load_taxonomies(&self.options().dir)?;
        check_taxonomies(&taxonomies)?;
        self.state.term_ids.clear();

        for_each_sequential(self, taxonomies, |client, (taxonomy, terms)| {
            client.sync_taxonomy(&taxonomy, &terms)
        })?;
        self.verbose_log("Terms synchronized.");
        Ok(())
    }

    fn sync_taxonomy(&mut self, taxonomy: &Taxonomy, terms: &[Term]) -> Result<(), SyncError> {
        let remote_terms = self
            .method(methods::GET_TERMS)
            .call(vec![RemoteValue::from(taxonomy.0.as_str())], |_, outcome| {
                parse_remote_terms(outcome?)
            })?;
        let mut remaining: BTreeMap<TermSlug, RemoteTerm> = remote_terms
            .into_iter()
            .map(|term| (term.slug.clone(), term))
            .collect();

        self.sync_term_level(taxonomy, terms, 0, &mut remaining)?;

        for_each_sequential(self, remaining.into_values(), |client, stale| {
            client.delete_term(taxonomy, stale)
        })
    }

    fn sync_term_level(
        &mut self,
        taxonomy: &Taxonomy,
        terms: &[Term],
        parent: i64,
        remaining: &mut BTreeMap<TermSlug, RemoteTerm>,
    ) -> Result<(), SyncError> {
        for term in terms {
            let id = match remaining.remove(&term.slug) {
                Some(existing) => {
                    self.update_term(taxonomy, term, parent, &existing)?;
                    existing.id
                }
                None => self.create_term(taxonomy, term, parent)?,
            };
            self.state
                .term_ids
                .entry(taxonomy.clone())
                .or_default()
                .insert(term.slug.clone(), id);
            self.sync_term_level(taxonomy, &term.children, id, remaining)?;
        }
        Ok(())
    }

    fn create_term(&mut self, taxonomy: &Taxonomy, term: &Term, parent: i64) -> Result<i64, SyncError> {
        self.method(methods::NEW_TERM)
            .call(vec![term_struct(taxonomy, term, parent)], |client, outcome| {
                let value = outcome?;
                let id = value.as_i64().ok_or_else(|| {
                    unexpected(methods::NEW_TERM, format!("expected a term id, got {value}"))
                })?;
                client.verbose_log(&format!("Created term {taxonomy}/{}.", term.slug));
                Ok(id)
            })
    }

    fn update_term(
        &mut self,
        taxonomy: &Taxonomy,
        term: &Term,
        parent: i64,
        existing: &RemoteTerm,
    ) -> Result<(), SyncError> {
        let local = comparable(&term.name, &term.slug, &term.description, parent);
        if checksum(&local) == checksum(&existing.comparable()) {
            tracing::debug!("term {taxonomy}/{} unchanged", term.slug);
            return Ok(());
        }

        self.method(methods::EDIT_TERM).call(
            vec![RemoteValue::Int(existing.id), term_struct(taxonomy, term, parent)],
            |client, outcome| {
                outcome?;
                client.verbose_log(&format!("Updated term {taxonomy}/{}.", term.slug));
                Ok(())
            },
        )
    }

    fn delete_term(&mut self, taxonomy: &Taxonomy, stale: RemoteTerm) -> Result<(), SyncError> {
        self.method(methods::DELETE_TERM).call(
            vec![RemoteValue::from(taxonomy.0.as_str()), RemoteValue::Int(stale.id)],
            |client, outcome| {
                outcome?;
                client.verbose_log(&format!("Deleted term {taxonomy}/{}.", stale.slug));
                Ok(())
            },
        )
    }
}
