//! Posts.
//!
//! Every file below `<dir>/posts/` is one post. The first directory names the
//! post type and nested directories name parent posts:
//!
//! ```text
//! posts/
//!   page/
//!     about.html          page "about"
//!     about/
//!       team.html         page "team", child of "about"
//!   post/
//!     hello-world.html
//! ```
//!
//! A post file may open with a `<script>{ ... }</script>` block holding JSON
//! metadata; the remainder is the post content.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use gilded_core::{ContentValue, PostPath, Taxonomy, TermSlug};

use crate::checksum::checksum;
use crate::client::Client;
use crate::error::{io_err, unexpected, SyncError};
use crate::pipeline::for_each_sequential;
use crate::remote::{methods, RemoteApi, RemoteValue};
use crate::terms::{known_slugs, load_taxonomies, Taxonomies};
use crate::walker::{recurse, relative_key};

/// Directory holding posts, relative to the content root.
pub const POSTS_DIR: &str = "posts";

/// Custom field the server keeps each post's checksum in.
pub const CHECKSUM_FIELD: &str = "gwcs";

const META_OPEN: &str = "<script>";
const META_CLOSE: &str = "</script>";

/// A `{ key, value }` custom field from post metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomField {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Metadata block of a post file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostMeta {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub menu_order: Option<i64>,
    pub comment_status: Option<String>,
    pub ping_status: Option<String>,
    pub term_slugs: BTreeMap<Taxonomy, Vec<TermSlug>>,
    pub custom_fields: Vec<CustomField>,
}

/// A post read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub path: PostPath,
    pub file: PathBuf,
    pub meta: PostMeta,
    pub content: String,
}

impl Post {
    pub fn status(&self) -> &str {
        self.meta.status.as_deref().unwrap_or("publish")
    }

    /// Everything that, when changed, requires the remote post to be updated.
    pub fn comparable(&self) -> ContentValue {
        let term_slugs = self
            .meta
            .term_slugs
            .iter()
            .map(|(taxonomy, slugs)| {
                let slugs: Vec<ContentValue> = slugs.iter().map(|s| ContentValue::from(&s.0)).collect();
                (taxonomy.0.clone(), ContentValue::from(slugs))
            });
        let custom_fields: Vec<ContentValue> = self
            .meta
            .custom_fields
            .iter()
            .map(|field| {
                ContentValue::map([
                    ("key", ContentValue::from(&field.key)),
                    ("value", ContentValue::from(field.value.clone())),
                ])
            })
            .collect();

        ContentValue::map([
            ("type", ContentValue::from(self.path.post_type())),
            ("name", ContentValue::from(self.path.slug())),
            ("parent", ContentValue::from(self.path.parent().map(|p| p.0))),
            ("title", ContentValue::from(self.meta.title.clone())),
            ("content", ContentValue::from(&self.content)),
            ("excerpt", ContentValue::from(self.meta.excerpt.clone())),
            ("date", ContentValue::from(self.meta.date)),
            ("status", ContentValue::from(self.status())),
            ("menuOrder", ContentValue::from(self.meta.menu_order)),
            ("commentStatus", ContentValue::from(self.meta.comment_status.clone())),
            ("pingStatus", ContentValue::from(self.meta.ping_status.clone())),
            ("termSlugs", ContentValue::map(term_slugs)),
            ("customFields", ContentValue::from(custom_fields)),
        ])
    }

    /// The `wp.newPost` / `wp.editPost` content struct.
    fn remote_content(
        &self,
        checksum: &str,
        parent: i64,
        terms: BTreeMap<String, RemoteValue>,
    ) -> RemoteValue {
        let mut fields = BTreeMap::from([
            ("post_type".to_string(), RemoteValue::from(self.path.post_type())),
            ("post_name".to_string(), RemoteValue::from(self.path.slug())),
            ("post_status".to_string(), RemoteValue::from(self.status())),
            ("post_content".to_string(), RemoteValue::from(self.content.as_str())),
            ("post_parent".to_string(), RemoteValue::Int(parent)),
            ("terms".to_string(), RemoteValue::Struct(terms)),
        ]);
        let optional = [
            ("post_title", self.meta.title.clone().map(RemoteValue::from)),
            ("post_excerpt", self.meta.excerpt.clone().map(RemoteValue::from)),
            ("post_date", self.meta.date.map(RemoteValue::DateTime)),
            ("menu_order", self.meta.menu_order.map(RemoteValue::Int)),
            ("comment_status", self.meta.comment_status.clone().map(RemoteValue::from)),
            ("ping_status", self.meta.ping_status.clone().map(RemoteValue::from)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                fields.insert(key.to_string(), value);
            }
        }

        let mut custom_fields: Vec<RemoteValue> = self
            .meta
            .custom_fields
            .iter()
            .map(|field| {
                RemoteValue::structure([
                    ("key", RemoteValue::from(field.key.as_str())),
                    ("value", RemoteValue::from(ContentValue::from(field.value.clone()))),
                ])
            })
            .collect();
        custom_fields.push(RemoteValue::structure([
            ("key", CHECKSUM_FIELD),
            ("value", checksum),
        ]));
        fields.insert("custom_fields".to_string(), RemoteValue::Array(custom_fields));

        RemoteValue::Struct(fields)
    }
}

/// Split a post file into its JSON metadata (if any) and trimmed content.
pub fn split_post_source(source: &str) -> Result<(Option<&str>, &str), String> {
    let trimmed = source.trim_start();
    let Some(rest) = trimmed.strip_prefix(META_OPEN) else {
        return Ok((None, source.trim()));
    };
    let Some(end) = rest.find(META_CLOSE) else {
        return Err(format!("unterminated {META_OPEN} metadata block"));
    };
    let meta = &rest[..end];
    let content = &rest[end + META_CLOSE.len()..];
    Ok((Some(meta), content.trim()))
}

/// Read the post stored at `file` below `posts_dir`.
pub fn read_post(posts_dir: &Path, file: &Path) -> Result<Post, SyncError> {
    let invalid = |reason: String| SyncError::InvalidPost {
        path: file.to_path_buf(),
        reason,
    };

    let path = PostPath::from(relative_key(posts_dir, &file.with_extension("")));
    if path.depth() < 2 {
        return Err(invalid(format!(
            "posts must live in a post type directory below {}",
            posts_dir.display()
        )));
    }

    let source = std::fs::read_to_string(file).map_err(|e| io_err(file, e))?;
    let (meta, content) = split_post_source(&source).map_err(invalid)?;
    let meta = match meta {
        Some(json) => serde_json::from_str(json).map_err(|source| SyncError::Json {
            path: file.to_path_buf(),
            source,
        })?,
        None => PostMeta::default(),
    };

    Ok(Post {
        path,
        file: file.to_path_buf(),
        meta,
        content: content.to_string(),
    })
}

/// Read every post below `<dir>/posts`, checking term references against
/// `taxonomies` and that every nested post has a parent.
pub fn check_posts(dir: &Path, taxonomies: &Taxonomies) -> Result<Vec<Post>, SyncError> {
    let known = known_slugs(taxonomies);
    let posts_dir = dir.join(POSTS_DIR);
    let mut posts: Vec<Post> = Vec::new();
    let mut seen = BTreeSet::new();

    recurse(&mut posts, &posts_dir, &mut |posts: &mut Vec<Post>, file: &Path| -> Result<(), SyncError> {
        let post = read_post(&posts_dir, file)?;
        check_post_terms(&post, &known)?;
        if let Some(parent) = post.path.parent() {
            if !seen.contains(&parent) {
                return Err(missing_parent(&post, &parent));
            }
        }
        seen.insert(post.path.clone());
        posts.push(post);
        Ok(())
    })?;
    Ok(posts)
}

fn check_post_terms(
    post: &Post,
    known: &BTreeMap<Taxonomy, BTreeSet<TermSlug>>,
) -> Result<(), SyncError> {
    for (taxonomy, slugs) in &post.meta.term_slugs {
        for slug in slugs {
            let defined = known.get(taxonomy).is_some_and(|set| set.contains(slug));
            if !defined {
                return Err(SyncError::UnknownTerm {
                    post: post.path.clone(),
                    taxonomy: taxonomy.clone(),
                    slug: slug.clone(),
                });
            }
        }
    }
    Ok(())
}

fn missing_parent(post: &Post, parent: &PostPath) -> SyncError {
    SyncError::InvalidPost {
        path: post.file.clone(),
        reason: format!("parent post '{parent}' does not exist"),
    }
}

/// Server-side record of a synced post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePost {
    pub id: i64,
    pub checksum: Option<String>,
}

fn parse_post_paths(value: RemoteValue) -> Result<BTreeMap<PostPath, RemotePost>, SyncError> {
    let entries = value.as_struct().ok_or_else(|| {
        unexpected(methods::GET_POST_PATHS, format!("expected a struct, got {value}"))
    })?;

    entries
        .iter()
        .map(|(path, entry)| -> Result<(PostPath, RemotePost), SyncError> {
            let id = entry
                .get("id")
                .and_then(RemoteValue::as_i64)
                .ok_or_else(|| unexpected(methods::GET_POST_PATHS, format!("no id for {path}")))?;
            let checksum = entry
                .get("checksum")
                .and_then(RemoteValue::as_str)
                .map(str::to_owned);
            Ok((PostPath::from(path.as_str()), RemotePost { id, checksum }))
        })
        .collect()
}

impl<R: RemoteApi> Client<R> {
    /// Read every post and check its metadata, term references and parent.
    pub fn validate_posts(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Validating posts...");
        let taxonomies = load_taxonomies(&self.options().dir)?;
        let posts = check_posts(&self.options().dir, &taxonomies)?;
        self.verbose_log(&format!("All {} posts are valid.", posts.len()));
        Ok(())
    }

    /// Create, update and delete remote posts so they match `<dir>/posts`.
    ///
    /// Expects [`Client::sync_terms`] to have run, since posts refer to terms
    /// by their remote ids.
    pub fn sync_posts(&mut self) -> Result<(), SyncError> {
        self.verbose_log("Synchronizing posts...");
        let mut remote = self
            .method(methods::GET_POST_PATHS)
            .call(vec![RemoteValue::from("any")], |_, outcome| {
                parse_post_paths(outcome?)
            })?;
        self.state.post_ids.clear();

        let posts_dir = self.path(POSTS_DIR);
        recurse(self, &posts_dir, &mut |client: &mut Self, file: &Path| -> Result<(), SyncError> {
            let post = read_post(&posts_dir, file)?;
            let existing = remote.remove(&post.path);
            client.sync_post(post, existing)
        })?;

        // Children before parents.
        let mut stale: Vec<(PostPath, RemotePost)> = remote.into_iter().collect();
        stale.sort_by(|(a, _), (b, _)| b.depth().cmp(&a.depth()).then_with(|| a.cmp(b)));
        for_each_sequential(self, stale, |client, (path, post)| {
            client.delete_post(&path, post.id)
        })?;

        self.verbose_log("Posts synchronized.");
        Ok(())
    }

    fn sync_post(&mut self, post: Post, existing: Option<RemotePost>) -> Result<(), SyncError> {
        let parent = match post.path.parent() {
            Some(parent) => self
                .state
                .post_ids
                .get(&parent)
                .copied()
                .ok_or_else(|| missing_parent(&post, &parent))?,
            None => 0,
        };
        let terms = self.resolve_terms(&post)?;
        let checksum = checksum(&post.comparable());

        match existing {
            Some(remote) if remote.checksum.as_deref() == Some(checksum.as_str()) => {
                tracing::debug!("post {} unchanged", post.path);
                self.state.post_ids.insert(post.path, remote.id);
                Ok(())
            }
            Some(remote) => {
                let content = post.remote_content(&checksum, parent, terms);
                self.method(methods::EDIT_POST).call(
                    vec![RemoteValue::Int(remote.id), content],
                    |client, outcome| {
                        outcome?;
                        client.verbose_log(&format!("Updated post {}.", post.path));
                        client.state.post_ids.insert(post.path.clone(), remote.id);
                        Ok(())
                    },
                )
            }
            None => {
                let content = post.remote_content(&checksum, parent, terms);
                self.method(methods::NEW_POST)
                    .call(vec![content], |client, outcome| {
                        let value = outcome?;
                        let id = value.as_i64().ok_or_else(|| {
                            unexpected(methods::NEW_POST, format!("expected a post id, got {value}"))
                        })?;
                        client.verbose_log(&format!("Created post {}.", post.path));
                        client.state.post_ids.insert(post.path.clone(), id);
                        Ok(())
                    })
            }
        }
    }

    /// Remote term ids for the post's `termSlugs`, keyed by taxonomy.
    fn resolve_terms(&self, post: &Post) -> Result<BTreeMap<String, RemoteValue>, SyncError> {
        let mut terms = BTreeMap::new();
        for (taxonomy, slugs) in &post.meta.term_slugs {
            let mut ids = Vec::with_capacity(slugs.len());
            for slug in slugs {
                let id = self.term_id(taxonomy, slug).ok_or_else(|| SyncError::UnknownTerm {
                    post: post.path.clone(),
                    taxonomy: taxonomy.clone(),
                    slug: slug.clone(),
                })?;
                ids.push(RemoteValue::Int(id));
            }
            terms.insert(taxonomy.0.clone(), RemoteValue::Array(ids));
        }
        Ok(terms)
    }

    fn delete_post(&mut self, path: &PostPath, id: i64) -> Result<(), SyncError> {
        self.method(methods::DELETE_POST)
            .call(vec![RemoteValue::Int(id)], |client, outcome| {
                outcome?;
                client.verbose_log(&format!("Deleted post {path}."));
                Ok(())
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::terms::Term;

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn source_without_metadata_is_all_content() {
        let (meta, content) = split_post_source("\n<p>Hello</p>\n").unwrap();
        assert_eq!(meta, None);
        assert_eq!(content, "<p>Hello</p>");
    }

    #[test]
    fn source_with_metadata_is_split() {
        let (meta, content) =
            split_post_source("<script>{\"title\":\"Hi\"}</script>\n\n<p>Body</p>\n").unwrap();
        assert_eq!(meta, Some("{\"title\":\"Hi\"}"));
        assert_eq!(content, "<p>Body</p>");
    }

    #[test]
    fn unterminated_metadata_is_rejected() {
        assert!(split_post_source("<script>{\"title\":\"Hi\"}").is_err());
    }

    #[test]
    fn read_post_derives_path_and_metadata() {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join(POSTS_DIR);
        let file = posts_dir.join("page/about/team.html");
        write(
            &file,
            r#"<script>{"title":"Team","menuOrder":2,"termSlugs":{"category":["people"]},"date":"2021-10-19T04:27:00Z"}</script>
<p>Our team</p>"#,
        );

        let post = read_post(&posts_dir, &file).unwrap();
        assert_eq!(post.path, PostPath::from("page/about/team"));
        assert_eq!(post.meta.title.as_deref(), Some("Team"));
        assert_eq!(post.meta.menu_order, Some(2));
        assert_eq!(post.content, "<p>Our team</p>");
        assert_eq!(post.status(), "publish");
        assert!(post.meta.date.is_some());
        assert_eq!(
            post.meta.term_slugs[&Taxonomy::from("category")],
            vec![TermSlug::from("people")]
        );
    }

    #[test]
    fn post_outside_type_directory_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join(POSTS_DIR);
        let file = posts_dir.join("stray.html");
        write(&file, "<p>stray</p>");

        let err = read_post(&posts_dir, &file).unwrap_err();
        assert!(matches!(err, SyncError::InvalidPost { .. }), "got: {err}");
    }

    #[test]
    fn malformed_metadata_reports_json_error() {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join(POSTS_DIR);
        let file = posts_dir.join("post/broken.html");
        write(&file, "<script>{ title: }</script>body");

        let err = read_post(&posts_dir, &file).unwrap_err();
        assert!(matches!(err, SyncError::Json { .. }), "got: {err}");
    }

    #[test]
    fn comparable_ignores_metadata_key_order() {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join(POSTS_DIR);
        let a = posts_dir.join("post/a.html");
        let b = posts_dir.join("post/b.html");
        write(&a, r#"<script>{"title":"Same","excerpt":"x"}</script>body"#);
        write(&b, r#"<script>{"excerpt":"x","title":"Same"}</script>body"#);

        let mut post_a = read_post(&posts_dir, &a).unwrap();
        let post_b = read_post(&posts_dir, &b).unwrap();
        post_a.path = post_b.path.clone();
        assert_eq!(checksum(&post_a.comparable()), checksum(&post_b.comparable()));
    }

    #[test]
    fn check_posts_requires_known_terms_and_parents() {
        let tmp = TempDir::new().unwrap();
        let posts_dir = tmp.path().join(POSTS_DIR);
        write(
            &posts_dir.join("post/tagged.html"),
            r#"<script>{"termSlugs":{"category":["missing"]}}</script>body"#,
        );
        let taxonomies = Taxonomies::from([(
            Taxonomy::from("category"),
            vec![Term {
                name: "News".into(),
                slug: TermSlug::from("news"),
                ..Term::default()
            }],
        )]);
        let err = check_posts(tmp.path(), &taxonomies).unwrap_err();
        assert!(matches!(err, SyncError::UnknownTerm { .. }), "got: {err}");

        fs::remove_file(posts_dir.join("post/tagged.html")).unwrap();
        write(&posts_dir.join("page/orphan/child.html"), "child");
        let err = check_posts(tmp.path(), &taxonomies).unwrap_err();
        assert!(err.to_string().contains("parent post 'page/orphan'"), "got: {err}");

        write(&posts_dir.join("page/orphan.html"), "parent");
        let posts = check_posts(tmp.path(), &taxonomies).unwrap();
        let paths: Vec<_> = posts.iter().map(|p| p.path.0.as_str()).collect();
        assert_eq!(paths, vec!["page/orphan", "page/orphan/child"]);
    }

    #[test]
    fn remote_content_carries_checksum_field() {
        let post = Post {
            path: PostPath::from("post/hello"),
            file: PathBuf::from("posts/post/hello.html"),
            meta: PostMeta {
                title: Some("Hello".into()),
                ..PostMeta::default()
            },
            content: "body".into(),
        };
        let content = post.remote_content("abc123", 0, BTreeMap::new());
        assert_eq!(content.get("post_title").and_then(RemoteValue::as_str), Some("Hello"));
        assert_eq!(content.get("post_name").and_then(RemoteValue::as_str), Some("hello"));
        assert!(content.get("post_excerpt").is_none());

        let fields = content.get("custom_fields").and_then(RemoteValue::as_array).unwrap();
        let last = fields.last().unwrap();
        assert_eq!(last.get("key").and_then(RemoteValue::as_str), Some(CHECKSUM_FIELD));
        assert_eq!(last.get("value").and_then(RemoteValue::as_str), Some("abc123"));
    }
}
