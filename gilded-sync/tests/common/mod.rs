#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use gilded_sync::remote::{methods, METHOD_NOT_FOUND};
use gilded_sync::{checksum_bytes, Logger, RemoteApi, RemoteError, RemoteValue, CLIENT_VERSION};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTerm {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub path: String,
    pub parent: i64,
    pub checksum: Option<String>,
    pub fields: RemoteValue,
}

/// In-memory stand-in for a WordPress site with the Gilded extension.
#[derive(Debug)]
pub struct MemoryRemote {
    pub version: String,
    pub extension_installed: bool,
    pub refuse_connections: bool,
    pub terms: BTreeMap<String, Vec<StoredTerm>>,
    pub posts: BTreeMap<i64, StoredPost>,
    pub resources: BTreeMap<String, Vec<u8>>,
    pub calls: Vec<String>,
    next_id: i64,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self {
            version: CLIENT_VERSION.to_string(),
            extension_installed: true,
            refuse_connections: false,
            terms: BTreeMap::new(),
            posts: BTreeMap::new(),
            resources: BTreeMap::new(),
            calls: Vec::new(),
            next_id: 100,
        }
    }
}

impl MemoryRemote {
    /// A server that is down: every call is refused.
    pub fn refusing() -> Self {
        Self {
            refuse_connections: true,
            ..Self::default()
        }
    }

    /// A server whose Gilded extension reports `version`.
    pub fn with_version(version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..Self::default()
        }
    }

    /// A plain WordPress install: the `gw.*` methods do not exist.
    pub fn without_extension() -> Self {
        Self {
            extension_installed: false,
            ..Self::default()
        }
    }

    pub fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Calls that changed something on the server.
    pub fn writes(&self) -> Vec<&str> {
        self.calls
            .iter()
            .map(String::as_str)
            .filter(|call| {
                !matches!(
                    *call,
                    methods::GET_VERSION
                        | methods::GET_TERMS
                        | methods::GET_POST_PATHS
                        | methods::GET_RESOURCES
                )
            })
            .collect()
    }

    pub fn post(&self, path: &str) -> Option<(i64, &StoredPost)> {
        self.posts
            .iter()
            .find(|(_, post)| post.path == path)
            .map(|(id, post)| (*id, post))
    }

    pub fn term(&self, taxonomy: &str, slug: &str) -> Option<&StoredTerm> {
        self.terms.get(taxonomy)?.iter().find(|t| t.slug == slug)
    }

    /// Seed a post the way an earlier sync would have left it.
    pub fn seed_post(&mut self, path: &str, parent: i64) -> i64 {
        let id = self.allocate_id();
        self.posts.insert(
            id,
            StoredPost {
                path: path.to_string(),
                parent,
                checksum: Some("0".repeat(32)),
                fields: RemoteValue::Nil,
            },
        );
        id
    }

    fn post_path(&self, fields: &RemoteValue) -> String {
        let name = text(fields, "post_name");
        let parent = fields.get("post_parent").and_then(RemoteValue::as_i64).unwrap_or(0);
        match self.posts.get(&parent) {
            Some(parent) => format!("{}/{name}", parent.path),
            None => format!("{}/{name}", text(fields, "post_type")),
        }
    }

    fn store_post(&mut self, id: i64, fields: RemoteValue) {
        let checksum = fields
            .get("custom_fields")
            .and_then(RemoteValue::as_array)
            .and_then(|fields| {
                fields
                    .iter()
                    .find(|f| f.get("key").and_then(RemoteValue::as_str) == Some("gwcs"))
            })
            .and_then(|f| f.get("value"))
            .and_then(RemoteValue::as_str)
            .map(str::to_owned);
        let post = StoredPost {
            path: self.post_path(&fields),
            parent: fields.get("post_parent").and_then(RemoteValue::as_i64).unwrap_or(0),
            checksum,
            fields,
        };
        self.posts.insert(id, post);
    }

    fn stored_term(id: i64, fields: &RemoteValue) -> (String, StoredTerm) {
        let term = StoredTerm {
            id,
            name: text(fields, "name").to_string(),
            slug: text(fields, "slug").to_string(),
            description: text(fields, "description").to_string(),
            parent: fields.get("parent").and_then(RemoteValue::as_i64).unwrap_or(0),
        };
        (text(fields, "taxonomy").to_string(), term)
    }
}

fn text<'a>(fields: &'a RemoteValue, key: &str) -> &'a str {
    fields.get(key).and_then(RemoteValue::as_str).unwrap_or_default()
}

fn arg(args: &[RemoteValue], index: usize) -> Result<&RemoteValue, RemoteError> {
    args.get(index)
        .ok_or_else(|| RemoteError::fault(400, format!("missing argument {index}")))
}

fn id_arg(args: &[RemoteValue], index: usize) -> Result<i64, RemoteError> {
    arg(args, index)?
        .as_i64()
        .ok_or_else(|| RemoteError::fault(400, format!("argument {index} is not an id")))
}

impl RemoteApi for MemoryRemote {
    fn authenticated_call(
        &mut self,
        method: &str,
        args: &[RemoteValue],
    ) -> Result<RemoteValue, RemoteError> {
        if self.refuse_connections {
            return Err(RemoteError::connection_refused("connect ECONNREFUSED 127.0.0.1:80"));
        }
        self.calls.push(method.to_string());

        match method {
            methods::GET_VERSION if self.extension_installed => {
                Ok(RemoteValue::from(self.version.as_str()))
            }
            methods::GET_TERMS => {
                let taxonomy = arg(args, 0)?.as_str().unwrap_or_default();
                let terms = self.terms.get(taxonomy).cloned().unwrap_or_default();
                Ok(RemoteValue::Array(
                    terms
                        .into_iter()
                        .map(|t| {
                            RemoteValue::structure([
                                ("term_id", RemoteValue::from(t.id.to_string())),
                                ("name", RemoteValue::from(t.name)),
                                ("slug", RemoteValue::from(t.slug)),
                                ("description", RemoteValue::from(t.description)),
                                ("parent", RemoteValue::from(t.parent.to_string())),
                            ])
                        })
                        .collect(),
                ))
            }
            methods::NEW_TERM => {
                let id = self.allocate_id();
                let (taxonomy, term) = Self::stored_term(id, arg(args, 0)?);
                self.terms.entry(taxonomy).or_default().push(term);
                Ok(RemoteValue::from(id.to_string()))
            }
            methods::EDIT_TERM => {
                let id = id_arg(args, 0)?;
                let (taxonomy, term) = Self::stored_term(id, arg(args, 1)?);
                let terms = self.terms.entry(taxonomy).or_default();
                terms.retain(|t| t.id != id);
                terms.push(term);
                Ok(RemoteValue::Bool(true))
            }
            methods::DELETE_TERM => {
                let taxonomy = arg(args, 0)?.as_str().unwrap_or_default().to_string();
                let id = id_arg(args, 1)?;
                if let Some(terms) = self.terms.get_mut(&taxonomy) {
                    terms.retain(|t| t.id != id);
                }
                Ok(RemoteValue::Bool(true))
            }
            methods::GET_POST_PATHS if self.extension_installed => Ok(RemoteValue::Struct(
                self.posts
                    .iter()
                    .map(|(id, post)| {
                        let mut entry = vec![("id", RemoteValue::Int(*id))];
                        if let Some(checksum) = &post.checksum {
                            entry.push(("checksum", RemoteValue::from(checksum.as_str())));
                        }
                        (post.path.clone(), RemoteValue::structure(entry))
                    })
                    .collect(),
            )),
            methods::NEW_POST => {
                let id = self.allocate_id();
                self.store_post(id, arg(args, 0)?.clone());
                Ok(RemoteValue::from(id.to_string()))
            }
            methods::EDIT_POST => {
                let id = id_arg(args, 0)?;
                self.store_post(id, arg(args, 1)?.clone());
                Ok(RemoteValue::Bool(true))
            }
            methods::DELETE_POST => {
                let id = id_arg(args, 0)?;
                if self.posts.values().any(|post| post.parent == id) {
                    return Err(RemoteError::fault(409, format!("post {id} still has children")));
                }
                self.posts.remove(&id);
                Ok(RemoteValue::Bool(true))
            }
            methods::GET_RESOURCES if self.extension_installed => Ok(RemoteValue::Struct(
                self.resources
                    .iter()
                    .map(|(path, bytes)| (path.clone(), RemoteValue::from(checksum_bytes(bytes))))
                    .collect(),
            )),
            methods::ADD_RESOURCE if self.extension_installed => {
                let path = arg(args, 0)?.as_str().unwrap_or_default().to_string();
                let bytes = match arg(args, 1)? {
                    RemoteValue::Base64(bytes) => bytes.clone(),
                    other => return Err(RemoteError::fault(400, format!("expected base64, got {other}"))),
                };
                self.resources.insert(path, bytes);
                Ok(RemoteValue::Bool(true))
            }
            methods::DELETE_RESOURCE if self.extension_installed => {
                let path = arg(args, 0)?.as_str().unwrap_or_default();
                self.resources.remove(path);
                Ok(RemoteValue::Bool(true))
            }
            other => Err(RemoteError::fault(
                METHOD_NOT_FOUND,
                format!("server error. requested method {other} does not exist."),
            )),
        }
    }
}

/// Captures client messages for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    pub infos: Rc<RefCell<Vec<String>>>,
    pub errors: Rc<RefCell<Vec<String>>>,
}

impl Logger for RecordingLogger {
    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create parent dir");
    fs::write(path, body).expect("write content file");
}

/// A small site: nested terms, nested pages, a tagged post and a stylesheet.
pub fn write_site(root: &Path) {
    write(
        root,
        "taxonomies.json",
        r#"{
  "category": [
    { "name": "News", "slug": "news", "children": [
      { "name": "Releases", "slug": "releases", "description": "Release notes" }
    ] }
  ]
}"#,
    );
    write(
        root,
        "posts/page/about.html",
        r#"<script>{"title":"About","menuOrder":1}</script>
<p>About us</p>"#,
    );
    write(
        root,
        "posts/page/about/team.html",
        r#"<script>{"title":"Team"}</script>
<p>The team</p>"#,
    );
    write(
        root,
        "posts/post/hello.html",
        r#"<script>{"title":"Hello","termSlugs":{"category":["news","releases"]},"customFields":[{"key":"subtitle","value":"First post"}]}</script>
<p>Hello world</p>"#,
    );
    write(root, "resources/css/site.css", "body { color: gold; }");
}
