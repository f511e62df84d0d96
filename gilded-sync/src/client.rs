//! The sync client: configuration, remote handle, logger and per-run state.
//!
//! `validate` and `sync` are fixed three-step waterfalls. The individual steps
//! live next to the content they handle (`version`, `terms`, `posts`,
//! `resources`) as further `impl Client` blocks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gilded_core::{config, ClientOptions, PostPath, Taxonomy, TermSlug};

use crate::binder::BoundMethod;
use crate::error::SyncError;
use crate::logger::{LogLogger, Logger};
use crate::pipeline::{self, step};
use crate::remote::RemoteApi;

/// Ids learned while syncing, consumed by later steps of the same run.
#[derive(Debug, Default)]
pub(crate) struct SyncState {
    pub(crate) term_ids: BTreeMap<Taxonomy, BTreeMap<TermSlug, i64>>,
    pub(crate) post_ids: BTreeMap<PostPath, i64>,
}

/// Pushes a content directory into WordPress through a [`RemoteApi`].
pub struct Client<R> {
    options: ClientOptions,
    pub(crate) remote: R,
    logger: Box<dyn Logger>,
    pub(crate) state: SyncState,
}

/// Create a client that logs through the `log` facade.
pub fn create_client<R: RemoteApi>(options: ClientOptions, remote: R) -> Client<R> {
    Client::new(options, remote)
}

impl<R: RemoteApi> Client<R> {
    pub fn new(options: ClientOptions, remote: R) -> Self {
        Self::with_logger(options, remote, Box::new(LogLogger))
    }

    pub fn with_logger(options: ClientOptions, remote: R, logger: Box<dyn Logger>) -> Self {
        Self {
            options,
            remote,
            logger,
            state: SyncState::default(),
        }
    }

    /// Build a client from a YAML config file such as `gilded.yaml`.
    pub fn from_config_file(path: &Path, remote: R) -> Result<Self, SyncError> {
        let options = config::load_at(path)?;
        tracing::debug!("loaded {} (content root {})", path.display(), options.dir.display());
        Ok(Self::new(options, remote))
    }

    /// Check the server version, then the local terms and posts.
    pub fn validate(&mut self) -> Result<(), SyncError> {
        pipeline::waterfall(
            self,
            vec![
                step(|client: &mut Self, _| client.check_version()),
                step(|client: &mut Self, _| client.validate_terms()),
                step(|client: &mut Self, _| client.validate_posts()),
            ],
        )?;
        Ok(())
    }

    /// Push terms, then posts, then resources.
    pub fn sync(&mut self) -> Result<(), SyncError> {
        let result = pipeline::waterfall(
            self,
            vec![
                step(|client: &mut Self, _| client.sync_terms()),
                step(|client: &mut Self, _| client.sync_posts()),
                step(|client: &mut Self, _| client.sync_resources()),
            ],
        );
        if let Err(err) = result {
            if err.is_connection_refused() {
                self.log_error("Could not connect to WordPress XML-RPC server.");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Bind a remote method so its completion runs with this client as context.
    pub fn method<'c>(&'c mut self, name: &'c str) -> BoundMethod<'c, R> {
        BoundMethod::new(self, name)
    }
}

impl<R> Client<R> {
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose
    }

    /// `partial` joined onto the content root.
    pub fn path(&self, partial: impl AsRef<Path>) -> PathBuf {
        self.options.dir.join(partial)
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn into_remote(self) -> R {
        self.remote
    }

    /// Remote id of the term synced for `slug`, if any.
    pub fn term_id(&self, taxonomy: &Taxonomy, slug: &TermSlug) -> Option<i64> {
        self.state.term_ids.get(taxonomy)?.get(slug).copied()
    }

    /// Remote id of the post synced for `path`, if any.
    pub fn post_id(&self, path: &PostPath) -> Option<i64> {
        self.state.post_ids.get(path).copied()
    }

    pub fn log(&self, message: &str) {
        self.logger.info(message);
    }

    pub fn log_error(&self, message: &str) {
        self.logger.error(message);
    }

    /// Log only when the client was configured as verbose.
    pub(crate) fn verbose_log(&self, message: &str) {
        if self.verbose() {
            self.log(message);
        }
    }
}
