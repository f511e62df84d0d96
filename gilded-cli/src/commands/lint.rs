//! `gilded lint`: validate a content directory without a server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::SiteArgs;

/// Arguments for `gilded lint`.
#[derive(Args, Debug)]
pub struct LintArgs {
    #[command(flatten)]
    pub site: SiteArgs,
}

impl LintArgs {
    pub fn run(self) -> Result<()> {
        let options = self.site.options()?;
        let summary = gilded_sync::lint(&options.dir)
            .with_context(|| format!("lint failed for '{}'", options.dir.display()))?;

        println!(
            "{} '{}' is valid ({} taxonomies, {} terms, {} posts, {} resources)",
            "✓".green().bold(),
            options.dir.display(),
            summary.taxonomies,
            summary.terms,
            summary.posts,
            summary.resources,
        );
        Ok(())
    }
}
