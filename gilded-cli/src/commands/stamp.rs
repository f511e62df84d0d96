//! `gilded stamp <plugin.php>`: keep the plugin's version constant in step
//! with the client.

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use regex::Regex;

use gilded_sync::CLIENT_VERSION;

/// Arguments for `gilded stamp`.
#[derive(Args, Debug)]
pub struct StampArgs {
    /// PHP file defining `GW_VERSION`.
    pub file: PathBuf,

    /// Version to write.
    #[arg(long, default_value = CLIENT_VERSION)]
    pub version: String,
}

fn version_constant() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(define\(\s*['"]GW_VERSION['"]\s*,\s*['"])([^'"]*)(['"])"#)
            .expect("GW_VERSION pattern compiles")
    })
}

/// Replace the `GW_VERSION` value in `source`, or `None` if it is not defined.
pub fn stamp_source(source: &str, version: &str) -> Option<String> {
    let pattern = version_constant();
    if !pattern.is_match(source) {
        return None;
    }
    Some(
        pattern
            .replace(source, |caps: &regex::Captures<'_>| {
                format!("{}{version}{}", &caps[1], &caps[3])
            })
            .into_owned(),
    )
}

impl StampArgs {
    pub fn run(self) -> Result<()> {
        let source = std::fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read '{}'", self.file.display()))?;
        let Some(stamped) = stamp_source(&source, &self.version) else {
            bail!("no GW_VERSION constant in '{}'", self.file.display());
        };

        if stamped == source {
            println!(
                "{} '{}' already at version {}",
                "·".bright_black(),
                self.file.display(),
                self.version
            );
            return Ok(());
        }

        std::fs::write(&self.file, stamped)
            .with_context(|| format!("failed to write '{}'", self.file.display()))?;
        println!(
            "{} Stamped '{}' with version {}",
            "✓".green().bold(),
            self.file.display(),
            self.version
        );
        Ok(())
    }
}
