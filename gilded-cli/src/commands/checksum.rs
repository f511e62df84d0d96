//! `gilded checksum <file>`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use gilded_core::ContentValue;

/// Arguments for `gilded checksum`.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// JSON or YAML file holding the value (`.yaml`/`.yml` parse as YAML).
    pub file: PathBuf,

    /// Print the flattened string that gets hashed instead of the digest.
    #[arg(long)]
    pub flat: bool,
}

impl ChecksumArgs {
    pub fn run(self) -> Result<()> {
        let value = read_value(&self.file)?;
        if self.flat {
            println!("{}", gilded_sync::flatten(&value));
        } else {
            println!("{}", gilded_sync::checksum(&value));
        }
        Ok(())
    }
}

fn read_value(file: &Path) -> Result<ContentValue> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read '{}'", file.display()))?;
    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );

    log::debug!(
        "reading {} as {}",
        file.display(),
        if is_yaml { "YAML" } else { "JSON" }
    );

    if is_yaml {
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)
            .with_context(|| format!("invalid YAML in '{}'", file.display()))?;
        Ok(value.into())
    } else {
        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("invalid JSON in '{}'", file.display()))?;
        Ok(value.into())
    }
}
