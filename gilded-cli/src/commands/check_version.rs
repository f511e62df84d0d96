//! `gilded check-version <remote>`

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use gilded_sync::{validate_version, CLIENT_VERSION};

/// Arguments for `gilded check-version`.
#[derive(Args, Debug)]
pub struct CheckVersionArgs {
    /// Version reported by the server's Gilded WordPress extension.
    pub remote: String,

    /// Client version to check against.
    #[arg(long, default_value = CLIENT_VERSION)]
    pub local: String,
}

impl CheckVersionArgs {
    pub fn run(self) -> Result<()> {
        validate_version(&self.local, &self.remote)?;
        println!(
            "{} server {} can serve client {}",
            "✓".green().bold(),
            self.remote,
            self.local
        );
        Ok(())
    }
}
