//! Gilded WordPress: offline tooling for a content directory.
//!
//! # Usage
//!
//! ```text
//! gilded lint  [--config gilded.yaml | --dir <content>]
//! gilded scan  [--config gilded.yaml | --dir <content>] [--json]
//! gilded checksum <file.json|file.yaml>
//! gilded check-version <remote-version> [--local <version>]
//! gilded stamp <plugin.php> [--version <version>]
//! ```
//!
//! Pass `-v` (or set `RUST_LOG`) for debug output.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    check_version::CheckVersionArgs, checksum::ChecksumArgs, lint::LintArgs, scan::ScanArgs,
    stamp::StampArgs,
};
use gilded_core::{config, ClientOptions};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gilded",
    version,
    about = "Inspect and prepare Gilded WordPress content directories",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check taxonomies and posts the way a sync would, without a server.
    Lint(LintArgs),

    /// List every post and resource with the checksum sync compares.
    Scan(ScanArgs),

    /// Print the content checksum of a JSON or YAML value.
    Checksum(ChecksumArgs),

    /// Check whether a server version can serve this client.
    CheckVersion(CheckVersionArgs),

    /// Write a version into the plugin's `GW_VERSION` constant.
    Stamp(StampArgs),
}

// ---------------------------------------------------------------------------
// Shared content-root argument
// ---------------------------------------------------------------------------

/// Where the content directory comes from: `--dir` wins, otherwise the
/// `dir` of the config file.
#[derive(clap::Args, Debug, Clone)]
pub struct SiteArgs {
    /// Client config file.
    #[arg(long, short = 'c', default_value = config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Content directory; overrides the config file.
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,
}

impl SiteArgs {
    pub fn options(&self) -> Result<ClientOptions> {
        let options = match &self.dir {
            Some(dir) => ClientOptions::new(dir.clone()),
            None => config::load_at(&self.config).with_context(|| {
                format!(
                    "no content directory: pass --dir or create {}",
                    self.config.display()
                )
            })?,
        };
        log::debug!("content directory: {}", options.dir.display());
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Lint(args) => args.run(),
        Commands::Scan(args) => args.run(),
        Commands::Checksum(args) => args.run(),
        Commands::CheckVersion(args) => args.run(),
        Commands::Stamp(args) => args.run(),
    }
}
