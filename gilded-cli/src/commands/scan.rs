//! `gilded scan`: list posts and resources with their checksums.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use gilded_sync::{ScanEntry, ScanKind};

use crate::SiteArgs;

/// Arguments for `gilded scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ScanTableRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "path")]
    key: String,
    #[tabled(rename = "checksum")]
    checksum: String,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        let options = self.site.options()?;
        let entries = gilded_sync::scan(&options.dir)
            .with_context(|| format!("scan failed for '{}'", options.dir.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).context("failed to serialize scan JSON")?
            );
            return Ok(());
        }

        if entries.is_empty() {
            println!("No posts or resources under '{}'.", options.dir.display());
            return Ok(());
        }
        print_table(entries);
        Ok(())
    }
}

fn print_table(entries: Vec<ScanEntry>) {
    let posts = entries.iter().filter(|e| e.kind == ScanKind::Post).count();
    println!(
        "{} posts | {} resources",
        posts,
        entries.len() - posts
    );

    let rows: Vec<ScanTableRow> = entries
        .into_iter()
        .map(|entry| ScanTableRow {
            kind: kind_label(entry.kind),
            key: entry.key,
            checksum: entry.checksum.bright_black().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn kind_label(kind: ScanKind) -> String {
    match kind {
        ScanKind::Post => kind.to_string().cyan().to_string(),
        ScanKind::Resource => kind.to_string().magenta().to_string(),
    }
}
