//! treesync — mirror a source directory tree onto a destination.
//!
//! # Usage
//!
//! ```text
//! treesync <source-dir> <destination-dir>
//! treesync <source-dir> <destination-dir> --watch
//! treesync <source-dir> <destination-dir> --bidirectional
//! treesync <source-dir> <destination-dir> --json
//! ```
//!
//! One line is printed to stdout per mutating action, `[<code>] <path>`,
//! with codes `+` created, `-` deleted, `o` content updated, `t` timestamp
//! changed, `p` permission changed. Fatal errors go to stderr with a
//! nonzero exit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use treesync_core::types::{Direction, SyncConfig};
use treesync_engine::{pipeline, ConsoleReporter, SyncSummary};

#[derive(Parser, Debug)]
#[command(
    name = "treesync",
    version,
    about = "Mirror a source directory tree onto a destination directory",
    long_about = None,
)]
struct Cli {
    /// Source directory (authoritative in one-way mode).
    source: PathBuf,

    /// Destination directory to align with the source.
    dest: PathBuf,

    /// Keep running, re-syncing on a fixed interval until interrupted.
    #[arg(long)]
    watch: bool,

    /// Resolve file differences by newest modification time instead of
    /// source-wins. Concurrent edits on the older side are lost.
    #[arg(long)]
    bidirectional: bool,

    /// Print the run summary as JSON after the report lines.
    #[arg(long, conflicts_with = "watch")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SyncConfig {
        source: cli.source,
        dest: cli.dest,
        direction: if cli.bidirectional {
            Direction::Bidirectional
        } else {
            Direction::OneWay
        },
        interval: cli.watch.then_some(treesync_daemon::SYNC_INTERVAL),
    };

    if cli.watch {
        return treesync_daemon::start_blocking(&config).context("watch mode failed");
    }

    let mut reporter = ConsoleReporter::default();
    let summary = pipeline::run(&config, &mut reporter).with_context(|| {
        format!(
            "sync failed for {} -> {}",
            config.source.display(),
            config.dest.display()
        )
    })?;

    print_summary(&summary, cli.json)
}

fn print_summary(summary: &SyncSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    if summary.total_changes() == 0 {
        println!("{} nothing to do", "✓".green());
        return Ok(());
    }

    println!(
        "{} synced ({} created, {} updated, {} deleted, {} timestamps, {} permissions) in {}ms",
        "✓".green(),
        summary.created,
        summary.updated,
        summary.deleted,
        summary.timestamps,
        summary.permissions,
        summary.duration_ms,
    );
    Ok(())
}
