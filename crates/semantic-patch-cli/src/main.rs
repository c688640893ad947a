//! Semantic patch CLI - last fallback tier of the V8 patch pipeline.
//!
//! Runs after `git apply` and fuzzy application have both failed. Exits 0 if
//! at least one rule succeeded, 1 otherwise.

use anyhow::{Context, Result};
use clap::Parser;
use semantic_patch_core::{PatcherOptions, SemanticPatcher, SourceRoot, TeeLogSink};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "semantic-patch")]
#[command(about = "Apply structural V8 source patches without relying on line numbers")]
struct Args {
    /// Absolute path to the V8 source tree
    source_root: PathBuf,

    /// Absolute path to the log file (appended to, created if absent)
    log_file: PathBuf,

    /// Keep a .bak copy of each file before rewriting it
    #[arg(long)]
    backup: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging; stdout carries the status lines
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let root = SourceRoot::new(&args.source_root)
        .with_context(|| format!("V8 directory does not exist: {}", args.source_root.display()))?;
    let mut sink = TeeLogSink::open(&args.log_file)
        .with_context(|| format!("Cannot open log file: {}", args.log_file.display()))?;

    debug!("Source root: {}", root.path().display());
    debug!("Log file: {}", sink.path().display());

    let options = PatcherOptions {
        keep_backup: args.backup,
    };
    let result = SemanticPatcher::new(options).apply_all(&root, &mut sink);

    Ok(result.is_success())
}
