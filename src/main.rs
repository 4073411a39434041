//! CLI entry point for the cagscan tool.

use std::sync::Arc;

use anyhow::Result;
use cagscan_core::{Database, DocumentStore, Fetcher, HttpClient, Processor};
use clap::Parser;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Cagscan starting");

    // The download cache must exist before the first fetch
    std::fs::create_dir_all(&args.downloads)?;

    // A failure to open the database (or, below, to list the reference
    // set) is the only thing allowed to abort the whole batch.
    let db = Database::new(&args.db).await?;
    let store = Arc::new(DocumentStore::new(db));
    let fetcher = Arc::new(Fetcher::new(HttpClient::new(), args.downloads.clone()));

    let processor = Processor::new(store, fetcher);
    let stats = processor.process_all().await?;

    info!(
        processed = stats.processed(),
        skipped = stats.skipped(),
        failed = stats.failed(),
        total = stats.total(),
        "Minutes processing complete"
    );

    Ok(())
}
