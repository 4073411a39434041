//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Extract CAG reference locations from committee meeting minutes.
///
/// Cagscan reads the list of minutes documents discovered by the
/// upstream crawler, downloads each PDF once into a local cache, scans
/// every page for CAG reference identifiers, and records compact page
/// ranges per identifier in the shared database.
#[derive(Parser, Debug)]
#[command(name = "cagscan")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the SQLite database shared with the minutes crawler
    #[arg(short = 'd', long, default_value = "minutes.db")]
    pub db: PathBuf,

    /// Directory for downloaded documents (created if missing)
    #[arg(short = 'o', long, default_value = "downloads")]
    pub downloads: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
