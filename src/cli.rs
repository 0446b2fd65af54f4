//! # Command line interface
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "splitpairs",
    author,
    version,
    about = "Discover candidate RNA splice junctions from split-read half-alignments",
    long_about = None
)]
pub struct Cli {
    /// Options file to load. If omitted, runs with the built-in default
    /// configuration (useful for a quick smoke test).
    pub options_file: Option<PathBuf>,
}
