//! CLI definition for the fixturekit command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fixturekit - find and inspect test fixtures
///
/// Locates the project's Fixtures directory from a starting path and
/// resolves, lists, and searches the files in it.
#[derive(Parser, Debug)]
#[command(name = "fixturekit")]
#[command(version)]
#[command(about = "Locate, list, and search test fixtures")]
pub struct Cli {
    /// Path to start discovery from (a test file or directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub from: Option<PathBuf>,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Additional configuration file, applied after discovered ones
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved Fixtures directory
    Locate,
    /// Print the path of one fixture
    Get {
        /// Fixture name; the full filename when --ext is omitted
        name: String,
        /// Extension, with or without a leading dot
        #[arg(short, long)]
        ext: Option<String>,
    },
    /// List fixtures
    List {
        /// Only fixtures with this extension (case-insensitive)
        #[arg(short, long)]
        ext: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find fixtures whose name (without extension) contains a pattern (case-insensitive)
    Find {
        /// Substring to search for
        pattern: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the distinct fixture extensions
    Extensions,
}
