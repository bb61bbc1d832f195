//! fixturekit CLI - locate, list, and search test fixtures.
//!
//! Commands:
//! - `fixturekit locate`: Print the resolved Fixtures directory
//! - `fixturekit get <name> [--ext <ext>]`: Print one fixture's path
//! - `fixturekit list [--ext <ext>] [--json]`: List fixtures
//! - `fixturekit find <pattern> [--json]`: Search fixture filenames
//! - `fixturekit extensions`: List distinct extensions
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fixturekit::{commands, Cli};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("fixturekit=debug,fixturekit_directory=debug,fixturekit_config=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let result = commands::build_resolver(cli.from.as_deref(), cli.config.as_deref())
        .and_then(|resolver| commands::run(&resolver, &cli.command))
        .map(|output| print!("{output}"));
    std::process::exit(result_to_exit(result));
}

/// Report an error on stderr and convert the result to an exit code.
fn result_to_exit(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    }
}
