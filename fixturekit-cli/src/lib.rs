//! fixturekit command-line interface.
//!
//! The binary wires [`cli::Cli`] to [`commands::run`]; both live in the
//! library so they can be tested without spawning a process.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
