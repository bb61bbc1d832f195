//! Fixtures-directory discovery and fixture lookup.
//!
//! Given the path of a test source file (or any path inside a project), this
//! crate locates the project's `Fixtures` directory and resolves, lists, and
//! searches the files in it.
//!
//! # Overview
//!
//! - [`DirectoryResolver`] - Entry point: lookup, listing, search
//! - [`Fixture`] - One listed fixture file (`id`, `name`, `file_extension`, `location`)
//! - [`resolve_fixtures_directory`] - The discovery algorithm on its own
//! - [`Environment`] - Source of CI checkout variables, injectable for tests
//!
//! # Discovery
//!
//! 1. If a CI checkout variable (e.g. `GITHUB_WORKSPACE`) names a directory,
//!    its `Fixtures` child or a recursive search below it is used.
//! 2. Otherwise the directory tree is walked upward from the starting path,
//!    up to ten levels, until a project root is found: a directory holding a
//!    package manifest (`Cargo.toml`, `Package.swift`) or an IDE project
//!    (`*.xcodeproj`, `*.xcworkspace`). Its `Fixtures` child is the answer.
//! 3. A project root without a `Fixtures` child is searched recursively,
//!    skipping hidden entries and build or dependency directories.
//!
//! Directory names are compared case-insensitively.
//!
//! # Example
//!
//! ```no_run
//! use fixturekit_directory::DirectoryResolver;
//!
//! let resolver = DirectoryResolver::new(file!());
//! for fixture in resolver.find_fixtures("user")? {
//!     println!("{} -> {}", fixture.id(), fixture.location().display());
//! }
//! # Ok::<(), fixturekit_directory::FixtureError>(())
//! ```

mod discovery;
mod environment;
mod error;
mod fixture;
mod resolver;

pub use discovery::{
    find_fixtures_dir_recursive, is_project_root, resolve_fixtures_directory, ResolvedDirectory,
};
pub use environment::{Environment, MapEnvironment, ProcessEnvironment};
pub use error::{DiscoveryStrategy, FixtureError, Result};
pub use fixture::Fixture;
pub use fixturekit_config::DiscoveryOptions;
pub use resolver::DirectoryResolver;
