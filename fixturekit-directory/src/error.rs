//! Error types for fixture discovery and lookup.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using FixtureError.
pub type Result<T> = std::result::Result<T, FixtureError>;

/// A step of the fixtures-directory discovery algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryStrategy {
    /// Root taken from a CI checkout variable.
    CiEnvironment,
    /// Upward walk from the starting directory to a marked project root.
    AncestorWalk,
    /// Recursive search below a project or CI root.
    RecursiveSearch,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CiEnvironment => write!(f, "CI environment"),
            Self::AncestorWalk => write!(f, "ancestor walk"),
            Self::RecursiveSearch => write!(f, "recursive search"),
        }
    }
}

/// Errors that can occur while locating fixtures.
///
/// Only `FixturesDirectoryNotFound`, `FixtureNotFound` and `Io` are produced by
/// the current operations. The write-side variants are reserved.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The fixtures directory could not be located from the starting path.
    #[error(
        "fixtures directory not found starting from '{}' (searched {max_depth} levels; tried {}){}",
        .start.display(),
        format_strategies(.attempted),
        format_examined_root(.examined_root)
    )]
    FixturesDirectoryNotFound {
        start: PathBuf,
        max_depth: usize,
        attempted: Vec<DiscoveryStrategy>,
        examined_root: Option<PathBuf>,
    },

    /// The fixtures directory exists but the requested file does not.
    #[error("fixture not found at '{path}'")]
    FixtureNotFound { path: PathBuf },

    /// Reading a directory that exists failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a temporary fixture.
    #[error("failed to create temporary fixture '{name}': {message}")]
    TemporaryFixture { name: String, message: String },
}

impl FixtureError {
    /// Create a FixtureNotFound error.
    pub fn fixture_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FixtureNotFound { path: path.into() }
    }

    /// Create an Io error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the fixtures directory itself could not be found.
    pub fn is_directory_not_found(&self) -> bool {
        matches!(self, Self::FixturesDirectoryNotFound { .. })
    }

    /// True when a single fixture file was missing.
    pub fn is_fixture_not_found(&self) -> bool {
        matches!(self, Self::FixtureNotFound { .. })
    }
}

fn format_strategies(attempted: &[DiscoveryStrategy]) -> String {
    if attempted.is_empty() {
        return "no strategies".to_string();
    }
    attempted
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_examined_root(root: &Option<PathBuf>) -> String {
    match root {
        Some(root) => format!("; project root '{}' has no fixtures directory", root.display()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_not_found_message() {
        let err = FixtureError::FixturesDirectoryNotFound {
            start: PathBuf::from("/work/app/tests/api.rs"),
            max_depth: 10,
            attempted: vec![DiscoveryStrategy::AncestorWalk],
            examined_root: None,
        };
        let message = err.to_string();
        assert!(message.contains("/work/app/tests/api.rs"));
        assert!(message.contains("10 levels"));
        assert!(message.contains("ancestor walk"));
        assert!(!message.contains("project root"));
        assert!(err.is_directory_not_found());
    }

    #[test]
    fn test_directory_not_found_names_examined_root() {
        let err = FixtureError::FixturesDirectoryNotFound {
            start: PathBuf::from("/work/app/tests"),
            max_depth: 10,
            attempted: vec![
                DiscoveryStrategy::AncestorWalk,
                DiscoveryStrategy::RecursiveSearch,
            ],
            examined_root: Some(PathBuf::from("/work/app")),
        };
        let message = err.to_string();
        assert!(message.contains("ancestor walk, recursive search"));
        assert!(message.contains("project root '/work/app'"));
    }

    #[test]
    fn test_fixture_not_found_message() {
        let err = FixtureError::fixture_not_found("/work/app/Fixtures/missing.json");
        assert_eq!(
            err.to_string(),
            "fixture not found at '/work/app/Fixtures/missing.json'"
        );
        assert!(err.is_fixture_not_found());
        assert!(!err.is_directory_not_found());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(DiscoveryStrategy::CiEnvironment.to_string(), "CI environment");
        assert_eq!(DiscoveryStrategy::RecursiveSearch.to_string(), "recursive search");
    }
}
