//! Strongly typed configuration values

use crate::defaults::{
    owned, CI_ROOT_VARIABLES, DEFAULT_FIXTURES_DIR_NAME, DEFAULT_MAX_ASCENT_DEPTH,
    DEFAULT_MAX_SEARCH_DEPTH, IDE_PROJECT_SUFFIXES, PACKAGE_MANIFESTS, SKIP_DIRECTORIES,
};
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete fixturekit configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixturekitConfig {
    /// How the fixtures directory is located
    pub discovery: DiscoveryOptions,
    /// How concurrent fixture access is coordinated
    pub access: AccessOptions,
}

impl FixturekitConfig {
    /// Check every section for values the rest of the system cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        self.discovery.validate()?;
        self.access.validate()
    }
}

/// Settings for locating the fixtures directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    /// Directory name matched case-insensitively (e.g. `Fixtures`)
    pub fixtures_dir_name: String,

    /// Number of levels examined when ascending from the starting directory
    pub max_ascent_depth: usize,

    /// Depth limit of the recursive fallback search
    pub max_search_depth: usize,

    /// Filenames whose presence marks a project root (exact match)
    pub package_manifests: Vec<String>,

    /// Entry-name suffixes whose presence marks a project root
    pub ide_project_suffixes: Vec<String>,

    /// Environment variables naming a CI checkout root, highest priority first
    pub ci_root_variables: Vec<String>,

    /// Directory names the recursive search never enters
    pub skip_directories: Vec<String>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            fixtures_dir_name: DEFAULT_FIXTURES_DIR_NAME.to_string(),
            max_ascent_depth: DEFAULT_MAX_ASCENT_DEPTH,
            max_search_depth: DEFAULT_MAX_SEARCH_DEPTH,
            package_manifests: owned(PACKAGE_MANIFESTS),
            ide_project_suffixes: owned(IDE_PROJECT_SUFFIXES),
            ci_root_variables: owned(CI_ROOT_VARIABLES),
            skip_directories: owned(SKIP_DIRECTORIES),
        }
    }
}

impl DiscoveryOptions {
    /// Returns true when `entry_name` identifies its parent as a project root.
    pub fn is_project_marker(&self, entry_name: &str) -> bool {
        self.package_manifests.iter().any(|m| m == entry_name)
            || self
                .ide_project_suffixes
                .iter()
                .any(|suffix| entry_name.len() > suffix.len() && entry_name.ends_with(suffix))
    }

    /// Returns true when the recursive search must not descend into `dir_name`.
    pub fn should_skip(&self, dir_name: &str) -> bool {
        dir_name.starts_with('.') || self.skip_directories.iter().any(|s| s == dir_name)
    }

    /// Returns true when `entry_name` is the fixtures directory name, ignoring case.
    pub fn is_fixtures_dir_name(&self, entry_name: &str) -> bool {
        entry_name.eq_ignore_ascii_case(&self.fixtures_dir_name)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.fixtures_dir_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "discovery.fixtures_dir_name",
                "must not be empty",
            ));
        }
        if self.max_ascent_depth == 0 {
            return Err(ConfigError::invalid_value(
                "discovery.max_ascent_depth",
                "must be at least 1",
            ));
        }
        if self.max_search_depth == 0 {
            return Err(ConfigError::invalid_value(
                "discovery.max_search_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Settings for the access coordinator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessOptions {
    /// Give up waiting for a locked fixture after this many milliseconds.
    /// `None` waits indefinitely.
    pub acquire_timeout_ms: Option<u64>,
}

impl AccessOptions {
    /// The acquisition timeout as a `Duration`
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }

    /// Options with the given acquisition timeout
    pub fn with_acquire_timeout(timeout: Duration) -> Self {
        Self {
            acquire_timeout_ms: Some(timeout.as_millis() as u64),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.acquire_timeout_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "access.acquire_timeout_ms",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}
