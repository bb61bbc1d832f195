//! Test utilities for fixturekit crates
//!
//! Shared infrastructure for building throwaway project trees on disk and
//! for temporarily overriding environment variables, so discovery can be
//! exercised without touching the real repository layout.
//!
//! # Core Concepts
//!
//! ## FixtureProject
//!
//! A temporary directory laid out like a real project:
//! - a project root marker (`Cargo.toml` by default)
//! - a `Fixtures` directory
//! - helpers to add fixtures and nested test-file paths
//!
//! ## EnvGuard
//!
//! RAII guard that sets environment variables and restores the previous
//! values on drop. Tests using it should also be marked `#[serial]`.
//!
//! ## CurrentDirGuard
//!
//! RAII guard that changes the working directory and restores it on drop,
//! for exercising relative starting paths.
//!
//! ## Usage
//!
//! ```no_run
//! use fixturekit_test_utils::FixtureProject;
//!
//! let project = FixtureProject::new().unwrap();
//! project.add_fixture("sample.json", r#"{"a":1}"#).unwrap();
//! let test_file = project.test_file("tests/api/users.rs").unwrap();
//! // Hand `test_file` to a resolver as its starting path
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project tree removed on drop.
pub struct FixtureProject {
    temp_dir: TempDir,
    fixtures_dir_name: Option<String>,
}

impl FixtureProject {
    /// A project with a `Cargo.toml` marker and an empty `Fixtures` directory.
    pub fn new() -> io::Result<Self> {
        Self::builder().build()
    }

    /// Start configuring a project.
    pub fn builder() -> FixtureProjectBuilder {
        FixtureProjectBuilder::default()
    }

    /// Root directory of the project.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the fixtures directory.
    ///
    /// # Panics
    ///
    /// When the project was built without a fixtures directory.
    pub fn fixtures_dir(&self) -> PathBuf {
        let name = self
            .fixtures_dir_name
            .as_deref()
            .expect("project was built without a fixtures directory");
        self.root().join(name)
    }

    /// Write a fixture file and return its path.
    pub fn add_fixture(&self, file_name: &str, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.fixtures_dir().join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Create a directory relative to the project root.
    pub fn add_dir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.root().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write an empty file relative to the project root.
    pub fn add_file(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        Ok(path)
    }

    /// Create a test source file at `relative` and return its path.
    ///
    /// Discovery is normally started from such a path.
    pub fn test_file(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "#[test]\nfn placeholder() {}\n")?;
        Ok(path)
    }
}

/// Builder for [`FixtureProject`].
#[derive(Debug, Clone)]
pub struct FixtureProjectBuilder {
    marker: Option<String>,
    marker_is_dir: bool,
    fixtures_dir_name: Option<String>,
}

impl Default for FixtureProjectBuilder {
    fn default() -> Self {
        Self {
            marker: Some("Cargo.toml".to_string()),
            marker_is_dir: false,
            fixtures_dir_name: Some("Fixtures".to_string()),
        }
    }
}

impl FixtureProjectBuilder {
    /// Use a package manifest file as the project marker.
    pub fn manifest(mut self, file_name: &str) -> Self {
        self.marker = Some(file_name.to_string());
        self.marker_is_dir = false;
        self
    }

    /// Use an IDE project directory (e.g. `App.xcodeproj`) as the marker.
    pub fn ide_project(mut self, dir_name: &str) -> Self {
        self.marker = Some(dir_name.to_string());
        self.marker_is_dir = true;
        self
    }

    /// Create no project marker at all.
    pub fn without_marker(mut self) -> Self {
        self.marker = None;
        self
    }

    /// Name the fixtures directory differently (e.g. `fixtures`).
    pub fn fixtures_dir_name(mut self, name: &str) -> Self {
        self.fixtures_dir_name = Some(name.to_string());
        self
    }

    /// Create no fixtures directory.
    pub fn without_fixtures_dir(mut self) -> Self {
        self.fixtures_dir_name = None;
        self
    }

    /// Create the project on disk.
    pub fn build(self) -> io::Result<FixtureProject> {
        let temp_dir = create_temp_dir_with_retry()?;

        if let Some(marker) = &self.marker {
            let marker_path = temp_dir.path().join(marker);
            if self.marker_is_dir {
                fs::create_dir_all(&marker_path)?;
            } else {
                fs::write(&marker_path, "")?;
            }
        }
        if let Some(name) = &self.fixtures_dir_name {
            fs::create_dir_all(temp_dir.path().join(name))?;
        }

        Ok(FixtureProject {
            temp_dir,
            fixtures_dir_name: self.fixtures_dir_name,
        })
    }
}

/// RAII guard for environment variable overrides
///
/// Remembers the original value of every variable it touches and restores
/// it on drop.
#[derive(Debug, Default)]
pub struct EnvGuard {
    original_env_vars: HashMap<String, Option<String>>,
}

impl EnvGuard {
    /// Create a guard that has not changed anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable and remember its original value
    pub fn set(&mut self, key: &str, value: impl AsRef<str>) {
        self.remember(key);
        std::env::set_var(key, value.as_ref());
    }

    /// Remove an environment variable and remember its original value
    pub fn remove(&mut self, key: &str) {
        self.remember(key);
        std::env::remove_var(key);
    }

    fn remember(&mut self, key: &str) {
        self.original_env_vars
            .entry(key.to_string())
            .or_insert_with(|| std::env::var(key).ok());
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original_value) in &self.original_env_vars {
            match original_value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// RAII guard that changes the process working directory
///
/// The previous working directory is restored on drop. Tests using it
/// should also be marked `#[serial]`.
#[derive(Debug)]
pub struct CurrentDirGuard {
    original: PathBuf,
}

impl CurrentDirGuard {
    /// Switch to `dir`, remembering the current working directory
    pub fn change_to(dir: impl AsRef<Path>) -> io::Result<Self> {
        let original = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self { original })
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Create a temporary directory with retry logic for parallel test execution
///
/// Makes up to 3 attempts with a short, growing delay between them to ride
/// out filesystem contention when many tests start at once.
pub fn create_temp_dir_with_retry() -> io::Result<TempDir> {
    let mut attempt = 1;
    loop {
        match TempDir::new() {
            Ok(dir) => return Ok(dir),
            Err(_) if attempt < 3 => {
                std::thread::sleep(std::time::Duration::from_millis(10 * attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_project_layout() {
        let project = FixtureProject::new().unwrap();
        assert!(project.root().join("Cargo.toml").is_file());
        assert!(project.fixtures_dir().is_dir());
        assert_eq!(project.fixtures_dir(), project.root().join("Fixtures"));
    }

    #[test]
    fn test_add_fixture_and_test_file() {
        let project = FixtureProject::new().unwrap();
        let fixture = project.add_fixture("sample.json", r#"{"a":1}"#).unwrap();
        assert_eq!(fs::read(&fixture).unwrap(), br#"{"a":1}"#);

        let test_file = project.test_file("tests/a/b/c.rs").unwrap();
        assert!(test_file.is_file());
        assert!(test_file.starts_with(project.root()));
    }

    #[test]
    fn test_builder_variants() {
        let project = FixtureProject::builder()
            .ide_project("Demo.xcodeproj")
            .fixtures_dir_name("fixtures")
            .build()
            .unwrap();
        assert!(project.root().join("Demo.xcodeproj").is_dir());
        assert!(project.root().join("fixtures").is_dir());

        let bare = FixtureProject::builder()
            .without_marker()
            .without_fixtures_dir()
            .build()
            .unwrap();
        assert_eq!(fs::read_dir(bare.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_env_guard_restores() {
        let key = "FIXTUREKIT_TEST_UTILS_GUARD_VAR";
        std::env::remove_var(key);
        {
            let mut guard = EnvGuard::new();
            guard.set(key, "value");
            assert_eq!(std::env::var(key).unwrap(), "value");
            guard.set(key, "second");
            assert_eq!(std::env::var(key).unwrap(), "second");
        }
        assert!(std::env::var(key).is_err());
    }

    #[test]
    fn test_temp_dir_creation_with_retry() {
        let temp_dir = create_temp_dir_with_retry().unwrap();
        assert!(temp_dir.path().exists());
    }
}
