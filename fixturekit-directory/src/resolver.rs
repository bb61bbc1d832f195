//! Fixture lookup, listing, and search over a discovered fixtures directory.

use crate::discovery::{resolve_fixtures_directory, ResolvedDirectory};
use crate::environment::{Environment, ProcessEnvironment};
use crate::error::{FixtureError, Result};
use crate::fixture::{file_name_for, normalize_extension, Fixture};
use fixturekit_config::DiscoveryOptions;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Resolves fixtures relative to an explicit starting path.
///
/// Every operation runs discovery again, so files and directories created
/// after construction are picked up. Callers that want memoization go
/// through the access coordinator.
///
/// # Examples
///
/// ```no_run
/// use fixturekit_directory::DirectoryResolver;
///
/// let resolver = DirectoryResolver::new(file!());
/// let path = resolver.fixture("sample", "json")?;
/// let json_fixtures = resolver.list_fixtures_with_extension(".json")?;
/// # Ok::<(), fixturekit_directory::FixtureError>(())
/// ```
#[derive(Clone)]
pub struct DirectoryResolver {
    start: PathBuf,
    options: DiscoveryOptions,
    environment: Arc<dyn Environment>,
}

impl fmt::Debug for DirectoryResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryResolver")
            .field("start", &self.start)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DirectoryResolver {
    /// Create a resolver that starts discovery at `start`.
    ///
    /// `start` is normally the calling test's own source path or directory.
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            start: start.into(),
            options: DiscoveryOptions::default(),
            environment: Arc::new(ProcessEnvironment),
        }
    }

    /// Replace the discovery options.
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the environment consulted for CI root variables.
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    /// The path discovery starts from.
    pub fn start(&self) -> &Path {
        &self.start
    }

    /// The discovery options in use.
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Run discovery, reporting which strategy found the directory.
    pub fn resolve(&self) -> Result<ResolvedDirectory> {
        resolve_fixtures_directory(&self.start, &self.options, self.environment.as_ref())
    }

    /// Path of the fixtures directory.
    pub fn fixtures_directory(&self) -> Result<PathBuf> {
        self.resolve().map(|resolved| resolved.path)
    }

    /// Path of the fixture `name` with `extension`.
    ///
    /// The extension may be given with or without a leading dot; an empty
    /// extension refers to a file named exactly `name`.
    ///
    /// # Errors
    ///
    /// `FixturesDirectoryNotFound` when discovery fails, `FixtureNotFound`
    /// when the file does not exist.
    pub fn fixture(&self, name: &str, extension: &str) -> Result<PathBuf> {
        self.fixture_file(&file_name_for(name, extension))
    }

    /// Path of the fixture with the full filename `file_name`.
    ///
    /// Subdirectories and symbolic links resolve too; only existence is
    /// checked.
    pub fn fixture_file(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.fixtures_directory()?.join(file_name);
        // symlink_metadata so a dangling link still counts as present
        if fs::symlink_metadata(&path).is_ok() {
            trace!("Resolved fixture {}", path.display());
            Ok(path)
        } else {
            debug!("Fixture missing: {}", path.display());
            Err(FixtureError::fixture_not_found(path))
        }
    }

    /// True when the fixture exists; discovery failures are still errors.
    pub fn fixture_exists(&self, name: &str, extension: &str) -> Result<bool> {
        let path = self
            .fixtures_directory()?
            .join(file_name_for(name, extension));
        Ok(fs::symlink_metadata(path).is_ok())
    }

    /// All regular files in the fixtures directory, sorted by name.
    ///
    /// Subdirectories, symbolic links, and files whose names are not valid
    /// UTF-8 are excluded. Ties on name (same stem, different extension) are
    /// ordered by id.
    pub fn list_fixtures(&self) -> Result<Vec<Fixture>> {
        let dir = self.fixtures_directory()?;
        let entries = fs::read_dir(&dir).map_err(|e| FixtureError::io(&dir, e))?;

        let mut fixtures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FixtureError::io(&dir, e))?;
            // DirEntry::file_type does not follow symlinks
            let file_type = entry.file_type().map_err(|e| FixtureError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(fixture) = Fixture::from_path(entry.path()) {
                fixtures.push(fixture);
            }
        }

        fixtures.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        debug!("Listed {} fixtures in {}", fixtures.len(), dir.display());
        Ok(fixtures)
    }

    /// Fixtures whose extension matches, ignoring case and a leading dot.
    pub fn list_fixtures_with_extension(&self, extension: &str) -> Result<Vec<Fixture>> {
        let extension = normalize_extension(extension);
        Ok(self
            .list_fixtures()?
            .into_iter()
            .filter(|f| f.has_extension(extension))
            .collect())
    }

    /// Fixtures whose name contains `pattern`, ignoring case.
    ///
    /// An empty pattern matches every fixture.
    pub fn find_fixtures(&self, pattern: &str) -> Result<Vec<Fixture>> {
        let pattern = pattern.to_lowercase();
        Ok(self
            .list_fixtures()?
            .into_iter()
            .filter(|f| f.name().to_lowercase().contains(&pattern))
            .collect())
    }

    /// Distinct lowercased extensions present, sorted.
    pub fn available_extensions(&self) -> Result<Vec<String>> {
        let extensions: BTreeSet<String> = self
            .list_fixtures()?
            .iter()
            .map(|f| f.file_extension().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Ok(extensions.into_iter().collect())
    }
}
