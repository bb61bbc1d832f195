//! The lookup seam between the coordinator and fixture discovery.

use fixturekit_directory::{DirectoryResolver, FixtureError};
use std::path::PathBuf;
use std::sync::Arc;

/// Resolves fixture identifiers to paths.
///
/// [`DirectoryResolver`] is the production implementation. The trait lets
/// tests observe or replace the lookups the coordinator performs.
pub trait FixtureLocator: Send + Sync {
    /// Path of the fixture with the full filename `fixture_id`.
    fn locate(&self, fixture_id: &str) -> Result<PathBuf, FixtureError>;

    /// Identifiers of every fixture that can be located.
    fn fixture_ids(&self) -> Result<Vec<String>, FixtureError>;
}

impl FixtureLocator for DirectoryResolver {
    fn locate(&self, fixture_id: &str) -> Result<PathBuf, FixtureError> {
        self.fixture_file(fixture_id)
    }

    fn fixture_ids(&self) -> Result<Vec<String>, FixtureError> {
        Ok(self
            .list_fixtures()?
            .into_iter()
            .map(|f| f.id().to_string())
            .collect())
    }
}

impl<L: FixtureLocator + ?Sized> FixtureLocator for Arc<L> {
    fn locate(&self, fixture_id: &str) -> Result<PathBuf, FixtureError> {
        (**self).locate(fixture_id)
    }

    fn fixture_ids(&self) -> Result<Vec<String>, FixtureError> {
        (**self).fixture_ids()
    }
}
