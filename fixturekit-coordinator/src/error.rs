//! Error types for coordinated fixture access.

use fixturekit_directory::FixtureError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using AccessError.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors raised by the access coordinator itself.
///
/// Errors returned by the caller's operation are never wrapped; they reach
/// the caller unchanged.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Resolving the fixture's path failed.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// The fixture stayed locked longer than the configured acquire timeout.
    #[error("timed out after {waited:?} waiting for exclusive access to fixture '{name}'")]
    AcquireTimeout { name: String, waited: Duration },

    /// The background lookup task panicked or was cancelled.
    #[error("lookup task for fixture '{name}' failed: {message}")]
    LookupTask { name: String, message: String },
}

impl AccessError {
    /// The underlying fixture error, if this is one.
    pub fn as_fixture_error(&self) -> Option<&FixtureError> {
        match self {
            Self::Fixture(e) => Some(e),
            Self::AcquireTimeout { .. } | Self::LookupTask { .. } => None,
        }
    }
}
