//! Coordinated access to test fixtures.
//!
//! [`AccessCoordinator`] gives concurrently running tests exclusive access to
//! a fixture file for the duration of an async operation, memoizes resolved
//! fixture paths, and counts how often each fixture is accessed.
//!
//! # Overview
//!
//! - [`AccessCoordinator`] - Per-fixture mutual exclusion, path cache, usage counts
//! - [`FixtureLocator`] - How identifiers become paths ([`DirectoryResolver`] by default)
//! - [`ResourceScope`] - Optional start/stop permission around scoped access
//! - [`format_usage_report`] - The fixed-width usage table
//!
//! Waiting tasks are parked until the holder releases the fixture; nothing
//! polls. Locks are released on every exit path, including errors, panics,
//! and cancellation of the awaiting future.
//!
//! [`DirectoryResolver`]: fixturekit_directory::DirectoryResolver

mod coordinator;
mod error;
mod locator;
mod report;
mod scope;

pub use coordinator::AccessCoordinator;
pub use error::{AccessError, Result};
pub use fixturekit_config::AccessOptions;
pub use locator::FixtureLocator;
pub use report::{format_usage_report, COUNT_COLUMN_WIDTH, NAME_COLUMN_WIDTH};
pub use scope::{NoopScope, ResourceScope};
