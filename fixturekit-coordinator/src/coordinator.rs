//! Per-fixture exclusive access with memoized resolution and usage counts.

use crate::error::{AccessError, Result};
use crate::locator::FixtureLocator;
use crate::report::format_usage_report;
use crate::scope::{NoopScope, ResourceScope, ScopeGuard};
use fixturekit_config::AccessOptions;
use fixturekit_directory::DirectoryResolver;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Notify;
use tracing::{debug, info, trace};

/// Shared mutable state. Every read and write goes through one mutex,
/// which is never held across an await point.
#[derive(Debug, Default)]
struct CoordinatorState {
    /// Fixture identifier → token of the current holder.
    locked: HashMap<String, u64>,
    /// Fixture identifier → resolved path.
    resolved: HashMap<String, PathBuf>,
    /// Fixture identifier → number of coordinated accesses.
    counts: HashMap<String, u64>,
    next_token: u64,
}

/// Serializes access to same-named fixtures across concurrent tasks.
///
/// At most one `with_exclusive_access`/`with_scoped_access` body runs per
/// fixture identifier at a time; different identifiers proceed in parallel.
/// Resolved paths are memoized and every access is counted.
///
/// Exclusivity is an in-process convention: no OS file locks are taken and
/// only callers going through the same coordinator instance are ordered.
/// Construct one instance per test suite and share it by `Arc` or reference.
///
/// # Examples
///
/// ```no_run
/// use fixturekit_coordinator::{AccessCoordinator, AccessError};
/// use fixturekit_directory::DirectoryResolver;
///
/// # async fn run() -> Result<(), AccessError> {
/// let coordinator = AccessCoordinator::new(DirectoryResolver::new(file!()));
/// let bytes = coordinator
///     .with_exclusive_access("sample.json", |path| async move {
///         Ok::<_, AccessError>(tokio::fs::read(path).await.unwrap_or_default())
///     })
///     .await?;
/// # let _ = bytes;
/// # Ok(())
/// # }
/// ```
pub struct AccessCoordinator<L = DirectoryResolver> {
    locator: Arc<L>,
    options: AccessOptions,
    scope: Arc<dyn ResourceScope>,
    state: Mutex<CoordinatorState>,
    released: Notify,
}

impl<L: fmt::Debug> fmt::Debug for AccessCoordinator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCoordinator")
            .field("locator", &self.locator)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Releases a fixture lock on drop and wakes waiters.
struct AccessLock<'a> {
    state: &'a Mutex<CoordinatorState>,
    released: &'a Notify,
    name: String,
    token: u64,
}

impl Drop for AccessLock<'_> {
    fn drop(&mut self) {
        {
            let mut state = lock_state(self.state);
            // After release_all_locks another holder may own this name now
            if state.locked.get(&self.name) == Some(&self.token) {
                state.locked.remove(&self.name);
            }
        }
        trace!("Released fixture lock: {}", self.name);
        self.released.notify_waiters();
    }
}

fn lock_state(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<L: FixtureLocator + 'static> AccessCoordinator<L> {
    /// Create a coordinator resolving fixtures through `locator`.
    pub fn new(locator: L) -> Self {
        Self {
            locator: Arc::new(locator),
            options: AccessOptions::default(),
            scope: Arc::new(NoopScope),
            state: Mutex::new(CoordinatorState::default()),
            released: Notify::new(),
        }
    }

    /// Replace the access options (e.g. the acquire timeout).
    pub fn with_options(mut self, options: AccessOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the scope used by [`Self::with_scoped_access`].
    pub fn with_resource_scope(mut self, scope: impl ResourceScope + 'static) -> Self {
        self.scope = Arc::new(scope);
        self
    }

    /// The locator used for path resolution.
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Run `operation` on the fixture's path while holding its exclusive lock.
    ///
    /// Waits until no other coordinated operation holds `fixture_id`, counts
    /// the access, resolves the path (memoized), then awaits `operation`.
    /// The lock is released when this future completes, fails, panics, or is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Resolution failures and acquire timeouts are converted with
    /// `E::from(AccessError)`. Errors from `operation` are returned unchanged.
    pub async fn with_exclusive_access<F, Fut, T, E>(
        &self,
        fixture_id: &str,
        operation: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<AccessError>,
    {
        let _lock = self.acquire(fixture_id).await.map_err(E::from)?;
        self.record_access(fixture_id);
        let path = self.resolve(fixture_id).await.map_err(E::from)?;
        operation(path).await
    }

    /// Like [`Self::with_exclusive_access`], with the resource scope started
    /// before `operation` runs and stopped after it finishes, whatever the
    /// outcome.
    pub async fn with_scoped_access<F, Fut, T, E>(
        &self,
        fixture_id: &str,
        operation: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<AccessError>,
    {
        let _lock = self.acquire(fixture_id).await.map_err(E::from)?;
        self.record_access(fixture_id);
        let path = self.resolve(fixture_id).await.map_err(E::from)?;
        let _scope = ScopeGuard::start(self.scope.as_ref(), &path);
        operation(path).await
    }

    /// True while a coordinated operation holds `fixture_id`.
    pub fn is_locked(&self, fixture_id: &str) -> bool {
        self.state().locked.contains_key(fixture_id)
    }

    /// Drop every lock and wake all waiters.
    ///
    /// Meant for recovery after a hung operation; bodies still running keep
    /// running without exclusivity.
    pub fn release_all_locks(&self) {
        let released = {
            let mut state = self.state();
            let count = state.locked.len();
            state.locked.clear();
            count
        };
        debug!("Released {} fixture locks", released);
        self.released.notify_waiters();
    }

    /// Forget every memoized path.
    pub fn clear_cache(&self) {
        self.state().resolved.clear();
        debug!("Cleared fixture path cache");
    }

    /// The memoized path of `fixture_id`, if resolved before.
    pub fn cached_path(&self, fixture_id: &str) -> Option<PathBuf> {
        self.state().resolved.get(fixture_id).cloned()
    }

    /// Resolve and memoize the given fixtures ahead of use.
    ///
    /// Returns how many were newly cached. Stops at the first failure;
    /// fixtures resolved before it stay cached.
    pub fn preload<I, S>(&self, fixture_ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for id in fixture_ids {
            let id = id.as_ref();
            if self.cached_path(id).is_some() {
                continue;
            }
            let path = self.locator.locate(id)?;
            self.state().resolved.insert(id.to_string(), path);
            added += 1;
        }
        debug!("Preloaded {} fixture paths", added);
        Ok(added)
    }

    /// Resolve and memoize every fixture the locator can list.
    pub fn preload_all(&self) -> Result<usize> {
        let ids = self.locator.fixture_ids()?;
        self.preload(ids)
    }

    /// Number of coordinated accesses to `fixture_id`.
    pub fn access_count(&self, fixture_id: &str) -> u64 {
        self.state().counts.get(fixture_id).copied().unwrap_or(0)
    }

    /// Access counts of every fixture accessed so far.
    pub fn access_counts(&self) -> BTreeMap<String, u64> {
        self.state()
            .counts
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect()
    }

    /// Zero every access count.
    pub fn reset_counts(&self) {
        self.state().counts.clear();
    }

    /// Fixed-width table of access counts, highest first.
    pub fn usage_report(&self) -> String {
        format_usage_report(&self.access_counts())
    }

    /// Emit [`Self::usage_report`] through `tracing` at info level.
    pub fn log_usage_report(&self) {
        info!("\n{}", self.usage_report());
    }

    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        lock_state(&self.state)
    }

    async fn acquire(&self, fixture_id: &str) -> Result<AccessLock<'_>> {
        let Some(limit) = self.options.acquire_timeout() else {
            return Ok(self.wait_for_lock(fixture_id).await);
        };

        let started = Instant::now();
        tokio::time::timeout(limit, self.wait_for_lock(fixture_id))
            .await
            .map_err(|_| AccessError::AcquireTimeout {
                name: fixture_id.to_string(),
                waited: started.elapsed(),
            })
    }

    async fn wait_for_lock(&self, fixture_id: &str) -> AccessLock<'_> {
        loop {
            // Register interest before checking so a release between the
            // check and the await is not missed.
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(token) = self.try_lock(fixture_id) {
                trace!("Acquired fixture lock: {}", fixture_id);
                return AccessLock {
                    state: &self.state,
                    released: &self.released,
                    name: fixture_id.to_string(),
                    token,
                };
            }

            trace!("Waiting for fixture lock: {}", fixture_id);
            notified.await;
        }
    }

    fn try_lock(&self, fixture_id: &str) -> Option<u64> {
        let mut state = self.state();
        if state.locked.contains_key(fixture_id) {
            return None;
        }
        state.next_token += 1;
        let token = state.next_token;
        state.locked.insert(fixture_id.to_string(), token);
        Some(token)
    }

    fn record_access(&self, fixture_id: &str) {
        *self
            .state()
            .counts
            .entry(fixture_id.to_string())
            .or_insert(0) += 1;
    }

    /// Cached path, or a lookup on the blocking pool so directory walks
    /// never stall the async workers.
    async fn resolve(&self, fixture_id: &str) -> Result<PathBuf> {
        let cached = self.cached_path(fixture_id);
        if let Some(path) = cached {
            trace!("Path cache hit: {}", fixture_id);
            return Ok(path);
        }

        trace!("Path cache miss: {}", fixture_id);
        let locator = Arc::clone(&self.locator);
        let id = fixture_id.to_string();
        let path = tokio::task::spawn_blocking(move || locator.locate(&id))
            .await
            .map_err(|e| AccessError::LookupTask {
                name: fixture_id.to_string(),
                message: e.to_string(),
            })??;
        self.state()
            .resolved
            .insert(fixture_id.to_string(), path.clone());
        Ok(path)
    }
}
