//! Scoped resource permissions around fixture access.
//!
//! Some platforms require a permission to be explicitly started before a
//! file outside the sandbox is read, and stopped afterwards. On platforms
//! without that concept [`NoopScope`] is used.

use std::path::{Path, PathBuf};

/// Starts and stops access to a resource at a path.
pub trait ResourceScope: Send + Sync {
    /// Begin access. Returns true when `stop_access` must be called later.
    fn start_access(&self, path: &Path) -> bool;

    /// End access previously granted by `start_access`.
    fn stop_access(&self, path: &Path);
}

/// A scope that grants nothing and releases nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScope;

impl ResourceScope for NoopScope {
    fn start_access(&self, _path: &Path) -> bool {
        false
    }

    fn stop_access(&self, _path: &Path) {}
}

impl<S: ResourceScope + ?Sized> ResourceScope for std::sync::Arc<S> {
    fn start_access(&self, path: &Path) -> bool {
        (**self).start_access(path)
    }

    fn stop_access(&self, path: &Path) {
        (**self).stop_access(path)
    }
}

/// Stops scoped access on drop when it was started.
pub(crate) struct ScopeGuard<'a> {
    scope: &'a dyn ResourceScope,
    path: PathBuf,
    active: bool,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn start(scope: &'a dyn ResourceScope, path: &Path) -> Self {
        let active = scope.start_access(path);
        tracing::trace!(active, "Started scoped access to {}", path.display());
        Self {
            scope,
            path: path.to_path_buf(),
            active,
        }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.scope.stop_access(&self.path);
            tracing::trace!("Stopped scoped access to {}", self.path.display());
        }
    }
}
