//! Read-only access to environment variables.
//!
//! Discovery consults CI checkout variables through the [`Environment`]
//! trait so tests and callers can supply a fixed set of variables instead of
//! the real process environment.

use std::collections::HashMap;

/// A read-only key-value source of environment variables.
pub trait Environment: Send + Sync {
    /// Look up a variable, returning `None` when it is unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed, in-memory set of variables.
///
/// An empty `MapEnvironment` disables the CI shortcut entirely.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// An environment with no variables set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
