//! Fixtures-directory discovery.
//!
//! Strategies run in decreasing order of confidence:
//!
//! 1. A CI checkout root named by an environment variable.
//! 2. An upward walk from the starting directory that stops at the first
//!    project root (package manifest or IDE project entry).
//! 3. A recursive search below that project root when it has no fixtures
//!    directory of its own.

use crate::environment::Environment;
use crate::error::{DiscoveryStrategy, FixtureError, Result};
use fixturekit_config::DiscoveryOptions;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// A located fixtures directory and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    /// Path of the fixtures directory.
    pub path: PathBuf,
    /// Strategy that produced `path`.
    pub strategy: DiscoveryStrategy,
}

/// What one directory level contains, as far as discovery cares.
#[derive(Debug, Default)]
struct LevelScan {
    fixtures_dir: Option<PathBuf>,
    is_project_root: bool,
}

/// Locate the fixtures directory for `start`.
///
/// `start` is usually the path of a test source file. When it names an
/// existing directory that directory is the first level examined,
/// otherwise its parent is. Relative paths are taken against the current
/// directory, so `file!()` works when tests run from the project root.
pub fn resolve_fixtures_directory(
    start: &Path,
    options: &DiscoveryOptions,
    env: &dyn Environment,
) -> Result<ResolvedDirectory> {
    let start = &absolute_start(start);
    let mut attempted = Vec::new();

    if let Some(ci_root) = ci_root(options, env) {
        attempted.push(DiscoveryStrategy::CiEnvironment);
        if let Some(path) = scan_level(&ci_root, options).fixtures_dir {
            debug!("Found fixtures directory at CI root: {}", path.display());
            return Ok(ResolvedDirectory {
                path,
                strategy: DiscoveryStrategy::CiEnvironment,
            });
        }
        attempted.push(DiscoveryStrategy::RecursiveSearch);
        if let Some(path) = find_fixtures_dir_recursive(&ci_root, options) {
            debug!("Found fixtures directory below CI root: {}", path.display());
            return Ok(ResolvedDirectory {
                path,
                strategy: DiscoveryStrategy::RecursiveSearch,
            });
        }
        debug!(
            "CI root {} has no fixtures directory, falling back to path discovery",
            ci_root.display()
        );
    }

    attempted.push(DiscoveryStrategy::AncestorWalk);
    let mut current = starting_directory(start);

    for level in 0..options.max_ascent_depth {
        trace!("Examining level {}: {}", level, current.display());
        let scan = scan_level(&current, options);

        if scan.is_project_root {
            if let Some(path) = scan.fixtures_dir {
                debug!("Found fixtures directory at project root: {}", path.display());
                return Ok(ResolvedDirectory {
                    path,
                    strategy: DiscoveryStrategy::AncestorWalk,
                });
            }

            debug!(
                "Project root {} has no fixtures directory, searching recursively",
                current.display()
            );
            if !attempted.contains(&DiscoveryStrategy::RecursiveSearch) {
                attempted.push(DiscoveryStrategy::RecursiveSearch);
            }
            return match find_fixtures_dir_recursive(&current, options) {
                Some(path) => Ok(ResolvedDirectory {
                    path,
                    strategy: DiscoveryStrategy::RecursiveSearch,
                }),
                None => Err(FixtureError::FixturesDirectoryNotFound {
                    start: start.to_path_buf(),
                    max_depth: options.max_ascent_depth,
                    attempted,
                    examined_root: Some(current),
                }),
            };
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    Err(FixtureError::FixturesDirectoryNotFound {
        start: start.to_path_buf(),
        max_depth: options.max_ascent_depth,
        attempted,
        examined_root: None,
    })
}

/// Search below `root` for a directory named like the fixtures directory.
///
/// Hidden entries and the configured skip directories are never entered.
/// The shallowest match wins; among matches at the same depth the first in
/// file-name order wins.
pub fn find_fixtures_dir_recursive(root: &Path, options: &DiscoveryOptions) -> Option<PathBuf> {
    let mut best: Option<(usize, PathBuf)> = None;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(options.max_search_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| options.should_skip(name))
        });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_match = entry
            .file_name()
            .to_str()
            .is_some_and(|name| options.is_fixtures_dir_name(name));
        if !is_match {
            continue;
        }

        let depth = entry.depth();
        trace!("Recursive search candidate at depth {}: {}", depth, entry.path().display());
        if best.as_ref().map_or(true, |(d, _)| depth < *d) {
            best = Some((depth, entry.into_path()));
        }
        if depth == 1 {
            break;
        }
    }

    best.map(|(_, path)| path)
}

/// True when `dir` directly contains a project root marker.
pub fn is_project_root(dir: &Path, options: &DiscoveryOptions) -> bool {
    scan_level(dir, options).is_project_root
}

/// `start` as an absolute path.
///
/// Paths with `..` components are canonicalized when they exist so the
/// upward walk follows real parents.
fn absolute_start(start: &Path) -> PathBuf {
    let start = if start.as_os_str().is_empty() {
        Path::new(".")
    } else {
        start
    };
    let has_parent_dir = start
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if has_parent_dir {
        if let Ok(canonical) = fs::canonicalize(start) {
            return canonical;
        }
    }
    match std::path::absolute(start) {
        Ok(path) => path,
        Err(e) => {
            debug!("Cannot make {} absolute: {}", start.display(), e);
            start.to_path_buf()
        }
    }
}

/// The directory discovery starts from.
fn starting_directory(start: &Path) -> PathBuf {
    if start.is_dir() {
        return start.to_path_buf();
    }
    match start.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// First CI root variable, in priority order, naming an existing directory.
///
/// Variables that are unset, empty, or name a missing directory are passed
/// over in favor of the next one.
fn ci_root(options: &DiscoveryOptions, env: &dyn Environment) -> Option<PathBuf> {
    options.ci_root_variables.iter().find_map(|name| {
        let value = env.var(name).filter(|v| !v.trim().is_empty())?;
        let root = PathBuf::from(value);
        if root.is_dir() {
            debug!("Using CI root from {}: {}", name, root.display());
            Some(root)
        } else {
            debug!("{} names a missing directory: {}", name, root.display());
            None
        }
    })
}

/// Look at the entries of one directory.
///
/// Unreadable or missing levels scan as empty so the walk can continue
/// upward past them.
fn scan_level(dir: &Path, options: &DiscoveryOptions) -> LevelScan {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            trace!("Cannot read {}: {}", dir.display(), e);
            return LevelScan::default();
        }
    };

    let mut scan = LevelScan::default();
    let mut fixtures_candidates = Vec::new();

    for entry in entries.filter_map(|e| e.ok()) {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        if options.is_project_marker(name) {
            scan.is_project_root = true;
        }
        if options.is_fixtures_dir_name(name) && entry.path().is_dir() {
            fixtures_candidates.push(name.to_string());
        }
    }

    // Prefer the exact spelling when several case variants exist.
    fixtures_candidates.sort();
    let chosen = fixtures_candidates
        .iter()
        .find(|name| **name == options.fixtures_dir_name)
        .or_else(|| fixtures_candidates.first());
    scan.fixtures_dir = chosen.map(|name| dir.join(name));
    scan
}
