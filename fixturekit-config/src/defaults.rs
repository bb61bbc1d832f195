//! Default values for fixture discovery and access coordination

/// Name of the directory that holds a project's fixtures.
pub const DEFAULT_FIXTURES_DIR_NAME: &str = "Fixtures";

/// Maximum number of directory levels examined while walking upward from
/// the starting path. The starting directory counts as the first level.
pub const DEFAULT_MAX_ASCENT_DEPTH: usize = 10;

/// Maximum depth of the recursive fallback search below a project root.
pub const DEFAULT_MAX_SEARCH_DEPTH: usize = 12;

/// Package manifest filenames that mark a project root.
pub const PACKAGE_MANIFESTS: &[&str] = &["Package.swift", "Cargo.toml"];

/// Directory-name suffixes of IDE projects that mark a project root.
pub const IDE_PROJECT_SUFFIXES: &[&str] = &[".xcodeproj", ".xcworkspace"];

/// CI variables naming the repository checkout, in priority order.
pub const CI_ROOT_VARIABLES: &[&str] = &[
    "CI_PRIMARY_REPOSITORY_PATH",
    "GITHUB_WORKSPACE",
    "CI_PROJECT_DIR",
    "BITRISE_SOURCE_DIR",
    "CIRCLE_WORKING_DIRECTORY",
    "TRAVIS_BUILD_DIR",
];

/// Directories never entered by the recursive fallback search.
///
/// Hidden entries are skipped independently of this list.
pub const SKIP_DIRECTORIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    ".build",
    "node_modules",
    "target",
    "build",
    "dist",
    "out",
    "DerivedData",
    "Pods",
    "Carthage",
    "vendor",
    "__pycache__",
];

pub(crate) fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
