//! Configuration file discovery
//!
//! Looks for `fixturekit.{toml,yaml,yml,json}` and the dot-prefixed variants
//! in one explicitly supplied project directory. No implicit lookup from the
//! current working directory is performed.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// File names recognized as configuration, lowest precedence first.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".fixturekit.toml",
    ".fixturekit.yaml",
    ".fixturekit.yml",
    ".fixturekit.json",
    "fixturekit.toml",
    "fixturekit.yaml",
    "fixturekit.yml",
    "fixturekit.json",
];

/// Represents a discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the configuration file
    pub path: PathBuf,
    /// Detected format of the file
    pub format: ConfigFormat,
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (.toml extension)
    Toml,
    /// YAML format (.yaml or .yml extensions)
    Yaml,
    /// JSON format (.json extension)
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Find configuration files in `dir`, ordered lowest precedence first.
pub fn discover_config_files(dir: &Path) -> Vec<ConfigFile> {
    if !dir.is_dir() {
        debug!("Config directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let files: Vec<ConfigFile> = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|candidate| candidate.is_file())
        .filter_map(|path| {
            let format = ConfigFormat::from_path(&path)?;
            trace!("Found config: {} ({:?})", path.display(), format);
            Some(ConfigFile { path, format })
        })
        .collect();

    debug!("Discovered {} configuration files in {}", files.len(), dir.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }

    #[test]
    fn test_discover_orders_dot_files_first() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("fixturekit.toml"), "").unwrap();
        fs::write(temp.path().join(".fixturekit.yaml"), "").unwrap();
        fs::write(temp.path().join("unrelated.toml"), "").unwrap();

        let files = discover_config_files(temp.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with(".fixturekit.yaml"));
        assert_eq!(files[0].format, ConfigFormat::Yaml);
        assert!(files[1].path.ends_with("fixturekit.toml"));
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(discover_config_files(&temp.path().join("nope")).is_empty());
    }
}
