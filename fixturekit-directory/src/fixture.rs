//! The `Fixture` record describing one file in the fixtures directory.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// One discovered fixture file.
///
/// `id` is always `name` when `file_extension` is empty, and
/// `name + "." + file_extension` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fixture {
    id: String,
    name: String,
    file_extension: String,
    location: PathBuf,
}

impl Fixture {
    /// Build a fixture from a file path.
    ///
    /// Returns `None` when the path has no final component or the file name
    /// is not valid UTF-8, since such a fixture could not be looked up again
    /// by its `id`.
    pub fn from_path(location: impl Into<PathBuf>) -> Option<Self> {
        let location = location.into();
        let id = location.file_name()?.to_str()?.to_string();
        let (name, file_extension) = split_file_name(&id);
        Some(Self {
            name: name.to_string(),
            file_extension: file_extension.to_string(),
            id,
            location,
        })
    }

    /// Full filename, including the extension.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Filename without its extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot, or an empty string.
    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Absolute path of the file.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// True when the extension equals `extension`, ignoring case and a leading dot.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.file_extension
            .eq_ignore_ascii_case(normalize_extension(extension))
    }
}

/// Split a filename at its last dot.
///
/// A leading dot (`.env`) or trailing dot (`notes.`) does not start an
/// extension; the whole filename is then the name.
pub(crate) fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => {
            (&file_name[..idx], &file_name[idx + 1..])
        }
        _ => (file_name, ""),
    }
}

/// Strip one leading dot from a user-supplied extension.
pub(crate) fn normalize_extension(extension: &str) -> &str {
    extension.strip_prefix('.').unwrap_or(extension)
}

/// The filename a `(name, extension)` pair refers to.
pub(crate) fn file_name_for(name: &str, extension: &str) -> String {
    let extension = normalize_extension(extension);
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}
