//! On-disk shape library.
//!
//! One `.crv` file per shape, one curve command per line. The directory is the
//! only index: every listing re-scans it and nothing is cached.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LibraryConfig;
use crate::error::LibraryError;
use crate::host::Interaction;

/// File extension of shape files, including the dot.
pub const SHAPE_EXTENSION: &str = ".crv";

/// A directory of named shape records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeLibrary {
    root: PathBuf,
}

impl ShapeLibrary {
    /// Open the library at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let root = root.into();
        if !root.is_dir() {
            fs::create_dir_all(&root).map_err(|e| LibraryError::io(&root, e))?;
            tracing::info!(root = %root.display(), "created shape library directory");
        }
        Ok(Self { root })
    }

    /// Open the library described by `config`.
    pub fn from_config(config: &LibraryConfig) -> Result<Self, LibraryError> {
        Self::open(config.shapes_dir())
    }

    /// Library directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all shapes currently on disk.
    pub fn list_shapes(&self) -> Result<BTreeSet<String>, LibraryError> {
        let entries = fs::read_dir(&self.root).map_err(|e| LibraryError::io(&self.root, e))?;
        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| LibraryError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(SHAPE_EXTENSION) {
                if !stem.is_empty() {
                    names.insert(stem.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Whether a shape file exists.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve_path(name, false).is_ok()
    }

    /// Path of a shape file.
    ///
    /// With `for_write` false the file must already exist.
    pub fn resolve_path(&self, name: &str, for_write: bool) -> Result<PathBuf, LibraryError> {
        validate_name(name)?;
        let path = self.root.join(format!("{name}{SHAPE_EXTENSION}"));
        if !for_write && !path.is_file() {
            return Err(LibraryError::NotFound {
                name: name.to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Read the commands stored for a shape, skipping blank lines.
    pub fn read(&self, name: &str) -> Result<Vec<String>, LibraryError> {
        let path = self.resolve_path(name, false)?;
        let text = fs::read_to_string(&path).map_err(|e| LibraryError::io(&path, e))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Write a new shape file.
    ///
    /// `None` is a cancelled name prompt: nothing is written and `Ok(None)` is
    /// returned. An existing file of the same name is replaced.
    pub fn save(
        &self,
        name: Option<&str>,
        payload: &[String],
    ) -> Result<Option<PathBuf>, LibraryError> {
        let Some(name) = name else {
            return Ok(None);
        };
        let path = self.resolve_path(name, true)?;
        write_payload(&path, payload)?;
        tracing::info!(shape = name, curves = payload.len(), "saved shape");
        Ok(Some(path))
    }

    /// Replace the payload of an existing shape.
    pub fn overwrite(&self, name: &str, payload: &[String]) -> Result<PathBuf, LibraryError> {
        let path = self.resolve_path(name, false)?;
        write_payload(&path, payload)?;
        tracing::info!(shape = name, curves = payload.len(), "overwrote shape");
        Ok(path)
    }

    /// Delete a shape after asking `ui` to confirm.
    ///
    /// Returns `Ok(false)` when the user declines. A missing shape is
    /// `NotFound`.
    pub fn delete(&self, name: &str, ui: &mut dyn Interaction) -> Result<bool, LibraryError> {
        let path = self.resolve_path(name, false)?;
        if !ui.confirm(
            "Delete Shape",
            &format!("Are you sure you want to delete '{name}'?"),
        ) {
            tracing::debug!(shape = name, "delete declined");
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| LibraryError::io(&path, e))?;
        tracing::info!(shape = name, "deleted shape");
        Ok(true)
    }
}

/// Write one command per line. No cleanup on failure.
fn write_payload(path: &Path, payload: &[String]) -> Result<(), LibraryError> {
    let mut text = String::with_capacity(payload.iter().map(|c| c.len() + 1).sum());
    for command in payload {
        text.push_str(command);
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| LibraryError::io(path, e))
}

/// Reject names that would escape the library directory or double the extension.
pub fn validate_name(name: &str) -> Result<(), LibraryError> {
    if name.trim().is_empty() {
        return Err(LibraryError::invalid_name(name, "name is empty"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(LibraryError::invalid_name(
            name,
            "name contains a path separator",
        ));
    }
    if name == "." || name == ".." {
        return Err(LibraryError::invalid_name(name, "name is a directory reference"));
    }
    if name.to_ascii_lowercase().ends_with(SHAPE_EXTENSION) {
        return Err(LibraryError::invalid_name(
            name,
            "name already carries the .crv extension",
        ));
    }
    Ok(())
}
