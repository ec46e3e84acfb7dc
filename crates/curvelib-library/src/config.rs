//! Library configuration.
//!
//! Settings live in `curvelib.toml` under the preferences root. Every field is
//! optional; a missing file means defaults.

use std::path::{Path, PathBuf};

use curvelib_codec::CodecOptions;
use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// Environment variable overriding the preferences root.
pub const PREFS_ENV: &str = "CURVELIB_PREFS";

/// Configuration file name inside the preferences root.
pub const CONFIG_FILE: &str = "curvelib.toml";

/// Settings for a shape library session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Per-user preferences root. Resolved from the environment when unset.
    pub prefs_root: Option<PathBuf>,
    /// Directory under the preferences root holding `.crv` files.
    pub shapes_subdir: String,
    /// Write `yes` as the periodic flag of periodic curves.
    pub emit_periodic_flag: bool,
    /// Default answer offered when prompting for a new curve name.
    pub default_curve_name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            prefs_root: None,
            shapes_subdir: "curves".to_string(),
            emit_periodic_flag: false,
            default_curve_name: "newControl".to_string(),
        }
    }
}

impl LibraryConfig {
    /// Load `curvelib.toml` from `prefs_root` (or the resolved default root).
    ///
    /// A missing file yields the defaults with `prefs_root` filled in.
    pub fn load(prefs_root: Option<&Path>) -> Result<Self, LibraryError> {
        let root = match prefs_root {
            Some(root) => root.to_path_buf(),
            None => default_prefs_root(),
        };
        let path = root.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(LibraryError::io(path, e)),
        };
        if config.prefs_root.is_none() {
            config.prefs_root = Some(root);
        }
        tracing::debug!(shapes_dir = %config.shapes_dir().display(), "loaded library config");
        Ok(config)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LibraryError> {
        toml::from_str(text).map_err(|e| LibraryError::Config(e.to_string()))
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, LibraryError> {
        toml::to_string_pretty(self).map_err(|e| LibraryError::Config(e.to_string()))
    }

    /// The preferences root in effect.
    pub fn resolve_prefs_root(&self) -> PathBuf {
        self.prefs_root.clone().unwrap_or_else(default_prefs_root)
    }

    /// Directory holding the shape files.
    pub fn shapes_dir(&self) -> PathBuf {
        self.resolve_prefs_root().join(&self.shapes_subdir)
    }

    /// Codec options derived from this configuration.
    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            emit_periodic_flag: self.emit_periodic_flag,
        }
    }
}

/// `$CURVELIB_PREFS`, else the platform config directory joined with
/// `curvelib` (`~/.config/curvelib`, `%APPDATA%\curvelib`, ...).
pub fn default_prefs_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(PREFS_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    match dirs::config_dir() {
        Some(dir) => dir.join("curvelib"),
        None => {
            tracing::warn!("no per-user config directory; using the working directory");
            PathBuf::from(".")
        }
    }
}
