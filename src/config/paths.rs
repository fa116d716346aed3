//! Path management for keycask
//!
//! ## Path Resolution Order
//!
//! 1. `KEYCASK_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/keycask` or `~/.config/keycask`
//! 3. Windows: `%APPDATA%\keycask`

use std::path::PathBuf;

use crate::error::KeycaskError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "KEYCASK_DATA_DIR";

/// File extension of keycask documents
pub const DOCUMENT_EXTENSION: &str = "kcask";

/// Manages all paths used by keycask
#[derive(Debug, Clone)]
pub struct KeycaskPaths {
    /// Base directory for settings and the default document
    base_dir: PathBuf,
}

impl KeycaskPaths {
    /// Create a new KeycaskPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, KeycaskError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create KeycaskPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/keycask/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Document used when neither `--file` nor the settings name one
    pub fn default_document(&self) -> PathBuf {
        self.base_dir.join("vault").with_extension(DOCUMENT_EXTENSION)
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), KeycaskError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| KeycaskError::Io(format!("Failed to create base directory: {}", e)))?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, KeycaskError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    let config_base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var_os("HOME").ok_or_else(|| {
                KeycaskError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("keycask"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, KeycaskError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| KeycaskError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("keycask"))
}
