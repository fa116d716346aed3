//! User settings for keycask
//!
//! Manages the default document, payload format, compression level and
//! password generator preferences.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::KeycaskPaths;
use crate::error::KeycaskError;
use crate::models::generator::{self, PasswordGenerator};
use crate::storage::codec::SerializationFormat;
use crate::storage::document::DEFAULT_COMPRESSION_LEVEL;
use crate::storage::file_io::{read_json, write_json_atomic};

/// Password generator preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordGenerationSettings {
    #[serde(default = "default_password_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub upper: bool,

    #[serde(default = "default_true")]
    pub lower: bool,

    #[serde(default = "default_true")]
    pub digits: bool,

    /// Symbol characters to include; `None` leaves symbols out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<String>,
}

impl Default for PasswordGenerationSettings {
    fn default() -> Self {
        Self {
            length: default_password_length(),
            upper: true,
            lower: true,
            digits: true,
            symbols: None,
        }
    }
}

impl PasswordGenerationSettings {
    /// A generator configured from these preferences
    pub fn generator(&self) -> PasswordGenerator {
        PasswordGenerator::new()
            .length(self.length)
            .upper(self.upper)
            .lower(self.lower)
            .digits(self.digits)
            .symbols(self.symbols.clone())
    }
}

/// User settings for keycask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Document opened when no `--file` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_document: Option<PathBuf>,

    /// Payload format for newly saved documents
    #[serde(default)]
    pub serialization: SerializationFormat,

    /// gzip level, 0-9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    #[serde(default)]
    pub password_generation: PasswordGenerationSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_password_length() -> usize {
    generator::DEFAULT_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_document: None,
            serialization: SerializationFormat::default(),
            compression_level: default_compression_level(),
            password_generation: PasswordGenerationSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or default settings if the file doesn't exist
    pub fn load_or_create(paths: &KeycaskPaths) -> Result<Self, KeycaskError> {
        let settings: Settings = read_json(paths.settings_file()).map_err(|e| {
            KeycaskError::Config(format!("Failed to load settings file: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &KeycaskPaths) -> Result<(), KeycaskError> {
        self.validate()?;
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Reject out-of-range values
    pub fn validate(&self) -> Result<(), KeycaskError> {
        if self.compression_level > 9 {
            return Err(KeycaskError::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.compression_level
            )));
        }
        self.password_generation
            .generator()
            .validate()
            .map_err(|e| KeycaskError::Config(format!("password_generation: {}", e)))
    }

    /// The document to use: `explicit` if given, then the configured
    /// default, then the standard location
    pub fn document_path(&self, paths: &KeycaskPaths, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.default_document.clone())
            .unwrap_or_else(|| paths.default_document())
    }
}
