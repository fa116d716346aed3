//! Custom error types for keycask
//!
//! This module defines the error hierarchy for the storage engine and the
//! command line front end using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Longest diagnostic carried by a [`KeycaskError::DocumentProcess`] error
pub const MAX_DIAGNOSTIC_LEN: usize = 80;

/// The main error type for keycask operations
#[derive(Error, Debug, Clone)]
pub enum KeycaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A cipher was constructed from key material of the wrong size
    #[error("Invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// The envelope names a version this build does not know
    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u8),

    /// The envelope header is malformed or truncated
    #[error("Invalid file format: {0}")]
    Format(String),

    /// Padding or block alignment is wrong at the end of the cipher stream.
    ///
    /// Without an integrity tag this is indistinguishable from a wrong
    /// passphrase.
    #[error("Incorrect password or corrupted file: {0}")]
    Decrypt(String),

    /// The document file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Any other failure while reading or writing a document
    #[error("Could not process document: {0}")]
    DocumentProcess(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl KeycaskError {
    /// Create a "not found" error for entries
    pub fn entry_not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Entry",
            identifier: title.into(),
        }
    }

    /// Create a "duplicate" error for entries
    pub fn duplicate_entry(title: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: "Entry",
            identifier: title.into(),
        }
    }

    /// Wrap an unexpected pipeline failure, keeping only a short diagnostic
    pub fn document_process(detail: impl AsRef<str>) -> Self {
        Self::DocumentProcess(truncate_diagnostic(detail.as_ref()))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the document file is missing
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the failure may have been caused by a wrong passphrase
    pub fn is_decrypt(&self) -> bool {
        matches!(self, Self::Decrypt(_))
    }

    /// Wrap this error so it can travel through `std::io` stream adapters
    pub fn into_io(self) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidData, self)
    }
}

fn truncate_diagnostic(detail: &str) -> String {
    if detail.chars().count() <= MAX_DIAGNOSTIC_LEN {
        return detail.to_string();
    }
    let mut short: String = detail.chars().take(MAX_DIAGNOSTIC_LEN).collect();
    short.push_str("...");
    short
}

// Implement From traits for common error types

impl From<std::io::Error> for KeycaskError {
    fn from(err: std::io::Error) -> Self {
        // Stream adapters tunnel their own errors through io::Error
        if let Some(inner) = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<KeycaskError>())
        {
            return inner.clone();
        }
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeycaskError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return std::io::Error::from(err).into();
        }
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for KeycaskError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for keycask operations
pub type KeycaskResult<T> = Result<T, KeycaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeycaskError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = KeycaskError::entry_not_found("Duff Beer Webshop");
        assert_eq!(err.to_string(), "Entry not found: Duff Beer Webshop");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = KeycaskError::UnsupportedVersion(7);
        assert_eq!(err.to_string(), "Unsupported file version: 7");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let keycask_err: KeycaskError = io_err.into();
        assert!(matches!(keycask_err, KeycaskError::Io(_)));
    }

    #[test]
    fn test_io_error_tunnel_recovers_original() {
        let io_err = KeycaskError::Decrypt("bad padding".into()).into_io();
        let recovered: KeycaskError = io_err.into();
        assert!(recovered.is_decrypt());
    }

    #[test]
    fn test_document_process_truncates_detail() {
        let long = "x".repeat(500);
        let err = KeycaskError::document_process(&long);
        match err {
            KeycaskError::DocumentProcess(msg) => {
                assert_eq!(msg.chars().count(), MAX_DIAGNOSTIC_LEN + 3);
                assert!(msg.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_diagnostic_kept() {
        let err = KeycaskError::document_process("bad gzip header");
        assert_eq!(err.to_string(), "Could not process document: bad gzip header");
    }
}
