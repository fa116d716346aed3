//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::KeycaskError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, KeycaskError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| KeycaskError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| KeycaskError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), KeycaskError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, |file| {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, data)
            .map_err(|e| KeycaskError::Storage(format!("Failed to serialize data: {}", e)))?;
        writer
            .into_inner()
            .map_err(|e| KeycaskError::Storage(format!("Failed to flush data: {}", e)))
    })
}

/// Temporary sibling of `path` used while writing it
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("keycask"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write a file atomically through a caller-supplied writer
///
/// `write` receives a freshly created temporary file in the target's
/// directory and must hand it back once everything is written. The file is
/// then synced to disk and renamed over `path`. On any failure the
/// temporary file is removed and `path` is left untouched. Errors returned
/// by `write` are passed through unchanged.
pub fn write_atomic<P, F>(path: P, write: F) -> Result<(), KeycaskError>
where
    P: AsRef<Path>,
    F: FnOnce(File) -> Result<File, KeycaskError>,
{
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            KeycaskError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Create temp file in same directory (important for atomic rename)
    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path)
        .map_err(|e| KeycaskError::Storage(format!("Failed to create temp file: {}", e)))?;

    let result = write(file).and_then(|mut file| {
        file.flush()
            .map_err(|e| KeycaskError::Storage(format!("Failed to flush data: {}", e)))?;
        // Sync to disk before rename
        file.sync_all()
            .map_err(|e| KeycaskError::Storage(format!("Failed to sync data: {}", e)))
    });

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    // Atomic rename
    fs::rename(&temp_path, path).map_err(|e| {
        // Try to clean up temp file if rename fails
        let _ = fs::remove_file(&temp_path);
        KeycaskError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
