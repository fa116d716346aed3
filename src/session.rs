//! Working state of one open document
//!
//! A [`Session`] owns the entries being edited, where they came from and
//! the passphrase protecting them. Every change marks it modified until the
//! next save.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::crypto::SecureString;
use crate::error::{KeycaskError, KeycaskResult};
use crate::models::{Entry, EntryCollection};
use crate::storage::codec::SerializationFormat;
use crate::storage::document::{DocumentRepository, DEFAULT_COMPRESSION_LEVEL};

/// An open (or new, unsaved) document
#[derive(Debug)]
pub struct Session {
    entries: EntryCollection,
    path: Option<PathBuf>,
    passphrase: Option<SecureString>,
    modified: bool,
    serialization: SerializationFormat,
    compression_level: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            entries: EntryCollection::new(),
            path: None,
            passphrase: None,
            modified: false,
            serialization: SerializationFormat::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Session {
    /// An empty, unsaved session with default storage options
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty, unsaved session using the payload format and compression
    /// from `settings`
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            serialization: settings.serialization,
            compression_level: settings.compression_level,
            ..Self::default()
        }
    }

    /// Open the encrypted document at `path`
    pub fn open(
        path: impl Into<PathBuf>,
        passphrase: impl Into<SecureString>,
        settings: &Settings,
    ) -> KeycaskResult<Self> {
        let mut session = Self::with_settings(settings);
        let path = path.into();
        let passphrase = passphrase.into();

        session.entries = session
            .repository(&path, Some(passphrase.clone()))
            .open()?;
        session.path = Some(path);
        session.passphrase = Some(passphrase);
        Ok(session)
    }

    fn repository(&self, path: &Path, passphrase: Option<SecureString>) -> DocumentRepository {
        let repo = DocumentRepository::new(path)
            .with_codec(self.serialization.codec())
            .with_compression(self.compression_level);
        match passphrase {
            Some(passphrase) => repo.with_passphrase(passphrase),
            None => repo,
        }
    }

    /// Save to the current path with the current passphrase
    pub fn save(&mut self) -> KeycaskResult<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| KeycaskError::Config("No document path set".into()))?;
        let passphrase = self
            .passphrase
            .clone()
            .ok_or_else(|| KeycaskError::Config("No passphrase set".into()))?;

        self.repository(&path, Some(passphrase)).save(&self.entries)?;
        self.modified = false;
        log::debug!("Saved session to {}", path.display());
        Ok(())
    }

    /// Save to a new path under a new passphrase; both become current
    pub fn save_as(
        &mut self,
        path: impl Into<PathBuf>,
        passphrase: impl Into<SecureString>,
    ) -> KeycaskResult<()> {
        let path = path.into();
        let passphrase = passphrase.into();

        self.repository(&path, Some(passphrase.clone()))
            .save(&self.entries)?;
        self.path = Some(path);
        self.passphrase = Some(passphrase);
        self.modified = false;
        Ok(())
    }

    /// Re-encrypt the current document under `passphrase`
    ///
    /// The file is rewritten with a fresh salt. On failure the old
    /// passphrase stays in effect.
    pub fn change_passphrase(&mut self, passphrase: impl Into<SecureString>) -> KeycaskResult<()> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| KeycaskError::Config("No document path set".into()))?;
        self.save_as(path, passphrase)
    }

    /// Write the entries unencrypted to `path`
    pub fn export(&self, path: impl AsRef<Path>) -> KeycaskResult<()> {
        self.repository(path.as_ref(), None).save(&self.entries)
    }

    /// Replace the entries with those of the unencrypted document at `path`
    pub fn import(&mut self, path: impl AsRef<Path>) -> KeycaskResult<usize> {
        let entries = self.repository(path.as_ref(), None).open()?;
        let count = entries.len();
        self.entries = entries;
        self.modified = true;
        Ok(count)
    }

    /// Forget the document, its entries and the passphrase
    pub fn clear(&mut self) {
        self.entries.clear();
        self.path = None;
        self.passphrase = None;
        self.modified = false;
    }

    /// Whether there are unsaved changes
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    /// Add a new entry
    pub fn add_entry(&mut self, entry: Entry) -> KeycaskResult<()> {
        self.entries.add(entry)?;
        self.modified = true;
        Ok(())
    }

    /// Edit an entry in place
    pub fn update_entry<F>(&mut self, title: &str, edit: F) -> KeycaskResult<&Entry>
    where
        F: FnOnce(&mut Entry),
    {
        let entry = self.entries.update(title, edit)?;
        self.modified = true;
        Ok(entry)
    }

    /// Copy an entry under a new title
    pub fn duplicate_entry(&mut self, title: &str, new_title: &str) -> KeycaskResult<&Entry> {
        let entry = self.entries.duplicate(title, new_title)?;
        self.modified = true;
        Ok(entry)
    }

    /// Delete an entry
    pub fn remove_entry(&mut self, title: &str) -> KeycaskResult<Entry> {
        let entry = self.entries.remove(title)?;
        self.modified = true;
        Ok(entry)
    }
}
