//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the session layer.

pub mod entry;
pub mod file;
pub mod passphrase;

pub use entry::{handle_entry_command, EntryCommands};
pub use file::{handle_file_command, FileCommands};
pub use passphrase::PassphraseSource;

use std::path::{Path, PathBuf};

use crate::config::{KeycaskPaths, Settings};
use crate::error::KeycaskResult;
use crate::session::Session;

/// Everything a command needs to find and unlock its document
pub struct CommandContext {
    pub paths: KeycaskPaths,
    pub settings: Settings,
    pub document: PathBuf,
    pub passphrases: PassphraseSource,
}

impl CommandContext {
    pub fn new(
        paths: KeycaskPaths,
        settings: Settings,
        file: Option<PathBuf>,
        passphrases: PassphraseSource,
    ) -> Self {
        let document = settings.document_path(&paths, file);
        Self {
            paths,
            settings,
            document,
            passphrases,
        }
    }

    /// Path of the document commands operate on
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Open the document, asking for its passphrase
    pub fn open_session(&self) -> KeycaskResult<Session> {
        let passphrase = self.passphrases.current()?;
        Session::open(&self.document, passphrase, &self.settings)
    }
}

/// Save the session if a command changed it
pub(crate) fn save_if_modified(session: &mut Session) -> KeycaskResult<()> {
    if session.is_modified() {
        session.save()?;
    }
    Ok(())
}
