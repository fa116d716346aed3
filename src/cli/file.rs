//! Document file CLI commands
//!
//! Creating a document, changing its passphrase, and moving entries in and
//! out through unencrypted files.

use std::path::PathBuf;

use clap::Subcommand;

use super::{save_if_modified, CommandContext};
use crate::error::{KeycaskError, KeycaskResult};
use crate::session::Session;

/// Document file subcommands
#[derive(Subcommand)]
pub enum FileCommands {
    /// Create a new, empty encrypted document
    Init {
        /// Replace an existing document
        #[arg(long)]
        force: bool,
    },
    /// Change the document passphrase
    Passwd,
    /// Write all entries to an unencrypted (gzip-compressed) file
    Export {
        /// Destination file
        path: PathBuf,
    },
    /// Replace all entries with those of an unencrypted file
    Import {
        /// Source file written by `export`
        path: PathBuf,
    },
}

/// Handle a document file command
pub fn handle_file_command(ctx: &CommandContext, cmd: FileCommands) -> KeycaskResult<()> {
    match cmd {
        FileCommands::Init { force } => {
            let document = ctx.document();
            if document.exists() && !force {
                return Err(KeycaskError::Duplicate {
                    entity_type: "Document",
                    identifier: document.display().to_string(),
                });
            }

            println!("Creating document at: {}", document.display());
            println!();
            println!("IMPORTANT: If you forget your passphrase, your entries cannot be recovered!");
            println!();

            let passphrase = ctx.passphrases.new_passphrase()?;
            let mut session = Session::with_settings(&ctx.settings);
            session.save_as(document, passphrase)?;

            println!("Document created.");
            println!("Run 'keycask add <TITLE>' to store your first entry.");
        }

        FileCommands::Passwd => {
            let mut session = ctx.open_session()?;
            let passphrase = ctx.passphrases.replacement_passphrase()?;
            session.change_passphrase(passphrase)?;
            println!("Passphrase changed.");
        }

        FileCommands::Export { path } => {
            let session = ctx.open_session()?;
            session.export(&path)?;
            println!(
                "Exported {} entries to {}",
                session.entries().len(),
                path.display()
            );
            println!("WARNING: the exported file is NOT encrypted.");
        }

        FileCommands::Import { path } => {
            let mut session = ctx.open_session()?;
            let count = session.import(&path)?;
            save_if_modified(&mut session)?;
            println!("Imported {} entries from {}", count, path.display());
        }
    }

    Ok(())
}
