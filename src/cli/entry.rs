//! Entry CLI commands
//!
//! Implements CLI commands for listing and editing credential entries.

use clap::Subcommand;

use super::passphrase::prompt_passphrase;
use super::{save_if_modified, CommandContext};
use crate::crypto::SecureString;
use crate::display::{format_entry_details, format_entry_list};
use crate::error::{KeycaskError, KeycaskResult};
use crate::models::Entry;

/// Entry subcommands
#[derive(Subcommand)]
pub enum EntryCommands {
    /// List entries
    #[command(alias = "ls")]
    List {
        /// Only show entries whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one entry
    Show {
        /// Entry title (case-insensitive)
        title: String,
        /// Print the password in clear text
        #[arg(short, long)]
        reveal: bool,
    },
    /// Add a new entry
    Add {
        /// Entry title
        title: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        user: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Prompt for the password
        #[arg(short, long, conflicts_with = "generate")]
        password_prompt: bool,
        /// Generate a random password
        #[arg(short, long)]
        generate: bool,
    },
    /// Edit an entry; an empty value clears a field
    Edit {
        /// Entry title (case-insensitive)
        title: String,
        /// New title
        #[arg(short = 't', long = "title")]
        new_title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        user: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
        /// Prompt for a new password
        #[arg(short, long, conflicts_with = "generate")]
        password_prompt: bool,
        /// Replace the password with a generated one
        #[arg(short, long)]
        generate: bool,
    },
    /// Copy an entry under a new title
    #[command(alias = "cp")]
    Duplicate {
        title: String,
        new_title: String,
    },
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        title: String,
    },
}

/// Handle an entry command
pub fn handle_entry_command(ctx: &CommandContext, cmd: EntryCommands) -> KeycaskResult<()> {
    let mut session = ctx.open_session()?;

    match cmd {
        EntryCommands::List { search } => {
            let entries: Vec<&Entry> = match search.as_deref() {
                Some(query) => session.entries().search(query),
                None => session.entries().iter().collect(),
            };
            print!("{}", format_entry_list(&entries));
            if !entries.is_empty() {
                println!("\nTotal: {} entries", entries.len());
            }
        }

        EntryCommands::Show { title, reveal } => {
            let entry = session
                .entries()
                .get_by_title(&title)
                .ok_or_else(|| KeycaskError::entry_not_found(&title))?;
            print!("{}", format_entry_details(entry, reveal));
        }

        EntryCommands::Add {
            title,
            url,
            user,
            notes,
            password_prompt,
            generate,
        } => {
            let mut entry = Entry::new(title);
            entry.url = non_empty(url);
            entry.user = non_empty(user);
            entry.notes = non_empty(notes);
            entry.password = new_password(ctx, password_prompt, generate)?;

            let title = entry.title.clone();
            let generated = generate.then(|| entry.password.clone()).flatten();
            session.add_entry(entry)?;
            save_if_modified(&mut session)?;

            println!("Added entry: {}", title);
            if let Some(password) = generated {
                println!("Generated password: {}", password.as_str());
            }
        }

        EntryCommands::Edit {
            title,
            new_title,
            url,
            user,
            notes,
            password_prompt,
            generate,
        } => {
            let password = new_password(ctx, password_prompt, generate)?;
            let change_password = password_prompt || generate;

            let edited = session.update_entry(&title, |e| {
                if let Some(new_title) = new_title {
                    e.title = new_title;
                }
                if url.is_some() {
                    e.url = non_empty(url);
                }
                if user.is_some() {
                    e.user = non_empty(user);
                }
                if notes.is_some() {
                    e.notes = non_empty(notes);
                }
                if change_password {
                    e.password = password.clone();
                }
            })?;
            let edited_title = edited.title.clone();
            save_if_modified(&mut session)?;

            println!("Updated entry: {}", edited_title);
            if let (true, Some(password)) = (generate, password) {
                println!("Generated password: {}", password.as_str());
            }
        }

        EntryCommands::Duplicate { title, new_title } => {
            let copy = session.duplicate_entry(&title, &new_title)?.title.clone();
            save_if_modified(&mut session)?;
            println!("Copied '{}' to '{}'", title, copy);
        }

        EntryCommands::Delete { title } => {
            let removed = session.remove_entry(&title)?;
            save_if_modified(&mut session)?;
            println!("Deleted entry: {}", removed.title);
        }
    }

    Ok(())
}

/// Password for an added or edited entry, if one was asked for
fn new_password(
    ctx: &CommandContext,
    prompt: bool,
    generate: bool,
) -> KeycaskResult<Option<SecureString>> {
    if generate {
        let password = ctx.settings.password_generation.generator().generate()?;
        return Ok(Some(password));
    }
    if prompt {
        let password = prompt_passphrase("Entry password: ")?;
        return Ok((!password.is_empty()).then_some(password));
    }
    Ok(None)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("homer".into())).as_deref(), Some("homer"));
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
