//! Passphrase input
//!
//! Passphrases are read with hidden terminal input. For scripted use they
//! may instead come from the `KEYCASK_PASSPHRASE` and
//! `KEYCASK_NEW_PASSPHRASE` environment variables. They are never taken
//! from command line arguments, which other users can see.

use crate::crypto::SecureString;
use crate::error::{KeycaskError, KeycaskResult};

/// Minimum length accepted for a new passphrase
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Environment variable holding the passphrase of an existing document
pub const PASSPHRASE_ENV: &str = "KEYCASK_PASSPHRASE";

/// Environment variable holding the passphrase for `init` and `passwd`
pub const NEW_PASSPHRASE_ENV: &str = "KEYCASK_NEW_PASSPHRASE";

/// Where passphrases come from for one command
#[derive(Debug, Default)]
pub struct PassphraseSource {
    current: Option<SecureString>,
    new: Option<SecureString>,
}

impl PassphraseSource {
    /// Use preset passphrases where given, prompt for the rest
    pub fn preset(current: Option<String>, new: Option<String>) -> Self {
        Self {
            current: current.map(SecureString::from),
            new: new.map(SecureString::from),
        }
    }

    /// Take preset passphrases from the environment, prompt for the rest
    pub fn from_env() -> Self {
        Self::preset(env_value(PASSPHRASE_ENV), env_value(NEW_PASSPHRASE_ENV))
    }

    /// The passphrase of an existing document
    pub fn current(&self) -> KeycaskResult<SecureString> {
        match &self.current {
            Some(passphrase) => Ok(passphrase.clone()),
            None => prompt_passphrase("Passphrase: "),
        }
    }

    /// A passphrase for a new document
    pub fn new_passphrase(&self) -> KeycaskResult<SecureString> {
        preset_or_prompt(self.new.as_ref().or(self.current.as_ref()))
    }

    /// A passphrase replacing the current one; never falls back to it
    pub fn replacement_passphrase(&self) -> KeycaskResult<SecureString> {
        preset_or_prompt(self.new.as_ref())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn preset_or_prompt(preset: Option<&SecureString>) -> KeycaskResult<SecureString> {
    match preset {
        Some(passphrase) => {
            check_new_passphrase(passphrase)?;
            Ok(passphrase.clone())
        }
        None => prompt_new_passphrase(),
    }
}

/// Prompt for a passphrase (hidden input)
pub fn prompt_passphrase(prompt: &str) -> KeycaskResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::from)
        .map_err(|e| KeycaskError::Io(format!("Failed to read passphrase: {}", e)))
}

/// Prompt for a new passphrase with confirmation
pub fn prompt_new_passphrase() -> KeycaskResult<SecureString> {
    loop {
        let pass1 = prompt_passphrase("New passphrase: ")?;

        if let Err(e) = check_new_passphrase(&pass1) {
            println!("{} Please try again.", e);
            continue;
        }

        let pass2 = prompt_passphrase("Confirm passphrase: ")?;

        if pass1 != pass2 {
            println!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

fn check_new_passphrase(passphrase: &str) -> KeycaskResult<()> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(KeycaskError::Validation(format!(
            "Passphrase must be at least {} characters.",
            MIN_PASSPHRASE_LEN
        )));
    }
    Ok(())
}
