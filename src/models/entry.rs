//! Credential entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::SecureString;

/// Longest accepted title, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// A single stored credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Title, unique within a collection ignoring case
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecureString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the entry was created
    pub created: DateTime<Utc>,

    /// When the entry was last modified
    pub modified: DateTime<Utc>,
}

impl Entry {
    /// Create an entry with only a title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            url: None,
            user: None,
            password: None,
            notes: None,
            created: now,
            modified: now,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<SecureString>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Refresh the modification time
    ///
    /// Never moves `modified` before `created`, even if the clock went back.
    pub fn touch(&mut self) {
        self.modified = Utc::now().max(self.created);
    }

    /// Copy this entry under a new title with fresh timestamps
    pub fn duplicate(&self, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            created: now,
            modified: now,
            ..self.clone()
        }
    }

    /// Validate a new or retitled entry
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        self.validate_title_present()?;

        let len = self.title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(EntryValidationError::TitleTooLong(len));
        }

        Ok(())
    }

    /// The one check stored entries must pass: a non-blank title
    pub fn validate_title_present(&self) -> Result<(), EntryValidationError> {
        if self.title.trim().is_empty() {
            return Err(EntryValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Normalize a title for comparison
    pub fn normalize_title(title: &str) -> String {
        title.trim().to_lowercase()
    }

    /// Check if this entry has the given title (case-insensitive)
    pub fn matches_title(&self, title: &str) -> bool {
        Self::normalize_title(&self.title) == Self::normalize_title(title)
    }

    /// Check if the title contains `query`, ignoring case
    pub fn title_contains(&self, query: &str) -> bool {
        self.title
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Entry title cannot be empty"),
            Self::TitleTooLong(len) => {
                write!(f, "Entry title too long ({} chars, max {})", len, MAX_TITLE_LEN)
            }
        }
    }
}

impl std::error::Error for EntryValidationError {}
