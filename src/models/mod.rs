//! Data models for keycask
//!
//! Credential entries, the collection a document stores, and the password
//! generator.

pub mod entries;
pub mod entry;
pub mod generator;

pub use entries::EntryCollection;
pub use entry::{Entry, EntryValidationError};
pub use generator::PasswordGenerator;
