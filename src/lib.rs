//! keycask - encrypted single-file credential store
//!
//! This library provides the storage engine behind the `keycask` command:
//! credential entries serialized, gzip-compressed, and encrypted with
//! AES-256 in CBC mode under a passphrase-derived key, inside a small
//! versioned container format.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `crypto`: AES-256 block cipher, CBC mode, stream adapters, key derivation
//! - `format`: Envelope header and file format version registry
//! - `storage`: Document open/save pipeline, payload codecs, atomic writes
//! - `session`: The state of one open document
//! - `models`: Entries, the entry collection, and the password generator
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use keycask::config::Settings;
//! use keycask::models::Entry;
//! use keycask::session::Session;
//!
//! let mut session = Session::new();
//! session.add_entry(Entry::new("Duff Beer Webshop").with_user("homer"))?;
//! session.save_as("vault.kcask", "open sesame")?;
//!
//! let session = Session::open("vault.kcask", "open sesame", &Settings::default())?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod format;
pub mod models;
pub mod session;
pub mod storage;

pub use error::{KeycaskError, KeycaskResult};
pub use session::Session;
