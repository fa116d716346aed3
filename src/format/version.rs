//! File format version registry
//!
//! Each version fixes the salt length and key derivation scheme used by
//! files that carry its number. Versions are only ever appended: readers
//! must accept every entry, writers always use [`latest`].

use crate::crypto::key_derivation::{derive_pbkdf2, derive_sha256_iterated, SALT_SIZE};
use crate::crypto::CipherKey;
use crate::error::{KeycaskError, KeycaskResult};

/// Descriptor of one file format generation
#[derive(Debug)]
pub struct FileVersion {
    /// Number stored in the envelope's version byte
    pub number: u8,
    /// Bytes of salt following the version byte
    pub salt_len: usize,
    /// Key derivation for this generation
    pub derive: fn(&str, &[u8]) -> CipherKey,
}

impl FileVersion {
    /// Derive the cipher key for `passphrase` and `salt`
    pub fn derive_key(&self, passphrase: &str, salt: &[u8]) -> CipherKey {
        (self.derive)(passphrase, salt)
    }
}

/// Known versions, oldest first
pub static VERSIONS: [FileVersion; 2] = [
    // Iterated SHA-256, no salt. Also used by headerless files.
    FileVersion {
        number: 0,
        salt_len: 0,
        derive: derive_sha256_iterated,
    },
    // PBKDF2-HMAC-SHA256 with a random salt
    FileVersion {
        number: 1,
        salt_len: SALT_SIZE,
        derive: derive_pbkdf2,
    },
];

/// The version new files are written with
pub fn latest() -> &'static FileVersion {
    &VERSIONS[VERSIONS.len() - 1]
}

/// The version of files written before the envelope existed
pub fn legacy() -> &'static FileVersion {
    &VERSIONS[0]
}

/// Look a version up by its number
pub fn lookup(number: u8) -> KeycaskResult<&'static FileVersion> {
    VERSIONS
        .iter()
        .find(|v| v.number == number)
        .ok_or(KeycaskError::UnsupportedVersion(number))
}
