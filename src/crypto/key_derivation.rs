//! Passphrase-based key derivation
//!
//! Two derivation schemes exist, one per file format generation:
//!
//! - legacy: iterated SHA-256 of the passphrase, no salt (read only)
//! - current: PBKDF2-HMAC-SHA256 with a random 16-byte salt
//!
//! The file format registry in [`crate::format::version`] decides which one
//! applies to a given file.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::aes256::KEY_SIZE;

/// Extra SHA-256 rounds applied after the initial digest by the legacy scheme
pub const SHA256_ITERATIONS: usize = 1000;

/// PBKDF2 rounds used by the current scheme
pub const PBKDF2_ITERATIONS: u32 = 310_000;

/// Salt length used by the current scheme
pub const SALT_SIZE: usize = 16;

/// A derived 256-bit cipher key, zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    key: [u8; KEY_SIZE],
}

impl CipherKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl PartialEq for CipherKey {
    fn eq(&self, other: &Self) -> bool {
        // Constant-time comparison
        self.key
            .iter()
            .zip(other.key.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for CipherKey {}

// Don't print the key in Debug output
impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherKey").finish_non_exhaustive()
    }
}

/// Legacy derivation: SHA-256 of the UTF-8 passphrase, re-hashed
/// [`SHA256_ITERATIONS`] times. The salt is ignored.
pub fn derive_sha256_iterated(passphrase: &str, _salt: &[u8]) -> CipherKey {
    let mut digest: [u8; KEY_SIZE] = Sha256::digest(passphrase.as_bytes()).into();
    for _ in 0..SHA256_ITERATIONS {
        let next: [u8; KEY_SIZE] = Sha256::digest(digest).into();
        digest.zeroize();
        digest = next;
    }
    let key = CipherKey::from_bytes(digest);
    digest.zeroize();
    key
}

/// Current derivation: PBKDF2-HMAC-SHA256, [`PBKDF2_ITERATIONS`] rounds
pub fn derive_pbkdf2(passphrase: &str, salt: &[u8]) -> CipherKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    let derived = CipherKey::from_bytes(key);
    key.zeroize();
    derived
}

/// Generate `len` random bytes for use as a salt or IV
///
/// Uses the operating system's secure generator. If that fails the bytes
/// come from a time-seeded generator instead and a warning is logged.
pub fn generate_salt(len: usize) -> Vec<u8> {
    let mut salt = vec![0u8; len];
    if len > 0 {
        fill_random(&mut salt);
    }
    salt
}

/// Fill `buf` from the secure generator, falling back as [`generate_salt`]
pub fn fill_random(buf: &mut [u8]) {
    if let Err(e) = OsRng.try_fill_bytes(buf) {
        log::warn!("Secure random generator unavailable ({}), using fallback", e);
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        StdRng::seed_from_u64(seed ^ std::process::id() as u64).fill_bytes(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_iterated_golden() {
        let key = derive_sha256_iterated("sesame", &[]);
        assert_eq!(
            hex::encode(key.as_bytes()),
            "ef39f83b5a4ef7b0560fb2407bb5bd70c6795b5e7f0d785fbc02177bbf2becbf"
        );
    }

    #[test]
    fn test_sha256_iterated_ignores_salt() {
        let key1 = derive_sha256_iterated("sesame", &[]);
        let key2 = derive_sha256_iterated("sesame", b"pepper");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_pbkdf2_golden() {
        let key = derive_pbkdf2("sesame", b"salt");
        assert_eq!(
            hex::encode(key.as_bytes()),
            "9f81363728eff8c59f78b0f08eec38e351e00ce9eab68fe72ef90984dfa57da6"
        );
    }

    #[test]
    fn test_same_passphrase_same_key() {
        let salt = generate_salt(SALT_SIZE);
        let key1 = derive_pbkdf2("test_passphrase", &salt);
        let key2 = derive_pbkdf2("test_passphrase", &salt);
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let key1 = derive_sha256_iterated("passphrase1", &[]);
        let key2 = derive_sha256_iterated("passphrase2", &[]);
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_generate_salt_lengths() {
        assert!(generate_salt(0).is_empty());
        let salt1 = generate_salt(SALT_SIZE);
        let salt2 = generate_salt(SALT_SIZE);
        assert_eq!(salt1.len(), SALT_SIZE);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_debug_hides_key() {
        let key = CipherKey::from_bytes([0xab; KEY_SIZE]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("CipherKey"));
        assert!(!debug.contains("ab"));
        assert!(!debug.contains("171"));
    }
}
