//! Cryptographic primitives for keycask
//!
//! AES-256 in CBC mode with block padding, exposed as `Read`/`Write`
//! adapters, plus the passphrase key derivation schemes used by the
//! file format versions.

pub mod aes256;
pub mod cbc;
pub mod key_derivation;
pub mod secure_memory;
pub mod stream;

pub use aes256::{Aes256, Block, BLOCK_SIZE, KEY_SIZE};
pub use cbc::Cbc;
pub use key_derivation::{derive_pbkdf2, derive_sha256_iterated, generate_salt, CipherKey};
pub use secure_memory::SecureString;
pub use stream::{CryptReader, CryptWriter};
