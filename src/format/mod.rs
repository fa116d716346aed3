//! On-disk container format
//!
//! The envelope header selects the key derivation for the cipher stream
//! that follows it.

pub mod envelope;
pub mod version;

pub use envelope::{read_header, read_header_strict, write_header, EnvelopeHeader, MAGIC};
pub use version::FileVersion;
