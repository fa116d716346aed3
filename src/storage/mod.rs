//! Storage layer for keycask
//!
//! Encrypted document files, the payload codecs inside them, and atomic
//! file output shared with the settings file.

pub mod codec;
pub mod document;
pub mod file_io;

pub use codec::{DocumentCodec, JsonCodec, SerializationFormat, YamlCodec};
pub use document::DocumentRepository;
pub use file_io::{read_json, write_atomic, write_json_atomic};
