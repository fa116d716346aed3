//! Structured serialization of entry collections
//!
//! The document pipeline only sees a byte stream; a [`DocumentCodec`]
//! decides how the collection is laid out inside it.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::KeycaskResult;
use crate::models::entries::RawCollection;
use crate::models::EntryCollection;

/// Writes and reads an [`EntryCollection`] over a stream
pub trait DocumentCodec {
    /// Serialize `entries` into `writer`
    fn write(&self, entries: &EntryCollection, writer: &mut dyn Write) -> KeycaskResult<()>;

    /// Deserialize a collection from `reader`
    ///
    /// Duplicate titles are reported as [`crate::KeycaskError::Duplicate`].
    fn read(&self, reader: &mut dyn Read) -> KeycaskResult<EntryCollection>;

    /// The payload format this codec writes
    fn format(&self) -> SerializationFormat;
}

/// JSON payload (`serde_json`)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn write(&self, entries: &EntryCollection, writer: &mut dyn Write) -> KeycaskResult<()> {
        serde_json::to_writer(writer, entries)?;
        Ok(())
    }

    fn read(&self, reader: &mut dyn Read) -> KeycaskResult<EntryCollection> {
        let raw: RawCollection = serde_json::from_reader(reader)?;
        raw.into_collection()
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Json
    }
}

/// YAML payload (`serde_yaml`)
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn write(&self, entries: &EntryCollection, writer: &mut dyn Write) -> KeycaskResult<()> {
        serde_yaml::to_writer(writer, entries)?;
        Ok(())
    }

    fn read(&self, reader: &mut dyn Read) -> KeycaskResult<EntryCollection> {
        // serde_yaml parses from a complete document
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        let raw: RawCollection = serde_yaml::from_str(&buf)?;
        raw.into_collection()
    }

    fn format(&self) -> SerializationFormat {
        SerializationFormat::Yaml
    }
}

/// Payload formats selectable from settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    #[default]
    Json,
    Yaml,
}

impl SerializationFormat {
    /// Build the codec for this format
    pub fn codec(self) -> Box<dyn DocumentCodec> {
        match self {
            Self::Json => Box::new(JsonCodec),
            Self::Yaml => Box::new(YamlCodec),
        }
    }

    /// Guess the format of a payload from its first bytes
    ///
    /// A JSON document starts with `{` after optional whitespace; anything
    /// else non-blank is taken as YAML. Returns `None` when `prefix` holds
    /// only whitespace.
    pub fn detect(prefix: &[u8]) -> Option<Self> {
        let first = prefix.iter().find(|b| !b.is_ascii_whitespace())?;
        match first {
            b'{' => Some(Self::Json),
            _ => Some(Self::Yaml),
        }
    }
}

impl std::fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}
