//! Document open/save pipeline
//!
//! Saving runs the collection through the codec, gzip, the cipher stream and
//! the envelope header into a temporary file that replaces the document
//! once everything is on disk:
//!
//! ```text
//! codec -> GzEncoder -> CryptWriter -> header -> BufWriter<File>
//! ```
//!
//! Opening runs the same chain backwards. Without a passphrase the envelope
//! and cipher layers are skipped entirely; that mode exists for plaintext
//! export and import.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::codec::{DocumentCodec, JsonCodec, SerializationFormat};
use super::file_io::write_atomic;
use crate::crypto::{CryptReader, CryptWriter, SecureString};
use crate::error::{KeycaskError, KeycaskResult};
use crate::format::envelope;
use crate::format::version::{self, FileVersion};
use crate::models::EntryCollection;

/// Default gzip level
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Reads and writes one document file
pub struct DocumentRepository {
    path: PathBuf,
    passphrase: Option<SecureString>,
    codec: Box<dyn DocumentCodec>,
    compression: Compression,
}

impl DocumentRepository {
    /// Unencrypted JSON document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            passphrase: None,
            codec: Box::new(JsonCodec),
            compression: Compression::new(DEFAULT_COMPRESSION_LEVEL),
        }
    }

    /// Encrypt with a key derived from `passphrase`
    pub fn with_passphrase(mut self, passphrase: impl Into<SecureString>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Use a different payload codec
    pub fn with_codec(mut self, codec: Box<dyn DocumentCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Set the gzip level (0-9)
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Path of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the document is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Read the document
    pub fn open(&self) -> KeycaskResult<EntryCollection> {
        log::debug!("Opening document {}", self.path.display());

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeycaskError::FileNotFound(self.path.clone()));
            }
            Err(e) => return Err(pipeline_error(e.into())),
        };
        let reader = BufReader::new(file);

        let result = match &self.passphrase {
            Some(passphrase) => self.read_encrypted(reader, passphrase),
            None => self.decode(reader),
        };

        let entries = result.map_err(pipeline_error)?;
        log::debug!("Opened document with {} entries", entries.len());
        Ok(entries)
    }

    /// Write the document with the newest file format version
    pub fn save(&self, entries: &EntryCollection) -> KeycaskResult<()> {
        self.save_with_version(entries, version::latest())
    }

    /// Write the document with a specific file format version
    pub(crate) fn save_with_version(
        &self,
        entries: &EntryCollection,
        version: &'static FileVersion,
    ) -> KeycaskResult<()> {
        log::debug!("Saving {} entries to {}", entries.len(), self.path.display());

        write_atomic(&self.path, |file| {
            let writer = BufWriter::new(file);
            let writer = match &self.passphrase {
                Some(passphrase) => self.write_encrypted(writer, passphrase, entries, version)?,
                None => self.encode(writer, entries)?,
            };
            writer
                .into_inner()
                .map_err(|e| KeycaskError::from(e.into_error()))
        })
        .map_err(pipeline_error)
    }

    /// Write a file in the layout used before the envelope header existed
    #[cfg(test)]
    pub(crate) fn write_legacy_headerless(&self, entries: &EntryCollection) -> KeycaskResult<()> {
        let passphrase = self
            .passphrase
            .as_ref()
            .ok_or_else(|| KeycaskError::Config("legacy files are always encrypted".into()))?;
        let key = version::legacy().derive_key(passphrase, &[]);

        write_atomic(&self.path, |file| {
            let crypt = CryptWriter::new(file, &key)?;
            let crypt = self.encode(crypt, entries)?;
            Ok(crypt.finish()?)
        })
    }

    fn read_encrypted<R: Read + Seek>(
        &self,
        mut reader: R,
        passphrase: &str,
    ) -> KeycaskResult<EntryCollection> {
        let header = envelope::read_header(&mut reader)?;
        let key = header.derive_key(passphrase);
        let mut crypt = CryptReader::new(reader, &key)?;

        let decoded = self.decode(&mut crypt);

        // Drain the cipher stream so its padding is always checked, even if
        // the payload parser stopped early.
        let drained = io::copy(&mut crypt, &mut io::sink()).map_err(KeycaskError::from);

        match (decoded, drained) {
            (_, Err(e)) if e.is_decrypt() => Err(e),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok(entries), Ok(_)) => Ok(entries),
        }
    }

    fn write_encrypted<W: Write>(
        &self,
        mut writer: W,
        passphrase: &str,
        entries: &EntryCollection,
        version: &'static FileVersion,
    ) -> KeycaskResult<W> {
        let header = envelope::write_header(&mut writer, version)?;
        let key = header.derive_key(passphrase);
        let crypt = CryptWriter::new(writer, &key)?;
        let crypt = self.encode(crypt, entries)?;
        Ok(crypt.finish()?)
    }

    /// Decompress and parse a payload stream
    ///
    /// The payload is parsed in the format it was written in, which may
    /// differ from the configured codec.
    fn decode<R: Read>(&self, reader: R) -> KeycaskResult<EntryCollection> {
        let mut gz = BufReader::new(GzDecoder::new(reader));
        let configured = self.codec.format();
        let detected = SerializationFormat::detect(gz.fill_buf()?).unwrap_or(configured);

        let entries = if detected == configured {
            self.codec.read(&mut gz)?
        } else {
            log::debug!("Payload is {}, configured codec is {}", detected, configured);
            detected.codec().read(&mut gz)?
        };
        // Reach the gzip trailer so its checksum is verified
        io::copy(&mut gz, &mut io::sink())?;
        Ok(entries)
    }

    /// Serialize and compress into `writer`, returning it once the gzip
    /// trailer is written
    fn encode<W: Write>(&self, writer: W, entries: &EntryCollection) -> KeycaskResult<W> {
        let mut gz = GzEncoder::new(writer, self.compression);
        self.codec.write(entries, &mut gz)?;
        Ok(gz.finish()?)
    }
}

/// Keep the errors a caller can act on, fold everything else into one
fn pipeline_error(err: KeycaskError) -> KeycaskError {
    match err {
        KeycaskError::FileNotFound(_)
        | KeycaskError::UnsupportedVersion(_)
        | KeycaskError::Format(_)
        | KeycaskError::Decrypt(_)
        | KeycaskError::Duplicate { .. }
        | KeycaskError::DocumentProcess(_) => err,
        other => {
            log::debug!("Document pipeline failed: {}", other);
            KeycaskError::document_process(other.to_string())
        }
    }
}
