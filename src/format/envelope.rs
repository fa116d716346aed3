//! Versioned container header
//!
//! ```text
//! [magic 9][version 1][salt 0|16][IV 16][cipher blocks...]
//! ```
//!
//! Files written before the header existed start straight with the IV.
//! [`read_header`] detects them by the missing magic and rewinds.
//!
//! Only [`MAGIC`] is recognised. Containers from other tools that use a
//! different identifier with the same layout are not readable; they are
//! taken for headerless files and fail to decrypt.

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::version::{self, FileVersion};
use crate::crypto::key_derivation::generate_salt;
use crate::crypto::CipherKey;
use crate::error::{KeycaskError, KeycaskResult};

/// Leading bytes of every enveloped file: "KCASK" and a lock symbol
pub const MAGIC: &[u8; 9] = b"KCASK\xF0\x9F\x94\x92";

/// Parsed or freshly written header
#[derive(Debug, Clone)]
pub struct EnvelopeHeader {
    pub version: &'static FileVersion,
    pub salt: Vec<u8>,
    /// True when the file had no header at all
    pub headerless: bool,
}

impl EnvelopeHeader {
    /// Derive the cipher key this header calls for
    pub fn derive_key(&self, passphrase: &str) -> CipherKey {
        self.version.derive_key(passphrase, &self.salt)
    }
}

/// Read the header, falling back to the headerless layout on a magic mismatch
pub fn read_header<R: Read + Seek>(reader: &mut R) -> KeycaskResult<EnvelopeHeader> {
    let start = reader.stream_position()?;

    let mut prefix = [0u8; MAGIC.len() + 1];
    let filled = read_fully(reader, &mut prefix)?;
    if filled < MAGIC.len() || &prefix[..MAGIC.len()] != MAGIC {
        log::debug!("No envelope magic, reading as headerless legacy file");
        reader.seek(SeekFrom::Start(start))?;
        return Ok(EnvelopeHeader {
            version: version::legacy(),
            salt: Vec::new(),
            headerless: true,
        });
    }
    if filled < prefix.len() {
        return Err(KeycaskError::Format("missing version byte".into()));
    }

    read_after_magic(reader, prefix[MAGIC.len()])
}

/// Read the header from a stream that cannot rewind
///
/// A magic mismatch is a [`KeycaskError::Format`] error here.
pub fn read_header_strict<R: Read>(reader: &mut R) -> KeycaskResult<EnvelopeHeader> {
    let mut prefix = [0u8; MAGIC.len() + 1];
    let filled = read_fully(reader, &mut prefix)?;
    if filled < MAGIC.len() || &prefix[..MAGIC.len()] != MAGIC {
        return Err(KeycaskError::Format("magic mismatch".into()));
    }
    if filled < prefix.len() {
        return Err(KeycaskError::Format("missing version byte".into()));
    }
    read_after_magic(reader, prefix[MAGIC.len()])
}

fn read_after_magic<R: Read>(reader: &mut R, number: u8) -> KeycaskResult<EnvelopeHeader> {
    let version = version::lookup(number)?;
    let mut salt = vec![0u8; version.salt_len];
    if read_fully(reader, &mut salt)? < salt.len() {
        return Err(KeycaskError::Format("truncated salt".into()));
    }
    log::debug!("Envelope version {}", version.number);
    Ok(EnvelopeHeader {
        version,
        salt,
        headerless: false,
    })
}

/// Write magic, version byte and a fresh salt for `version`
pub fn write_header<W: Write>(
    writer: &mut W,
    version: &'static FileVersion,
) -> KeycaskResult<EnvelopeHeader> {
    let salt = generate_salt(version.salt_len);
    writer.write_all(MAGIC)?;
    writer.write_all(&[version.number])?;
    writer.write_all(&salt)?;
    log::debug!("Wrote envelope version {}", version.number);
    Ok(EnvelopeHeader {
        version,
        salt,
        headerless: false,
    })
}

/// Read until `buf` is full or the stream ends; returns the bytes read
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_magic_layout() {
        assert_eq!(&MAGIC[..5], b"KCASK");
        assert_eq!(std::str::from_utf8(&MAGIC[5..]).unwrap(), "\u{1F512}");
    }

    #[test]
    fn test_write_then_read() {
        let mut buf = Vec::new();
        let written = write_header(&mut buf, version::latest()).unwrap();
        assert_eq!(buf.len(), MAGIC.len() + 1 + 16);
        buf.extend_from_slice(b"payload");

        let mut cursor = Cursor::new(buf);
        let read = read_header(&mut cursor).unwrap();
        assert_eq!(read.version.number, 1);
        assert_eq!(read.salt, written.salt);
        assert!(!read.headerless);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"payload");
    }

    #[test]
    fn test_v0_header_has_no_salt() {
        let mut buf = Vec::new();
        write_header(&mut buf, version::legacy()).unwrap();
        assert_eq!(buf.len(), MAGIC.len() + 1);
        let header = read_header(&mut Cursor::new(buf)).unwrap();
        assert_eq!(header.version.number, 0);
        assert!(header.salt.is_empty());
    }

    #[test]
    fn test_headerless_rewinds() {
        let data = vec![0x42u8; 48];
        let mut cursor = Cursor::new(data);
        let header = read_header(&mut cursor).unwrap();
        assert!(header.headerless);
        assert_eq!(header.version.number, 0);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_foreign_identifier_not_recognised() {
        let mut data = b"OTHER\xF0\x9F\x94\x92".to_vec();
        data.push(1);
        data.extend_from_slice(&[0u8; 48]);

        let header = read_header(&mut Cursor::new(data.clone())).unwrap();
        assert!(header.headerless);

        let err = read_header_strict(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, KeycaskError::Format(_)));
    }

    #[test]
    fn test_rewind_to_non_zero_start() {
        let mut data = b"junk".to_vec();
        data.extend_from_slice(&[7u8; 32]);
        let mut cursor = Cursor::new(data);
        cursor.set_position(4);
        let header = read_header(&mut cursor).unwrap();
        assert!(header.headerless);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_unknown_version() {
        let mut data = MAGIC.to_vec();
        data.push(9);
        let err = read_header(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, KeycaskError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_truncated_salt() {
        let mut data = MAGIC.to_vec();
        data.push(1);
        data.extend_from_slice(&[1, 2, 3]);
        let err = read_header(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, KeycaskError::Format(_)));
    }

    #[test]
    fn test_missing_version_byte() {
        let err = read_header(&mut Cursor::new(MAGIC.to_vec())).unwrap_err();
        assert!(matches!(err, KeycaskError::Format(_)));
    }

    #[test]
    fn test_strict_magic_mismatch() {
        let err = read_header_strict(&mut &[0u8; 40][..]).unwrap_err();
        assert!(matches!(err, KeycaskError::Format(_)));
    }

    #[test]
    fn test_strict_accepts_envelope() {
        let mut buf = Vec::new();
        write_header(&mut buf, version::latest()).unwrap();
        let header = read_header_strict(&mut buf.as_slice()).unwrap();
        assert_eq!(header.version.number, 1);
    }

    #[test]
    fn test_salts_are_fresh() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        let ha = write_header(&mut a, version::latest()).unwrap();
        let hb = write_header(&mut b, version::latest()).unwrap();
        assert_ne!(ha.salt, hb.salt);
    }
}
