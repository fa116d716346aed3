//! Stream adapters around [`Cbc`]
//!
//! [`CryptWriter`] and [`CryptReader`] expose the chaining mode through the
//! standard `Write`/`Read` traits so it can be stacked between the envelope
//! and the compression layer. Each adapter owns the stream beneath it and
//! hands it back exactly once through `finish` / `into_inner`.
//!
//! The ciphertext stream starts with the 16-byte initialization vector.

use std::io::{self, Read, Write};

use zeroize::{Zeroize, Zeroizing};

use super::aes256::{Block, BLOCK_SIZE};
use super::cbc::Cbc;
use super::key_derivation::{fill_random, CipherKey};
use crate::error::KeycaskError;

/// Ciphertext fetched from the inner reader per refill
const FETCH_BUFFER_SIZE: usize = 4096;

/// Encrypting writer
pub struct CryptWriter<W: Write> {
    inner: W,
    cbc: Option<Cbc>,
}

impl<W: Write> CryptWriter<W> {
    /// Write a fresh random IV to `inner` and start encrypting
    pub fn new(inner: W, key: &CipherKey) -> io::Result<Self> {
        let mut iv = [0u8; BLOCK_SIZE];
        fill_random(&mut iv);
        Self::with_iv(inner, key, iv)
    }

    /// Write `iv` to `inner` and start encrypting
    pub fn with_iv(mut inner: W, key: &CipherKey, iv: Block) -> io::Result<Self> {
        inner.write_all(&iv)?;
        Ok(Self {
            inner,
            cbc: Some(Cbc::new(key, iv)),
        })
    }

    /// Write the padded final block, flush, and return the inner writer
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(cbc) = self.cbc.take() {
            cbc.finish_encryption(&mut self.inner)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for CryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let cbc = self
            .cbc
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "cipher stream already finished"))?;
        cbc.encrypt(buf, &mut self.inner)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Partial blocks stay buffered until finish
        self.inner.flush()
    }
}

/// Decrypting reader
pub struct CryptReader<R: Read> {
    inner: R,
    cbc: Option<Cbc>,
    fetch: Zeroizing<Vec<u8>>,
    /// Decrypted bytes not yet handed out
    plain: Zeroizing<Vec<u8>>,
    plain_pos: usize,
}

impl<R: Read> CryptReader<R> {
    /// Read the IV from `inner` and start decrypting
    ///
    /// A stream too short to hold an IV is a [`KeycaskError::Format`] error.
    pub fn new(mut inner: R, key: &CipherKey) -> Result<Self, KeycaskError> {
        let mut iv = [0u8; BLOCK_SIZE];
        inner.read_exact(&mut iv).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                KeycaskError::Format("no initialization vector in stream".to_string())
            }
            _ => KeycaskError::from(e),
        })?;
        Ok(Self::with_iv(inner, key, iv))
    }

    /// Start decrypting with a known IV; nothing is read from `inner` yet
    pub fn with_iv(inner: R, key: &CipherKey, iv: Block) -> Self {
        Self {
            inner,
            cbc: Some(Cbc::new(key, iv)),
            fetch: Zeroizing::new(vec![0; FETCH_BUFFER_SIZE]),
            plain: Zeroizing::new(Vec::with_capacity(FETCH_BUFFER_SIZE + BLOCK_SIZE)),
            plain_pos: 0,
        }
    }

    /// Give back the inner reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Refill `plain`; returns false once the stream is exhausted
    fn refill(&mut self) -> io::Result<bool> {
        self.plain.zeroize();
        self.plain_pos = 0;

        while self.plain.is_empty() {
            let Some(cbc) = self.cbc.as_mut() else {
                return Ok(false);
            };

            let read = match self.inner.read(self.fetch.as_mut_slice()) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if read == 0 {
                if let Some(cbc) = self.cbc.take() {
                    cbc.finish_decryption(&mut *self.plain)
                        .map_err(KeycaskError::into_io)?;
                }
            } else {
                cbc.decrypt(&self.fetch[..read], &mut *self.plain)?;
            }
        }
        Ok(true)
    }
}

impl<R: Read> Read for CryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.plain_pos >= self.plain.len() && !self.refill()? {
            return Ok(0);
        }
        let available = &self.plain[self.plain_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.plain_pos += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use std::io::Cursor;

    fn random_key() -> CipherKey {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        CipherKey::from_bytes(key)
    }

    fn encrypt(key: &CipherKey, plain: &[u8]) -> Vec<u8> {
        let mut writer = CryptWriter::new(Vec::new(), key).unwrap();
        writer.write_all(plain).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_random_message_round_trip() {
        let key = random_key();
        let mut plain = vec![0u8; 100];
        rand::thread_rng().fill_bytes(&mut plain);

        let encrypted = encrypt(&key, &plain);
        assert_eq!(encrypted.len(), BLOCK_SIZE + 112);

        let mut reader = CryptReader::new(Cursor::new(encrypted), &key).unwrap();
        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).unwrap();
        assert_eq!(decrypted, plain);
    }

    #[test]
    fn test_byte_by_byte_reads() {
        let key = random_key();
        let plain: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let encrypted = encrypt(&key, &plain);

        let mut reader = CryptReader::new(Cursor::new(encrypted), &key).unwrap();
        let mut decrypted = Vec::new();
        let mut byte = [0u8; 1];
        while reader.read(&mut byte).unwrap() == 1 {
            decrypted.push(byte[0]);
        }
        assert_eq!(decrypted, plain);
    }

    #[test]
    fn test_iv_is_written_first() {
        let key = random_key();
        let iv = [9u8; BLOCK_SIZE];
        let mut writer = CryptWriter::with_iv(Vec::new(), &key, iv).unwrap();
        writer.write_all(b"hello").unwrap();
        let encrypted = writer.finish().unwrap();
        assert_eq!(&encrypted[..BLOCK_SIZE], &iv);
        assert_eq!(encrypted.len(), 2 * BLOCK_SIZE);
    }

    #[test]
    fn test_missing_iv_is_format_error() {
        let key = random_key();
        let err = CryptReader::new(Cursor::new(vec![1u8; 5]), &key)
            .err()
            .unwrap();
        assert!(matches!(err, KeycaskError::Format(_)));
    }

    #[test]
    fn test_truncated_ciphertext_surfaces_decrypt_error() {
        let key = random_key();
        let mut encrypted = encrypt(&key, b"Duff Beer Webshop");
        encrypted.truncate(encrypted.len() - 3);

        let mut reader = CryptReader::new(Cursor::new(encrypted), &key).unwrap();
        let err = reader.read_to_end(&mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(KeycaskError::from(err).is_decrypt());
    }

    #[test]
    fn test_into_inner_returns_remaining_stream() {
        let key = random_key();
        let encrypted = encrypt(&key, b"x");
        let reader = CryptReader::new(Cursor::new(encrypted), &key).unwrap();
        let cursor = reader.into_inner();
        assert_eq!(cursor.position(), BLOCK_SIZE as u64);
    }
}
