//! Cipher block chaining over [`Aes256`]
//!
//! Turns the block cipher into a byte-stream cipher. Input is accumulated
//! until a whole block is available; the final block is padded with `n`
//! copies of the byte `n` (1..=16), so block-aligned input gains a full
//! padding block.
//!
//! Decryption holds back the most recently decrypted block, because only
//! once the stream ends is it known whether that block carries padding.

use std::io::{self, Write};

use zeroize::Zeroize;

use super::aes256::{Aes256, Block, BLOCK_SIZE};
use super::key_derivation::CipherKey;
use crate::error::{KeycaskError, KeycaskResult};

/// CBC state for one in-order stream
///
/// An instance either encrypts or decrypts; it is consumed by the matching
/// `finish_*` call.
pub struct Cbc {
    cipher: Aes256,
    /// Chain value: the IV, then the last ciphertext block
    current: Block,
    /// Partial block waiting for more input
    overflow: Block,
    overflow_used: usize,
    /// Last decrypted block, not yet emitted
    held: Block,
    held_used: bool,
}

impl Cbc {
    /// Create a chaining state from a key and an initialization vector
    pub fn new(key: &CipherKey, iv: Block) -> Self {
        Self {
            cipher: Aes256::new(key.as_bytes()),
            current: iv,
            overflow: [0; BLOCK_SIZE],
            overflow_used: 0,
            held: [0; BLOCK_SIZE],
            held_used: false,
        }
    }

    /// The current chain value
    pub fn chain_state(&self) -> &Block {
        &self.current
    }

    /// Encrypt `data`, writing every completed ciphertext block to `out`
    pub fn encrypt<W: Write + ?Sized>(&mut self, data: &[u8], out: &mut W) -> io::Result<()> {
        for &byte in data {
            self.overflow[self.overflow_used] = byte;
            self.overflow_used += 1;
            if self.overflow_used == BLOCK_SIZE {
                self.encrypt_overflow();
                out.write_all(&self.current)?;
            }
        }
        Ok(())
    }

    /// Pad the remaining input, encrypt it and write the final block
    pub fn finish_encryption<W: Write + ?Sized>(mut self, out: &mut W) -> io::Result<()> {
        let pad = (BLOCK_SIZE - self.overflow_used) as u8;
        for byte in &mut self.overflow[self.overflow_used..] {
            *byte = pad;
        }
        self.overflow_used = BLOCK_SIZE;
        self.encrypt_overflow();
        out.write_all(&self.current)
    }

    /// Decrypt `data`, writing plaintext that is known not to be the last
    /// block to `out`
    pub fn decrypt<W: Write + ?Sized>(&mut self, data: &[u8], out: &mut W) -> io::Result<()> {
        for &byte in data {
            self.overflow[self.overflow_used] = byte;
            self.overflow_used += 1;
            if self.overflow_used == BLOCK_SIZE {
                if self.held_used {
                    out.write_all(&self.held)?;
                }
                self.decrypt_overflow();
                self.held_used = true;
            }
        }
        Ok(())
    }

    /// Validate and strip padding from the held block and write what is left
    ///
    /// Fails with [`KeycaskError::Decrypt`] when the stream ended inside a
    /// block or the padding value is outside 1..=16. An empty stream
    /// finishes without output.
    pub fn finish_decryption<W: Write + ?Sized>(self, out: &mut W) -> KeycaskResult<()> {
        if self.overflow_used != 0 {
            return Err(KeycaskError::Decrypt(format!(
                "stream ends with {} bytes of an incomplete block",
                self.overflow_used
            )));
        }
        if !self.held_used {
            return Ok(());
        }

        let pad = self.held[BLOCK_SIZE - 1] as usize;
        if pad == 0 || pad > BLOCK_SIZE {
            return Err(KeycaskError::Decrypt("invalid padding".to_string()));
        }

        let left = BLOCK_SIZE - pad;
        if left > 0 {
            out.write_all(&self.held[..left])?;
        }
        Ok(())
    }

    fn encrypt_overflow(&mut self) {
        for (chain, byte) in self.current.iter_mut().zip(self.overflow.iter()) {
            *chain ^= byte;
        }
        self.cipher.encrypt_block(&mut self.current);
        self.overflow_used = 0;
    }

    fn decrypt_overflow(&mut self) {
        let ciphertext = self.overflow;
        let mut block = ciphertext;
        self.cipher.decrypt_block(&mut block);
        for (plain, (decrypted, chain)) in self
            .held
            .iter_mut()
            .zip(block.iter().zip(self.current.iter()))
        {
            *plain = decrypted ^ chain;
        }
        self.current = ciphertext;
        self.overflow_used = 0;
        block.zeroize();
    }
}

impl Drop for Cbc {
    fn drop(&mut self) {
        self.current.zeroize();
        self.overflow.zeroize();
        self.held.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};

    fn encrypt_all(key: &CipherKey, iv: Block, plain: &[u8]) -> Vec<u8> {
        let mut cbc = Cbc::new(key, iv);
        let mut out = Vec::new();
        cbc.encrypt(plain, &mut out).unwrap();
        cbc.finish_encryption(&mut out).unwrap();
        out
    }

    fn decrypt_all(key: &CipherKey, iv: Block, ciphertext: &[u8]) -> KeycaskResult<Vec<u8>> {
        let mut cbc = Cbc::new(key, iv);
        let mut out = Vec::new();
        cbc.decrypt(ciphertext, &mut out)?;
        cbc.finish_decryption(&mut out)?;
        Ok(out)
    }

    fn random_key_and_iv() -> (CipherKey, Block) {
        let mut rng = rand::thread_rng();
        let mut key = [0u8; 32];
        let mut iv = [0u8; BLOCK_SIZE];
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut iv);
        (CipherKey::from_bytes(key), iv)
    }

    #[test]
    fn test_small_message() {
        let key = CipherKey::from_bytes([0; 32]);
        let source = b"abcdefg";
        let encrypted = encrypt_all(&key, [0; BLOCK_SIZE], source);
        assert_eq!(encrypted.len(), BLOCK_SIZE);
        let decrypted = decrypt_all(&key, [0; BLOCK_SIZE], &encrypted).unwrap();
        assert_eq!(decrypted, source);
    }

    #[test]
    fn test_big_message_fed_in_pieces() {
        let key = CipherKey::from_bytes([0; 32]);
        let mut cbc = Cbc::new(&key, [0; BLOCK_SIZE]);
        let mut encrypted = Vec::new();
        for _ in 0..1000 {
            cbc.encrypt(&[0x81, 0x81, 0x81], &mut encrypted).unwrap();
        }
        cbc.finish_encryption(&mut encrypted).unwrap();

        let decrypted = decrypt_all(&key, [0; BLOCK_SIZE], &encrypted).unwrap();
        assert_eq!(decrypted.len(), 3000);
        assert!(decrypted.iter().all(|&b| b == 0x81));
    }

    #[test]
    fn test_reference_vector() {
        let key = CipherKey::from_bytes(
            hex::decode("976d7164e6e3b7aab530dd52e729193ad7e7dfd761f186a44bb7fadf15441431")
                .unwrap()
                .try_into()
                .unwrap(),
        );
        let iv: Block = hex::decode("51a0c61967b0e0e5cf46b4d14c834c38")
            .unwrap()
            .try_into()
            .unwrap();
        let plain = b"abcdef\n";

        let encrypted = encrypt_all(&key, iv, plain);
        assert_eq!(hex::encode(&encrypted), "33d70a5ab7fecf924f397083d0fcfe3a");
        assert_eq!(decrypt_all(&key, iv, &encrypted).unwrap(), plain);
    }

    #[test]
    fn test_random_messages_round_trip() {
        let mut rng = rand::thread_rng();
        for len in (0..=80).chain([255, 256, 1000, 2048]) {
            let (key, iv) = random_key_and_iv();
            let mut plain = vec![0u8; len];
            rng.fill_bytes(&mut plain);

            let encrypted = encrypt_all(&key, iv, &plain);
            assert_eq!(encrypted.len(), (len / BLOCK_SIZE + 1) * BLOCK_SIZE);
            assert_eq!(decrypt_all(&key, iv, &encrypted).unwrap(), plain);
        }
    }

    #[test]
    fn test_aligned_input_gets_full_pad_block() {
        let (key, iv) = random_key_and_iv();
        let encrypted = encrypt_all(&key, iv, &[7u8; 32]);
        assert_eq!(encrypted.len(), 48);

        // Decrypt without finishing: the pad block is the held block
        let mut cbc = Cbc::new(&key, iv);
        let mut out = Vec::new();
        cbc.decrypt(&encrypted, &mut out).unwrap();
        assert_eq!(out, vec![7u8; 32]);
        assert_eq!(cbc.held, [BLOCK_SIZE as u8; BLOCK_SIZE]);
    }

    #[test]
    fn test_empty_message_is_one_pad_block() {
        let (key, iv) = random_key_and_iv();
        let encrypted = encrypt_all(&key, iv, &[]);
        assert_eq!(encrypted.len(), BLOCK_SIZE);
        assert!(decrypt_all(&key, iv, &encrypted).unwrap().is_empty());
    }

    #[test]
    fn test_empty_ciphertext_finishes_without_output() {
        let (key, iv) = random_key_and_iv();
        assert!(decrypt_all(&key, iv, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_chain_state_tracks_last_ciphertext_block() {
        let (key, iv) = random_key_and_iv();
        let mut cbc = Cbc::new(&key, iv);
        assert_eq!(cbc.chain_state(), &iv);

        let mut out = Vec::new();
        cbc.encrypt(&[1u8; 40], &mut out).unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(cbc.chain_state(), &out[16..32]);

        let mut decryptor = Cbc::new(&key, iv);
        decryptor.decrypt(&out[..16], &mut Vec::<u8>::new()).unwrap();
        assert_eq!(decryptor.chain_state(), &out[..16]);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let (key, iv) = random_key_and_iv();
        let encrypted = encrypt_all(&key, iv, b"some secret text");
        let err = decrypt_all(&key, iv, &encrypted[..encrypted.len() - 1]).unwrap_err();
        assert!(err.is_decrypt());
    }

    #[test]
    fn test_invalid_pad_values_fail() {
        let (key, iv) = random_key_and_iv();
        let plain = b"Don't tell Marge";
        let encrypted = encrypt_all(&key, iv, plain);
        let last_block = encrypted.len() - BLOCK_SIZE;

        // Flipping a byte of the previous ciphertext block flips the same
        // byte of the final plaintext block, which holds the pad value.
        let original_pad = BLOCK_SIZE as u8;
        for bad_pad in [0u8, 17, 0x80, 0xff] {
            let mut corrupted = encrypted.clone();
            corrupted[last_block - 1] ^= original_pad ^ bad_pad;
            let err = decrypt_all(&key, iv, &corrupted).unwrap_err();
            assert!(err.is_decrypt(), "pad {bad_pad} accepted");
        }
    }

    #[test]
    fn test_wrong_key_never_returns_plaintext() {
        let mut rng = rand::thread_rng();
        let (key, iv) = random_key_and_iv();
        let plain: Vec<u8> = (0..100).map(|_| rng.gen()).collect();
        let encrypted = encrypt_all(&key, iv, &plain);

        let (wrong_key, _) = random_key_and_iv();
        match decrypt_all(&wrong_key, iv, &encrypted) {
            Ok(decrypted) => assert_ne!(decrypted, plain),
            Err(err) => assert!(err.is_decrypt()),
        }
    }
}
