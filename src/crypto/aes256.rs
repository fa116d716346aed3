//! AES-256 block cipher
//!
//! A from-scratch implementation of the FIPS-197 block cipher for 256-bit
//! keys: 14 rounds over a 16-byte state laid out column by column. Only the
//! single-block transform lives here; chaining and padding are handled by
//! [`super::cbc`].

use zeroize::Zeroize;

use crate::error::{KeycaskError, KeycaskResult};

/// Size of a cipher block in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Number of rounds for a 256-bit key
const ROUNDS: usize = 14;

/// Bytes per key schedule word
const WORD_SIZE: usize = 4;

/// Words in the cipher key (Nk)
const KEY_WORDS: usize = KEY_SIZE / WORD_SIZE;

/// One round key per round plus the initial whitening key
pub const EXPANDED_KEY_SIZE: usize = (ROUNDS + 1) * BLOCK_SIZE;

/// A single cipher block
pub type Block = [u8; BLOCK_SIZE];

/// Round constants for the key schedule, indexed by `i / KEY_WORDS`
const RCON: [u8; 8] = [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40];

/// Forward substitution table (FIPS-197, figure 7)
const S_BOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

/// Inverse substitution table (FIPS-197, figure 14)
const INV_S_BOX: [u8; 256] = [
    0x52, 0x09, 0x6a, 0xd5, 0x30, 0x36, 0xa5, 0x38, 0xbf, 0x40, 0xa3, 0x9e, 0x81, 0xf3, 0xd7, 0xfb,
    0x7c, 0xe3, 0x39, 0x82, 0x9b, 0x2f, 0xff, 0x87, 0x34, 0x8e, 0x43, 0x44, 0xc4, 0xde, 0xe9, 0xcb,
    0x54, 0x7b, 0x94, 0x32, 0xa6, 0xc2, 0x23, 0x3d, 0xee, 0x4c, 0x95, 0x0b, 0x42, 0xfa, 0xc3, 0x4e,
    0x08, 0x2e, 0xa1, 0x66, 0x28, 0xd9, 0x24, 0xb2, 0x76, 0x5b, 0xa2, 0x49, 0x6d, 0x8b, 0xd1, 0x25,
    0x72, 0xf8, 0xf6, 0x64, 0x86, 0x68, 0x98, 0x16, 0xd4, 0xa4, 0x5c, 0xcc, 0x5d, 0x65, 0xb6, 0x92,
    0x6c, 0x70, 0x48, 0x50, 0xfd, 0xed, 0xb9, 0xda, 0x5e, 0x15, 0x46, 0x57, 0xa7, 0x8d, 0x9d, 0x84,
    0x90, 0xd8, 0xab, 0x00, 0x8c, 0xbc, 0xd3, 0x0a, 0xf7, 0xe4, 0x58, 0x05, 0xb8, 0xb3, 0x45, 0x06,
    0xd0, 0x2c, 0x1e, 0x8f, 0xca, 0x3f, 0x0f, 0x02, 0xc1, 0xaf, 0xbd, 0x03, 0x01, 0x13, 0x8a, 0x6b,
    0x3a, 0x91, 0x11, 0x41, 0x4f, 0x67, 0xdc, 0xea, 0x97, 0xf2, 0xcf, 0xce, 0xf0, 0xb4, 0xe6, 0x73,
    0x96, 0xac, 0x74, 0x22, 0xe7, 0xad, 0x35, 0x85, 0xe2, 0xf9, 0x37, 0xe8, 0x1c, 0x75, 0xdf, 0x6e,
    0x47, 0xf1, 0x1a, 0x71, 0x1d, 0x29, 0xc5, 0x89, 0x6f, 0xb7, 0x62, 0x0e, 0xaa, 0x18, 0xbe, 0x1b,
    0xfc, 0x56, 0x3e, 0x4b, 0xc6, 0xd2, 0x79, 0x20, 0x9a, 0xdb, 0xc0, 0xfe, 0x78, 0xcd, 0x5a, 0xf4,
    0x1f, 0xdd, 0xa8, 0x33, 0x88, 0x07, 0xc7, 0x31, 0xb1, 0x12, 0x10, 0x59, 0x27, 0x80, 0xec, 0x5f,
    0x60, 0x51, 0x7f, 0xa9, 0x19, 0xb5, 0x4a, 0x0d, 0x2d, 0xe5, 0x7a, 0x9f, 0x93, 0xc9, 0x9c, 0xef,
    0xa0, 0xe0, 0x3b, 0x4d, 0xae, 0x2a, 0xf5, 0xb0, 0xc8, 0xeb, 0xbb, 0x3c, 0x83, 0x53, 0x99, 0x61,
    0x17, 0x2b, 0x04, 0x7e, 0xba, 0x77, 0xd6, 0x26, 0xe1, 0x69, 0x14, 0x63, 0x55, 0x21, 0x0c, 0x7d,
];

/// AES-256 cipher holding an expanded key
///
/// The key schedule is computed once in [`Aes256::new`] and never changes
/// afterwards, so one instance can transform any number of blocks.
pub struct Aes256 {
    expanded_key: [u8; EXPANDED_KEY_SIZE],
}

impl Aes256 {
    /// Create a cipher and expand the key into 15 round keys
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let mut expanded_key = [0u8; EXPANDED_KEY_SIZE];
        expanded_key[..KEY_SIZE].copy_from_slice(key);

        let mut temp = [0u8; WORD_SIZE];
        for word in KEY_WORDS..EXPANDED_KEY_SIZE / WORD_SIZE {
            let offset = word * WORD_SIZE;
            temp.copy_from_slice(&expanded_key[offset - WORD_SIZE..offset]);

            if word % KEY_WORDS == 0 {
                temp.rotate_left(1);
                sub_word(&mut temp);
                temp[0] ^= RCON[word / KEY_WORDS];
            } else if word % KEY_WORDS == WORD_SIZE {
                sub_word(&mut temp);
            }

            for i in 0..WORD_SIZE {
                expanded_key[offset + i] = expanded_key[offset - KEY_SIZE + i] ^ temp[i];
            }
        }
        temp.zeroize();

        Self { expanded_key }
    }

    /// Create a cipher from a key slice
    ///
    /// Any length other than 32 bytes is a programming error and is reported
    /// as [`KeycaskError::InvalidKeyLength`].
    pub fn from_slice(key: &[u8]) -> KeycaskResult<Self> {
        let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| KeycaskError::InvalidKeyLength {
            expected: KEY_SIZE,
            got: key.len(),
        })?;
        Ok(Self::new(key))
    }

    /// Encrypt one block in place
    pub fn encrypt_block(&self, block: &mut Block) {
        self.add_round_key(block, 0);
        for round in 1..ROUNDS {
            sub_bytes(block);
            shift_rows(block);
            mix_columns(block);
            self.add_round_key(block, round);
        }
        sub_bytes(block);
        shift_rows(block);
        self.add_round_key(block, ROUNDS);
    }

    /// Decrypt one block in place
    pub fn decrypt_block(&self, block: &mut Block) {
        self.add_round_key(block, ROUNDS);
        for round in (1..ROUNDS).rev() {
            inv_shift_rows(block);
            inv_sub_bytes(block);
            self.add_round_key(block, round);
            inv_mix_columns(block);
        }
        inv_shift_rows(block);
        inv_sub_bytes(block);
        self.add_round_key(block, 0);
    }

    fn add_round_key(&self, block: &mut Block, round: usize) {
        let round_key = &self.expanded_key[round * BLOCK_SIZE..(round + 1) * BLOCK_SIZE];
        for (byte, key) in block.iter_mut().zip(round_key) {
            *byte ^= key;
        }
    }
}

impl Drop for Aes256 {
    fn drop(&mut self) {
        self.expanded_key.zeroize();
    }
}

fn sub_word(word: &mut [u8; WORD_SIZE]) {
    for byte in word.iter_mut() {
        *byte = S_BOX[*byte as usize];
    }
}

fn sub_bytes(block: &mut Block) {
    for byte in block.iter_mut() {
        *byte = S_BOX[*byte as usize];
    }
}

fn inv_sub_bytes(block: &mut Block) {
    for byte in block.iter_mut() {
        *byte = INV_S_BOX[*byte as usize];
    }
}

// The state is stored column by column: byte (row, col) lives at
// `row + 4 * col`. Row r is rotated left by r positions.
fn shift_rows(block: &mut Block) {
    let state = *block;
    for row in 1..4 {
        for col in 0..4 {
            block[row + 4 * col] = state[row + 4 * ((col + row) % 4)];
        }
    }
}

fn inv_shift_rows(block: &mut Block) {
    let state = *block;
    for row in 1..4 {
        for col in 0..4 {
            block[row + 4 * col] = state[row + 4 * ((col + 4 - row) % 4)];
        }
    }
}

/// Multiply by x (i.e. {02}) in GF(2^8) modulo x^8 + x^4 + x^3 + x + 1
fn xtime(b: u8) -> u8 {
    let shifted = b << 1;
    if b & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

fn mix_columns(block: &mut Block) {
    for column in block.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        // {03}·a = {02}·a ^ a
        column[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
        column[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
        column[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
        column[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
    }
}

fn inv_mix_columns(block: &mut Block) {
    for column in block.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        column[0] = mul14(a0) ^ mul11(a1) ^ mul13(a2) ^ mul9(a3);
        column[1] = mul9(a0) ^ mul14(a1) ^ mul11(a2) ^ mul13(a3);
        column[2] = mul13(a0) ^ mul9(a1) ^ mul14(a2) ^ mul11(a3);
        column[3] = mul11(a0) ^ mul13(a1) ^ mul9(a2) ^ mul14(a3);
    }
}

/// {09}·b = {08}·b ^ b
fn mul9(b: u8) -> u8 {
    xtime(xtime(xtime(b))) ^ b
}

/// {0b}·b = {08}·b ^ {02}·b ^ b
fn mul11(b: u8) -> u8 {
    let b2 = xtime(b);
    xtime(xtime(b2)) ^ b2 ^ b
}

/// {0d}·b = {08}·b ^ {04}·b ^ b
fn mul13(b: u8) -> u8 {
    let b4 = xtime(xtime(b));
    xtime(b4) ^ b4 ^ b
}

/// {0e}·b = {08}·b ^ {04}·b ^ {02}·b
fn mul14(b: u8) -> u8 {
    let b2 = xtime(b);
    let b4 = xtime(b2);
    xtime(b4) ^ b4 ^ b2
}
