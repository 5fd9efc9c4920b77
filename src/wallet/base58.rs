//! CryptoNote block Base58
//!
//! Data is split into 8-byte blocks, each encoded on its own to a fixed
//! width (11 characters for a full block) so the text length depends only
//! on the data length. Digits use the Bitcoin alphabet; per-block
//! conversion is delegated to `bs58`.

use thiserror::Error;

const FULL_BLOCK_SIZE: usize = 8;
const FULL_ENCODED_BLOCK_SIZE: usize = 11;

/// Encoded width of a block of `n` bytes, indexed by `n`
const ENCODED_BLOCK_SIZES: [usize; FULL_BLOCK_SIZE + 1] = [0, 2, 3, 5, 6, 7, 9, 10, 11];

/// The zero digit
const ZERO_DIGIT: char = '1';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Base58Error {
    #[error("Invalid encoded length {0}")]
    InvalidLength(usize),
    #[error("Invalid base58 block at offset {0}")]
    InvalidBlock(usize),
    #[error("Block at offset {0} overflows its size")]
    Overflow(usize),
}

/// Encode bytes block by block
pub fn encode(data: &[u8]) -> String {
    let full_blocks = data.len() / FULL_BLOCK_SIZE;
    let mut out = String::with_capacity(
        full_blocks * FULL_ENCODED_BLOCK_SIZE
            + ENCODED_BLOCK_SIZES[data.len() % FULL_BLOCK_SIZE],
    );

    for block in data.chunks(FULL_BLOCK_SIZE) {
        let width = ENCODED_BLOCK_SIZES[block.len()];
        let encoded = bs58::encode(block).into_string();
        let digits = encoded.trim_start_matches(ZERO_DIGIT);
        out.extend(std::iter::repeat(ZERO_DIGIT).take(width - digits.len()));
        out.push_str(digits);
    }
    out
}

/// Decode a block Base58 string
pub fn decode(text: &str) -> Result<Vec<u8>, Base58Error> {
    let last_block_width = text.len() % FULL_ENCODED_BLOCK_SIZE;
    if !ENCODED_BLOCK_SIZES.contains(&last_block_width) {
        return Err(Base58Error::InvalidLength(text.len()));
    }

    let mut out = Vec::with_capacity(text.len() / FULL_ENCODED_BLOCK_SIZE * FULL_BLOCK_SIZE + FULL_BLOCK_SIZE);
    for (i, chunk) in text.as_bytes().chunks(FULL_ENCODED_BLOCK_SIZE).enumerate() {
        let offset = i * FULL_ENCODED_BLOCK_SIZE;
        let size = ENCODED_BLOCK_SIZES
            .iter()
            .position(|width| *width == chunk.len())
            .ok_or(Base58Error::InvalidLength(text.len()))?;

        let chunk = std::str::from_utf8(chunk).map_err(|_| Base58Error::InvalidBlock(offset))?;
        let digits = chunk.trim_start_matches(ZERO_DIGIT);
        let decoded = if digits.is_empty() {
            Vec::new()
        } else {
            bs58::decode(digits)
                .into_vec()
                .map_err(|_| Base58Error::InvalidBlock(offset))?
        };

        if decoded.len() > size {
            return Err(Base58Error::Overflow(offset));
        }
        out.extend(std::iter::repeat(0u8).take(size - decoded.len()));
        out.extend_from_slice(&decoded);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_widths() {
        for len in 0..=32 {
            let data = vec![0xFFu8; len];
            let expected = len / 8 * 11 + ENCODED_BLOCK_SIZES[len % 8];
            assert_eq!(encode(&data).len(), expected);
        }
    }

    #[test]
    fn test_known_blocks() {
        assert_eq!(encode(&[0u8; 8]), "11111111111");
        assert_eq!(encode(&[0xFFu8; 8]), "jpXCZedGfVQ");
        assert_eq!(encode(&[0x00, 0x01]), "112");
        assert_eq!(decode("jpXCZedGfVQ").unwrap(), vec![0xFFu8; 8]);
    }

    #[test]
    fn test_leading_zeros_survive() {
        let data = [0u8, 0, 0, 1, 2, 3, 0, 0, 0, 9];
        assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    #[test]
    fn test_invalid_length() {
        // 1, 4 and 8 are not widths of any block
        assert_eq!(decode("1"), Err(Base58Error::InvalidLength(1)));
        assert_eq!(decode("1111"), Err(Base58Error::InvalidLength(4)));
        assert_eq!(decode(&"1".repeat(19)), Err(Base58Error::InvalidLength(19)));
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(decode("0O"), Err(Base58Error::InvalidBlock(0)));
    }

    #[test]
    fn test_block_overflow() {
        // 2^64 does not fit a full block; "zz" exceeds a one-byte block
        assert_eq!(decode("jpXCZedGfVR"), Err(Base58Error::Overflow(0)));
        assert_eq!(decode("zz"), Err(Base58Error::Overflow(0)));
    }
}
