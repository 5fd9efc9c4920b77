//! Binary encoding primitives
//!
//! Little-endian base-128 varints and a bounds-checked reader for the
//! consensus binary formats.

use thiserror::Error;

use crate::crypto::{Hash, PublicKey, Signature};

/// Serialization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEof(usize),
    #[error("Varint overflows 64 bits at offset {0}")]
    VarintOverflow(usize),
    #[error("Varint at offset {0} is not minimally encoded")]
    NonCanonicalVarint(usize),
    #[error("Value {value} does not fit in {target}")]
    OutOfRange { value: u64, target: &'static str },
    #[error("Unknown input tag 0x{0:02x}")]
    UnknownInputTag(u8),
    #[error("Unknown output tag 0x{0:02x}")]
    UnknownOutputTag(u8),
    #[error("{0} trailing bytes after object")]
    TrailingBytes(usize),
}

/// Append a varint to a buffer
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Encoded length of a varint
pub fn varint_size(mut value: u64) -> usize {
    let mut size = 1;
    while value >= 0x80 {
        value >>= 7;
        size += 1;
    }
    size
}

/// Cursor over a byte slice
#[derive(Debug)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8, SerializationError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(SerializationError::UnexpectedEof(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], SerializationError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(SerializationError::UnexpectedEof(self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerializationError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    pub fn read_varint(&mut self) -> Result<u64, SerializationError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift = 0u32;

        loop {
            let byte = self.read_u8()?;
            let bits = (byte & 0x7F) as u64;

            if shift == 63 && bits > 1 {
                return Err(SerializationError::VarintOverflow(start));
            }
            value |= bits << shift;

            if byte & 0x80 == 0 {
                if byte == 0 && shift > 0 {
                    return Err(SerializationError::NonCanonicalVarint(start));
                }
                return Ok(value);
            }

            shift += 7;
            if shift > 63 {
                return Err(SerializationError::VarintOverflow(start));
            }
        }
    }

    /// Read a varint that must fit in a narrower integer
    pub fn read_varint_as<T: TryFrom<u64>>(
        &mut self,
        target: &'static str,
    ) -> Result<T, SerializationError> {
        let value = self.read_varint()?;
        T::try_from(value).map_err(|_| SerializationError::OutOfRange { value, target })
    }

    pub fn read_hash(&mut self) -> Result<Hash, SerializationError> {
        Ok(Hash(self.read_array()?))
    }

    pub fn read_public_key(&mut self) -> Result<PublicKey, SerializationError> {
        Ok(PublicKey(self.read_array()?))
    }

    pub fn read_signature(&mut self) -> Result<Signature, SerializationError> {
        Ok(Signature(self.read_array()?))
    }

    /// Fail unless every byte was consumed
    pub fn finish(self) -> Result<(), SerializationError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(SerializationError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_known_encodings() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 0);
        write_varint(&mut buf, 127);
        write_varint(&mut buf, 128);
        write_varint(&mut buf, 300);
        assert_eq!(buf, vec![0x00, 0x7F, 0x80, 0x01, 0xAC, 0x02]);
    }

    #[test]
    fn test_varint_size_matches_encoding() {
        for value in [0u64, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.len(), varint_size(value));
        }
    }

    #[test]
    fn test_read_varint_max() {
        let mut buf = Vec::new();
        write_varint(&mut buf, u64::MAX);
        let mut reader = BinaryReader::new(&buf);
        assert_eq!(reader.read_varint().unwrap(), u64::MAX);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_read_varint_overflow() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        let mut reader = BinaryReader::new(&buf);
        assert_eq!(reader.read_varint(), Err(SerializationError::VarintOverflow(0)));
    }

    #[test]
    fn test_read_varint_non_canonical() {
        let buf = [0x80, 0x00];
        let mut reader = BinaryReader::new(&buf);
        assert_eq!(
            reader.read_varint(),
            Err(SerializationError::NonCanonicalVarint(0))
        );
    }

    #[test]
    fn test_truncated_input() {
        let mut reader = BinaryReader::new(&[0x80]);
        assert_eq!(reader.read_varint(), Err(SerializationError::UnexpectedEof(1)));

        let mut reader = BinaryReader::new(&[1, 2, 3]);
        assert!(reader.read_hash().is_err());
    }

    #[test]
    fn test_trailing_bytes_detected() {
        let mut reader = BinaryReader::new(&[1, 2]);
        reader.read_u8().unwrap();
        assert_eq!(reader.finish(), Err(SerializationError::TrailingBytes(1)));
    }

    #[test]
    fn test_read_varint_as_range() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 300);
        let mut reader = BinaryReader::new(&buf);
        assert!(reader.read_varint_as::<u8>("u8").is_err());
    }
}
