//! Piece bitfield.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, TransmissionError};

/// Bitfield with the most significant bit of the first byte as bit 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitMap(Vec<u8>);

impl BitMap {
    /// Wraps raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decodes the base64 form used by the `pieces` field.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| TransmissionError::protocol("invalid base64 bitfield").with_source(e))
    }

    /// Bit `index`; `false` past the end.
    pub fn get(&self, index: usize) -> bool {
        self.0
            .get(index / 8)
            .is_some_and(|byte| (byte >> (7 - index % 8)) & 1 == 1)
    }

    /// Number of bits held.
    pub fn len(&self) -> usize {
        self.0.len() * 8
    }

    /// Whether no bits are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.0.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_bit_is_msb() {
        let bitmap = BitMap::new(vec![0x80]);
        assert!(bitmap.get(0));
        assert!(!bitmap.get(1));
        assert!(!bitmap.get(8));
    }

    #[test]
    fn test_second_byte() {
        let bitmap = BitMap::new(vec![0x00, 0x01]);
        assert!(bitmap.get(15));
        assert!(!bitmap.get(14));
        assert_eq!(bitmap.count_ones(), 1);
        assert_eq!(bitmap.len(), 16);
    }

    #[test]
    fn test_from_base64() {
        // "gA==" is 0x80
        let bitmap = BitMap::from_base64("gA==").unwrap();
        assert!(bitmap.get(0));
        assert!(BitMap::from_base64("not base64!").unwrap_err().is_protocol());
    }
}
