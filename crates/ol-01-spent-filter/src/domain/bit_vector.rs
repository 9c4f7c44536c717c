//! Fixed-size bit array backing the Bloom filter
//!
//! Bits are stored least-significant-bit first in byte words: bit `i` lives
//! in byte `i / 8` at position `i % 8`. The same mapping is used for the flat
//! byte export, so encode/decode is layout-preserving.

use bitvec::prelude::*;

use crate::error::FilterError;

/// Fixed-size bit array with checked set/test access
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    bits: BitVec<u8, Lsb0>,
}

impl BitVector {
    /// Create a bit vector of `len` bits, all cleared
    pub fn new(len: usize) -> Self {
        Self {
            bits: bitvec![u8, Lsb0; 0; len],
        }
    }

    /// Rebuild a bit vector from its flat byte export
    ///
    /// `bytes` must hold exactly `ceil(len / 8)` bytes. Padding bits past
    /// `len` in the final byte are discarded.
    pub fn from_bytes(bytes: &[u8], len: usize) -> Result<Self, FilterError> {
        let expected = Self::byte_len(len);
        if bytes.len() != expected {
            return Err(FilterError::MalformedFilter(format!(
                "expected {} bytes for {} bits, got {}",
                expected,
                len,
                bytes.len()
            )));
        }

        let mut bits = BitVec::<u8, Lsb0>::from_vec(bytes.to_vec());
        bits.truncate(len);
        Ok(Self { bits })
    }

    /// Export the bit array as a flat byte sequence
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.bits.as_raw_slice().to_vec();
        // Clear padding so equal bit vectors always export equal bytes
        let used = self.bits.len() % 8;
        if used != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
        bytes
    }

    /// Mark bit `index`
    pub fn set(&mut self, index: usize) -> Result<(), FilterError> {
        self.check_index(index)?;
        self.bits.set(index, true);
        Ok(())
    }

    /// Whether bit `index` is marked
    pub fn test(&self, index: usize) -> Result<bool, FilterError> {
        self.check_index(index)?;
        Ok(self.bits[index])
    }

    /// OR `other` into this vector in place
    ///
    /// Both vectors must have the same length.
    pub fn union_with(&mut self, other: &BitVector) -> Result<(), FilterError> {
        if self.len() != other.len() {
            return Err(FilterError::SizeMismatch {
                local_bits: self.len(),
                local_hashes: 0,
                peer_bits: other.len(),
                peer_hashes: 0,
            });
        }

        // OR the raw words rather than walking bit by bit
        let self_raw = self.bits.as_raw_mut_slice();
        let other_raw = other.bits.as_raw_slice();
        for (s, o) in self_raw.iter_mut().zip(other_raw.iter()) {
            *s |= *o;
        }
        Ok(())
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the vector has zero bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of bits currently set
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Unchecked set for callers that already reduced `index` modulo `len`
    pub(crate) fn set_in_range(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    /// Unchecked test for callers that already reduced `index` modulo `len`
    pub(crate) fn test_in_range(&self, index: usize) -> bool {
        self.bits[index]
    }

    fn check_index(&self, index: usize) -> Result<(), FilterError> {
        if index >= self.bits.len() {
            return Err(FilterError::IndexOutOfRange {
                index,
                len: self.bits.len(),
            });
        }
        Ok(())
    }

    fn byte_len(len: usize) -> usize {
        len.div_ceil(8)
    }
}
