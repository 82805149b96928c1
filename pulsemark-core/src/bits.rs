use std::fmt;

/// A watermark bitstring, one bit per detail coefficient.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatermarkBits {
    bits: Vec<bool>,
}

impl WatermarkBits {
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Take the first `num_bits` bits of `bytes`, MSB first within each byte.
    ///
    /// Callers must ensure `num_bits <= bytes.len() * 8`.
    pub fn from_bytes_msb(bytes: &[u8], num_bits: usize) -> Self {
        let bits = (0..num_bits)
            .map(|i| (bytes[i / 8] >> (7 - (i % 8))) & 1 == 1)
            .collect();
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Number of positions where `self` and `other` differ.
    ///
    /// Bits beyond the shorter string count as errors.
    pub fn hamming_distance(&self, other: &WatermarkBits) -> usize {
        let common = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count();
        common + self.len().abs_diff(other.len())
    }
}

impl fmt::Display for WatermarkBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
