//! Expected-watermark generation from trend coefficients.

use sha2::{Digest, Sha256};

use crate::bits::WatermarkBits;
use crate::error::{Error, Result};
use crate::quantize::{decimal_repr, robust_round};
use crate::secret::Secret;

/// Output size of the watermark hash in bits.
pub const HASH_BITS: usize = 256;

/// Byte string hashed to derive the expected watermark.
///
/// Concatenates the decimal text of each robustly rounded trend coefficient,
/// then the secret, then the decimal sequence number. No separators.
pub fn hash_input(trend: &[f64], sequence: u64, secret: &Secret, quant_step: f64) -> Vec<u8> {
    let mut input = String::new();
    for &t in trend {
        input.push_str(&decimal_repr(robust_round(t, quant_step)));
    }
    let mut bytes = input.into_bytes();
    bytes.extend_from_slice(secret.as_bytes());
    bytes.extend_from_slice(sequence.to_string().as_bytes());
    bytes
}

/// Derive the expected watermark for a block.
///
/// SHA-256 over [`hash_input`], truncated to the first `num_bits` bits
/// (MSB first per byte). `num_bits` must be in `1..=256`.
pub fn expected_bits(
    trend: &[f64],
    sequence: u64,
    num_bits: usize,
    secret: &Secret,
    quant_step: f64,
) -> Result<WatermarkBits> {
    if num_bits == 0 || num_bits > HASH_BITS {
        return Err(Error::InvalidBitCount(num_bits));
    }
    let digest = Sha256::digest(hash_input(trend, sequence, secret, quant_step));
    Ok(WatermarkBits::from_bytes_msb(&digest, num_bits))
}
