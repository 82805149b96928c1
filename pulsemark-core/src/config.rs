use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::watermark::HASH_BITS;

/// Configuration shared by the embedding device and the verifier.
///
/// Every field must match the embedding side exactly. Mismatches are not
/// detected here; they simply show up as failed verifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Samples per block. Must be even. Default: 16.
    pub block_len: usize,
    /// QIM quantization step for detail coefficients. Default: 2.0.
    pub delta: f64,
    /// Maximum bit error rate (percent) still accepted as authentic. Default: 30.0.
    pub ber_threshold: f64,
    /// Reference peak amplitude for PSNR, in bpm. Default: 200.0.
    pub max_reference: f64,
    /// Robust rounding step applied to trend coefficients before hashing. Default: 5.0.
    pub quant_step: f64,
    /// PSNR reported when the blocks are identical (MSE = 0). Default: 100.0 dB.
    pub psnr_ceiling: f64,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            block_len: 16,
            delta: 2.0,
            ber_threshold: 30.0,
            max_reference: 200.0,
            quant_step: 5.0,
            psnr_ceiling: 100.0,
        }
    }
}

impl WatermarkConfig {
    /// Number of watermark bits carried by one block (one per detail coefficient).
    pub fn bits_per_block(&self) -> usize {
        self.block_len / 2
    }

    /// Reject configurations no block could ever be embedded or verified under.
    pub fn validate(&self) -> Result<()> {
        if self.block_len == 0 || !self.block_len.is_multiple_of(2) {
            return Err(Error::InvalidBlockLength(self.block_len));
        }
        if self.bits_per_block() > HASH_BITS {
            return Err(Error::InvalidBitCount(self.bits_per_block()));
        }
        if self.delta.is_nan() || self.delta <= 0.0 {
            return Err(Error::InvalidDelta(self.delta));
        }
        Ok(())
    }
}
