//! Quantization index modulation on detail coefficients.
//!
//! A bit is the parity of a coefficient's quantization index: odd is 1,
//! even is 0. Parity uses Euclidean remainder so negative indices behave
//! like positive ones (`-3` is odd, `-2` is even).

use crate::error::{Error, Result};

fn check_delta(delta: f64) -> Result<()> {
    if delta.is_nan() || delta <= 0.0 {
        return Err(Error::InvalidDelta(delta));
    }
    Ok(())
}

fn is_odd(index: i64) -> bool {
    index.rem_euclid(2) == 1
}

/// Recover one bit from a detail coefficient.
///
/// The index is `floor(c / delta + 0.5)`, the same round-half-up rule the
/// trend quantizer uses.
pub fn extract_bit(coefficient: f64, delta: f64) -> Result<bool> {
    check_delta(delta)?;
    let index = (coefficient / delta + 0.5).floor() as i64;
    Ok(is_odd(index))
}

/// Move a detail coefficient onto a lattice point whose index parity is `bit`.
///
/// Starts from `floor(c / delta)` and steps up by one when the parity is wrong,
/// so the result is `k * delta` with `k` of the requested parity.
pub fn embed_bit(coefficient: f64, delta: f64, bit: bool) -> Result<f64> {
    check_delta(delta)?;
    let mut index = (coefficient / delta).floor() as i64;
    if is_odd(index) != bit {
        index += 1;
    }
    Ok(index as f64 * delta)
}

/// Extract one bit per coefficient.
pub fn extract_bits(coefficients: &[f64], delta: f64) -> Result<Vec<bool>> {
    coefficients
        .iter()
        .map(|&c| extract_bit(c, delta))
        .collect()
}
