//! Single-level 1D Haar decomposition over a fixed-size sample block.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{Error, Result};

/// Trend (approximation) and detail coefficients of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub trend: Vec<f64>,
    pub detail: Vec<f64>,
}

impl Coefficients {
    /// Number of coefficient pairs (half the block length).
    pub fn len(&self) -> usize {
        self.detail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detail.is_empty()
    }
}

/// Forward Haar transform.
///
/// `trend[i] = (x[2i] + x[2i+1]) / sqrt(2)` and
/// `detail[i] = (x[2i] - x[2i+1]) / sqrt(2)`.
pub fn forward(block: &[f64]) -> Result<Coefficients> {
    if block.is_empty() || !block.len().is_multiple_of(2) {
        return Err(Error::InvalidBlockLength(block.len()));
    }

    let half = block.len() / 2;
    let mut trend = Vec::with_capacity(half);
    let mut detail = Vec::with_capacity(half);
    for pair in block.chunks_exact(2) {
        trend.push((pair[0] + pair[1]) * FRAC_1_SQRT_2);
        detail.push((pair[0] - pair[1]) * FRAC_1_SQRT_2);
    }

    Ok(Coefficients { trend, detail })
}

/// Inverse Haar transform. Only the embedding side needs this.
pub fn inverse(coeffs: &Coefficients) -> Result<Vec<f64>> {
    if coeffs.trend.len() != coeffs.detail.len() {
        return Err(Error::BlockLengthMismatch {
            received: coeffs.trend.len() * 2,
            processed: coeffs.detail.len() * 2,
        });
    }
    if coeffs.is_empty() {
        return Err(Error::InvalidBlockLength(0));
    }

    let mut block = Vec::with_capacity(coeffs.len() * 2);
    for (&t, &d) in coeffs.trend.iter().zip(coeffs.detail.iter()) {
        block.push((t + d) * FRAC_1_SQRT_2);
        block.push((t - d) * FRAC_1_SQRT_2);
    }
    Ok(block)
}
