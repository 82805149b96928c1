//! Distortion metrics between the received and processed blocks.

/// Mean squared error. Both slices must have the same non-zero length.
pub fn mse(received: &[f64], processed: &[f64]) -> f64 {
    debug_assert_eq!(received.len(), processed.len());
    let sum: f64 = received
        .iter()
        .zip(processed.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    sum / received.len() as f64
}

/// Peak signal-to-noise ratio in dB for a given MSE.
///
/// Returns `ceiling` when `mse == 0` instead of infinity.
pub fn psnr(mse: f64, max_reference: f64, ceiling: f64) -> f64 {
    if mse == 0.0 {
        return ceiling;
    }
    20.0 * (max_reference / mse.sqrt()).log10()
}
