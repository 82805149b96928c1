use serde::Serialize;
use tracing::{debug, trace};

use crate::bits::WatermarkBits;
use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::haar;
use crate::metrics;
use crate::qim;
use crate::secret::Secret;
use crate::watermark;

/// Authenticity verdict for one block.
///
/// `Invalid` is a successful verification outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Valid,
    Invalid,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Valid => f.pad("VALID"),
            Status::Invalid => f.pad("INVALID"),
        }
    }
}

/// Verdict and quality metrics for one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    pub sequence: u64,
    pub status: Status,
    /// Percentage of mismatched watermark bits, in `[0, 100]`.
    pub bit_error_rate: f64,
    pub mean_squared_error: f64,
    /// Peak signal-to-noise ratio in dB. Equals the configured ceiling when
    /// the blocks are identical.
    pub psnr: f64,
}

impl VerificationResult {
    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }
}

/// Intermediate bitstrings from a verification, for tooling and tests.
#[derive(Debug, Clone, Default)]
pub struct VerificationDiagnostics {
    pub expected: WatermarkBits,
    pub extracted: WatermarkBits,
    pub bit_errors: usize,
}

/// Verify a block.
///
/// `received` is the block as it arrived on the wire and `processed` is the
/// block the watermark is read from (the same data in production, the
/// channel output under simulation). Distortion metrics compare the two.
pub fn verify(
    received: &[f64],
    processed: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> Result<VerificationResult> {
    verify_with_diagnostics(received, processed, sequence, secret, config).map(|(r, _)| r)
}

/// Like [`verify`] but also returns the expected and extracted bitstrings.
pub fn verify_with_diagnostics(
    received: &[f64],
    processed: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> Result<(VerificationResult, VerificationDiagnostics)> {
    if received.len() != processed.len() {
        return Err(Error::BlockLengthMismatch {
            received: received.len(),
            processed: processed.len(),
        });
    }

    let coeffs = haar::forward(processed)?;
    let mean_squared_error = metrics::mse(received, processed);
    let psnr = metrics::psnr(mean_squared_error, config.max_reference, config.psnr_ceiling);

    let num_bits = coeffs.detail.len();
    let expected = watermark::expected_bits(
        &coeffs.trend,
        sequence,
        num_bits,
        secret,
        config.quant_step,
    )?;
    let extracted = WatermarkBits::new(qim::extract_bits(&coeffs.detail, config.delta)?);

    let bit_errors = expected.hamming_distance(&extracted);
    let bit_error_rate = 100.0 * bit_errors as f64 / num_bits as f64;
    let status = if bit_error_rate <= config.ber_threshold {
        Status::Valid
    } else {
        Status::Invalid
    };

    trace!(sequence, %expected, %extracted, "watermark bits");
    debug!(sequence, bit_error_rate, %status, psnr, "verified block");

    let result = VerificationResult {
        sequence,
        status,
        bit_error_rate,
        mean_squared_error,
        psnr,
    };
    let diagnostics = VerificationDiagnostics {
        expected,
        extracted,
        bit_errors,
    };
    Ok((result, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::embed_block;

    fn heart_rate_block(seed: f64) -> Vec<f64> {
        (0..16)
            .map(|i| 72.0 + 6.0 * ((i as f64 + seed) * 0.4).sin())
            .collect()
    }

    fn secret(s: &str) -> Secret {
        Secret::from_passphrase(s).unwrap()
    }

    #[test]
    fn constant_block_extracts_all_zero() {
        let config = WatermarkConfig::default();
        let block = [75.0; 16];
        let (result, diag) =
            verify_with_diagnostics(&block, &block, 1, &secret("S"), &config).unwrap();

        assert_eq!(diag.extracted.to_string(), "00000000");
        assert_eq!(diag.expected.len(), 8);
        let expected_ones = diag.expected.as_slice().iter().filter(|&&b| b).count();
        assert_eq!(diag.bit_errors, expected_ones);
        assert_eq!(result.status == Status::Valid, expected_ones * 100 <= 30 * 8);
        assert_eq!(result.psnr, 100.0);
        assert_eq!(result.mean_squared_error, 0.0);
    }

    #[test]
    fn watermarked_block_verifies_against_itself() {
        let config = WatermarkConfig::default();
        let s = secret("S");
        for seq in 0..20 {
            let block = embed_block(&heart_rate_block(seq as f64), seq, &s, &config).unwrap();
            let result = verify(&block, &block, seq, &s, &config).unwrap();
            assert_eq!(result.bit_error_rate, 0.0, "sequence {seq}");
            assert_eq!(result.status, Status::Valid);
            assert_eq!(result.sequence, seq);
        }
    }

    #[test]
    fn wrong_sequence_number_is_detected_on_average() {
        let config = WatermarkConfig::default();
        let s = secret("S");
        let mut total_ber = 0.0;
        let n = 200u64;
        for seq in 0..n {
            let block = embed_block(&heart_rate_block(seq as f64), seq, &s, &config).unwrap();
            total_ber += verify(&block, &block, seq + 1000, &s, &config)
                .unwrap()
                .bit_error_rate;
        }
        let mean = total_ber / n as f64;
        assert!((35.0..65.0).contains(&mean), "mean BER {mean}");
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let config = WatermarkConfig::default();
        let err = verify(&[1.0; 16], &[1.0; 14], 0, &secret("S"), &config).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockLengthMismatch {
                received: 16,
                processed: 14
            }
        ));
    }

    #[test]
    fn odd_block_propagates_transform_error() {
        let config = WatermarkConfig::default();
        let err = verify(&[1.0; 7], &[1.0; 7], 0, &secret("S"), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidBlockLength(7)));
    }

    #[test]
    fn invalid_delta_propagates() {
        let config = WatermarkConfig {
            delta: 0.0,
            ..WatermarkConfig::default()
        };
        let err = verify(&[1.0; 16], &[1.0; 16], 0, &secret("S"), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidDelta(_)));
    }

    #[test]
    fn oversized_block_exceeds_hash_bits() {
        let config = WatermarkConfig::default();
        let block = vec![70.0; 514];
        let err = verify(&block, &block, 0, &secret("S"), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidBitCount(257)));
    }

    #[test]
    fn bit_count_follows_block_length() {
        let config = WatermarkConfig::default();
        let block = vec![80.0; 40];
        let (_, diag) = verify_with_diagnostics(&block, &block, 5, &secret("S"), &config).unwrap();
        assert_eq!(diag.expected.len(), 20);
        assert_eq!(diag.extracted.len(), 20);
    }

    #[test]
    fn result_serializes_for_reporting() {
        let block = [75.0; 16];
        let result = verify(&block, &block, 1, &secret("S"), &WatermarkConfig::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "INVALID");
        assert_eq!(json["sequence"], 1);
        assert_eq!(json["bit_error_rate"], 62.5);
        assert_eq!(json["psnr"], 100.0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let s = secret("S");
        let block = [75.0; 16];
        let (result, _) = verify_with_diagnostics(
            &block,
            &block,
            1,
            &s,
            &WatermarkConfig::default(),
        )
        .unwrap();
        let exact = WatermarkConfig {
            ber_threshold: result.bit_error_rate,
            ..WatermarkConfig::default()
        };
        assert!(verify(&block, &block, 1, &s, &exact).unwrap().is_valid());
    }
}
