use tracing::debug;

use crate::config::WatermarkConfig;
use crate::error::Result;
use crate::haar::{self, Coefficients};
use crate::qim;
use crate::secret::Secret;
use crate::watermark;

/// Embed a watermark into one block, as the emitting device does.
///
/// The expected bits are derived from the trend, then written into the
/// detail coefficients by QIM. The trend is left untouched, so a verifier
/// holding the same secret and sequence number regenerates the same bits.
pub fn embed_block(
    samples: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> Result<Vec<f64>> {
    let coeffs = haar::forward(samples)?;
    let bits = watermark::expected_bits(
        &coeffs.trend,
        sequence,
        coeffs.detail.len(),
        secret,
        config.quant_step,
    )?;
    let block = embed_bits(coeffs, bits.as_slice(), config.delta)?;
    debug!(sequence, %bits, "embedded block");
    Ok(block)
}

/// Write an arbitrary bitstring into a block's detail coefficients.
///
/// Models an attacker re-watermarking data with guessed bits. Bits beyond
/// the number of detail coefficients are ignored; missing bits leave the
/// remaining coefficients unchanged.
pub fn embed_bits_into_block(samples: &[f64], bits: &[bool], delta: f64) -> Result<Vec<f64>> {
    let coeffs = haar::forward(samples)?;
    embed_bits(coeffs, bits, delta)
}

fn embed_bits(mut coeffs: Coefficients, bits: &[bool], delta: f64) -> Result<Vec<f64>> {
    for (d, &bit) in coeffs.detail.iter_mut().zip(bits.iter()) {
        *d = qim::embed_bit(*d, delta, bit)?;
    }
    haar::inverse(&coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qim::extract_bits;

    fn block() -> Vec<f64> {
        vec![
            71.0, 72.5, 74.0, 73.0, 75.5, 77.0, 76.0, 74.5, 73.0, 72.0, 70.5, 71.0, 72.0, 73.5,
            75.0, 76.5,
        ]
    }

    #[test]
    fn embedding_preserves_trend() {
        let config = WatermarkConfig::default();
        let secret = Secret::from_passphrase("S").unwrap();
        let original = haar::forward(&block()).unwrap();
        let marked = embed_block(&block(), 7, &secret, &config).unwrap();
        let after = haar::forward(&marked).unwrap();
        for (a, b) in original.trend.iter().zip(after.trend.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn embedded_detail_carries_expected_bits() {
        let config = WatermarkConfig::default();
        let secret = Secret::from_passphrase("S").unwrap();
        let marked = embed_block(&block(), 7, &secret, &config).unwrap();
        let coeffs = haar::forward(&marked).unwrap();
        let expected =
            watermark::expected_bits(&coeffs.trend, 7, 8, &secret, config.quant_step).unwrap();
        let extracted = extract_bits(&coeffs.detail, config.delta).unwrap();
        assert_eq!(expected.as_slice(), extracted.as_slice());
    }

    #[test]
    fn distortion_is_bounded_by_delta() {
        let config = WatermarkConfig::default();
        let secret = Secret::from_passphrase("S").unwrap();
        let marked = embed_block(&block(), 1, &secret, &config).unwrap();
        for (a, b) in block().iter().zip(marked.iter()) {
            // |detail shift| <= delta, spread over two samples by 1/sqrt(2)
            assert!((a - b).abs() <= config.delta);
        }
    }

    #[test]
    fn arbitrary_bits_can_be_forced() {
        let bits = [true, false, true, true, false, false, true, false];
        let forged = embed_bits_into_block(&block(), &bits, 2.0).unwrap();
        let coeffs = haar::forward(&forged).unwrap();
        assert_eq!(extract_bits(&coeffs.detail, 2.0).unwrap(), bits.to_vec());
    }
}
