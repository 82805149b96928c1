use crate::config::WatermarkConfig;
use crate::embed::embed_block;
use crate::error::Result;
use crate::message::SecureBlock;
use crate::secret::Secret;

/// Streaming watermark embedder, the emitting device's side of the link.
///
/// Accepts arbitrary-length input chunks, cuts them into `block_len`
/// blocks and watermarks each under the next sequence number.
pub struct StreamEmbedder {
    config: WatermarkConfig,
    secret: Secret,
    input_buf: Vec<f64>,
    next_sequence: u64,
}

impl StreamEmbedder {
    /// Create a new streaming embedder whose first block gets `first_sequence`.
    pub fn new(secret: &Secret, config: &WatermarkConfig, first_sequence: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            secret: secret.clone(),
            input_buf: Vec::with_capacity(config.block_len),
            next_sequence: first_sequence,
        })
    }

    /// Buffer `input` and return every block completed by it.
    pub fn process(&mut self, input: &[f64]) -> Result<Vec<SecureBlock>> {
        self.input_buf.extend_from_slice(input);
        let block_len = self.config.block_len;
        let mut blocks = Vec::with_capacity(self.input_buf.len() / block_len);

        let mut consumed = 0;
        while self.input_buf.len() - consumed >= block_len {
            let raw = &self.input_buf[consumed..consumed + block_len];
            let samples = embed_block(raw, self.next_sequence, &self.secret, &self.config)?;
            blocks.push(SecureBlock {
                sequence: self.next_sequence,
                samples,
            });
            self.next_sequence += 1;
            consumed += block_len;
        }
        self.input_buf.drain(..consumed);

        Ok(blocks)
    }

    /// Samples buffered but not yet emitted.
    pub fn pending(&self) -> usize {
        self.input_buf.len()
    }

    /// Sequence number the next block will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::verify::verify;

    #[test]
    fn chunks_into_sequenced_blocks() {
        let secret = Secret::from_passphrase("S").unwrap();
        let config = WatermarkConfig::default();
        let mut embedder = StreamEmbedder::new(&secret, &config, 100).unwrap();

        let series: Vec<f64> = (0..40).map(|i| 68.0 + (i as f64 * 0.3).cos() * 5.0).collect();
        let mut blocks = embedder.process(&series[..10]).unwrap();
        assert!(blocks.is_empty());
        assert_eq!(embedder.pending(), 10);

        blocks.extend(embedder.process(&series[10..]).unwrap());
        assert_eq!(blocks.len(), 2);
        assert_eq!(embedder.pending(), 8);
        assert_eq!(embedder.next_sequence(), 102);

        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(block.sequence, 100 + i as u64);
            assert_eq!(block.samples.len(), 16);
            let result = verify(&block.samples, &block.samples, block.sequence, &secret, &config)
                .unwrap();
            assert!(result.is_valid());
        }
    }

    #[test]
    fn odd_block_length_rejected() {
        let secret = Secret::from_passphrase("S").unwrap();
        let config = WatermarkConfig {
            block_len: 15,
            ..WatermarkConfig::default()
        };
        assert!(StreamEmbedder::new(&secret, &config, 0).is_err());
    }

    #[test]
    fn oversized_block_rejected_before_buffering() {
        let secret = Secret::from_passphrase("S").unwrap();
        let config = WatermarkConfig {
            block_len: 1024,
            ..WatermarkConfig::default()
        };
        assert!(matches!(
            StreamEmbedder::new(&secret, &config, 0),
            Err(Error::InvalidBitCount(512))
        ));
    }

    #[test]
    fn zero_delta_rejected_before_buffering() {
        let secret = Secret::from_passphrase("S").unwrap();
        let config = WatermarkConfig {
            delta: 0.0,
            ..WatermarkConfig::default()
        };
        assert!(matches!(
            StreamEmbedder::new(&secret, &config, 0),
            Err(Error::InvalidDelta(_))
        ));
    }
}
