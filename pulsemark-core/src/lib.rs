pub mod bits;
pub mod config;
pub mod embed;
pub mod error;
pub mod haar;
pub mod message;
pub mod metrics;
pub mod qim;
pub mod quantize;
pub mod secret;
pub mod stream;
pub mod verify;
pub mod watermark;

#[cfg(feature = "simulation")]
pub mod channel;

#[cfg(feature = "parallel")]
pub mod parallel;

// Re-export primary API types
pub use bits::WatermarkBits;
pub use config::WatermarkConfig;
pub use error::Error;
pub use message::{Message, Outcome, SecureBlock, Session};
pub use secret::Secret;
pub use stream::StreamEmbedder;
pub use verify::{Status, VerificationDiagnostics, VerificationResult};

#[cfg(feature = "simulation")]
pub use channel::{Channel, ChannelScenario};

#[cfg(feature = "parallel")]
pub use parallel::verify_batch_parallel;

/// Verify one block against the watermark expected for `sequence`.
///
/// In production `received` and `processed` are the same samples. A
/// verdict of [`Status::Invalid`] is returned as `Ok`, not as an error.
pub fn verify(
    received: &[f64],
    processed: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> error::Result<VerificationResult> {
    verify::verify(received, processed, sequence, secret, config)
}

/// Verify with the expected and extracted bitstrings attached.
pub fn verify_with_diagnostics(
    received: &[f64],
    processed: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> error::Result<(VerificationResult, VerificationDiagnostics)> {
    verify::verify_with_diagnostics(received, processed, sequence, secret, config)
}

/// Watermark one block the way the emitting device does.
///
/// For file-based tooling. For a continuous series, see [`StreamEmbedder`].
pub fn embed(
    samples: &[f64],
    sequence: u64,
    secret: &Secret,
    config: &WatermarkConfig,
) -> error::Result<Vec<f64>> {
    embed::embed_block(samples, sequence, secret, config)
}
