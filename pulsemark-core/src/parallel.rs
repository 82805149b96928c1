//! Optional parallel batch verification using rayon.
//!
//! Enable with the `parallel` feature flag. Blocks are independent, so each
//! is verified on its own worker with no shared state.

use rayon::prelude::*;

use crate::config::WatermarkConfig;
use crate::error::Result;
use crate::message::{Message, Outcome, SecureBlock, Session, check_samples};
use crate::secret::Secret;
use crate::verify::{VerificationResult, verify};

impl Session {
    /// Handle many messages in parallel, as [`Session::handle`] would one by one.
    ///
    /// Outcomes come back in input order.
    pub fn handle_batch_parallel(&self, messages: &[Message]) -> Vec<Result<Outcome>> {
        messages.par_iter().map(|m| self.handle(m)).collect()
    }
}

/// Verify many blocks in parallel.
///
/// Results come back in input order; each carries its own block's sequence
/// number regardless of which worker computed it.
pub fn verify_batch_parallel(
    blocks: &[SecureBlock],
    secret: &Secret,
    config: &WatermarkConfig,
) -> Vec<Result<VerificationResult>> {
    blocks
        .par_iter()
        .map(|block| {
            check_samples(&block.samples)?;
            verify(&block.samples, &block.samples, block.sequence, secret, config)
        })
        .collect()
}
