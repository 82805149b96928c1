//! Simulated transmission channels and attacks, for test harnesses only.
//!
//! Verification never depends on this module. Enabled by the default
//! `simulation` feature.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::secret::Secret;

/// Distortion applied to a block before it reaches the verifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelScenario {
    /// Clean channel.
    Identity,
    /// Additive white Gaussian noise with the given standard deviation.
    GaussianNoise { std_dev: f64 },
    /// Constant bias added to every sample (gross falsification).
    Offset { bias: f64 },
    /// Samples untouched; the verifier uses an impostor secret.
    WrongSecret,
}

impl ChannelScenario {
    pub fn swaps_secret(&self) -> bool {
        matches!(self, ChannelScenario::WrongSecret)
    }
}

/// One standard normal draw via Box-Muller from two uniform draws.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - u keeps u1 in (0, 1] so ln never sees zero
    let u1 = 1.0 - rng.r#gen::<f64>();
    let u2 = rng.r#gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Apply `scenario` to `block`, drawing any randomness from `rng`.
pub fn apply_scenario<R: Rng + ?Sized>(
    block: &[f64],
    scenario: &ChannelScenario,
    rng: &mut R,
) -> Vec<f64> {
    match *scenario {
        ChannelScenario::Identity | ChannelScenario::WrongSecret => block.to_vec(),
        ChannelScenario::GaussianNoise { std_dev } => block
            .iter()
            .map(|&s| s + std_dev * standard_normal(rng))
            .collect(),
        ChannelScenario::Offset { bias } => block.iter().map(|&s| s + bias).collect(),
    }
}

/// A seeded channel plus the impostor secret used by [`ChannelScenario::WrongSecret`].
pub struct Channel {
    rng: ChaCha8Rng,
    impostor: Secret,
}

impl Channel {
    pub fn new(seed: u64, impostor: Secret) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            impostor,
        }
    }

    pub fn apply(&mut self, block: &[f64], scenario: &ChannelScenario) -> Vec<f64> {
        apply_scenario(block, scenario, &mut self.rng)
    }

    /// The secret the verifier should use under `scenario`.
    pub fn secret_for<'a>(&'a self, scenario: &ChannelScenario, genuine: &'a Secret) -> &'a Secret {
        if scenario.swaps_secret() {
            &self.impostor
        } else {
            genuine
        }
    }
}
