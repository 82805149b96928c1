//! Messages arriving from the data source and their dispatch.

use serde::{Deserialize, Serialize};

use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::secret::Secret;
use crate::verify::{self, VerificationResult};

/// A watermarked block paired with the sequence number it was embedded under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecureBlock {
    pub sequence: u64,
    pub samples: Vec<f64>,
}

/// Inbound message from the sensor link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A single live sample for display. Not verified.
    Live { value: f64 },
    /// A complete watermarked block.
    Secure { sequence: u64, samples: Vec<f64> },
}

impl Message {
    /// Parse one JSON message.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<SecureBlock> for Message {
    fn from(block: SecureBlock) -> Self {
        Message::Secure {
            sequence: block.sequence,
            samples: block.samples,
        }
    }
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Live value, passed through unchanged.
    Live(f64),
    Verified(VerificationResult),
}

/// Dispatches inbound messages to the verifier.
///
/// Holds only immutable configuration, so one session can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct Session {
    secret: Secret,
    config: WatermarkConfig,
}

impl Session {
    pub fn new(secret: Secret, config: WatermarkConfig) -> Self {
        Self { secret, config }
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Handle one message. Secure blocks are verified against themselves.
    pub fn handle(&self, message: &Message) -> Result<Outcome> {
        match message {
            Message::Live { value } => Ok(Outcome::Live(*value)),
            Message::Secure { sequence, samples } => {
                check_samples(samples)?;
                let result = verify::verify(samples, samples, *sequence, &self.secret, &self.config)?;
                Ok(Outcome::Verified(result))
            }
        }
    }

    /// Parse and handle one JSON message.
    pub fn handle_json(&self, text: &str) -> Result<Outcome> {
        self.handle(&Message::from_json(text)?)
    }

    /// Handle one message after passing its samples through a simulated channel.
    ///
    /// The wire samples stay the received block; the channel output is the
    /// processed block. The wrong-secret scenario swaps the verifier's secret
    /// for the channel's impostor secret and leaves the samples alone.
    #[cfg(feature = "simulation")]
    pub fn handle_with_scenario(
        &self,
        message: &Message,
        scenario: &crate::channel::ChannelScenario,
        channel: &mut crate::channel::Channel,
    ) -> Result<Outcome> {
        match message {
            Message::Live { value } => Ok(Outcome::Live(*value)),
            Message::Secure { sequence, samples } => {
                check_samples(samples)?;
                let processed = channel.apply(samples, scenario);
                let secret = channel.secret_for(scenario, &self.secret);
                let result = verify::verify(samples, &processed, *sequence, secret, &self.config)?;
                Ok(Outcome::Verified(result))
            }
        }
    }
}

pub(crate) fn check_samples(samples: &[f64]) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::InvalidBlockLength(0));
    }
    if let Some(bad) = samples.iter().find(|s| !s.is_finite()) {
        return Err(Error::Message(format!("non-finite sample {bad}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::embed_block;

    fn session() -> Session {
        Session::new(Secret::from_passphrase("S").unwrap(), WatermarkConfig::default())
    }

    #[test]
    fn parses_live_message() {
        let msg = Message::from_json(r#"{"type":"live","value":72.5}"#).unwrap();
        assert_eq!(msg, Message::Live { value: 72.5 });
        assert_eq!(session().handle(&msg).unwrap(), Outcome::Live(72.5));
    }

    #[test]
    fn parses_secure_message() {
        let msg =
            Message::from_json(r#"{"type":"secure","sequence":3,"samples":[1.0,2.0]}"#).unwrap();
        assert_eq!(
            msg,
            Message::Secure {
                sequence: 3,
                samples: vec![1.0, 2.0]
            }
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            Message::from_json(r#"{"type":"status","ok":true}"#),
            Err(Error::Message(_))
        ));
    }

    #[test]
    fn secure_block_is_verified() {
        let session = session();
        let samples: Vec<f64> = (0..16).map(|i| 70.0 + (i % 4) as f64).collect();
        let marked = embed_block(&samples, 11, session.secret(), session.config()).unwrap();
        let msg = Message::from(SecureBlock {
            sequence: 11,
            samples: marked,
        });
        match session.handle(&msg).unwrap() {
            Outcome::Verified(result) => {
                assert!(result.is_valid());
                assert_eq!(result.sequence, 11);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn empty_secure_block_is_an_error() {
        let msg = Message::Secure {
            sequence: 0,
            samples: Vec::new(),
        };
        assert!(matches!(
            session().handle(&msg),
            Err(Error::InvalidBlockLength(0))
        ));
    }

    #[test]
    fn json_round_trip_through_session() {
        let text = Message::Live { value: 64.0 }.to_json().unwrap();
        assert_eq!(text, r#"{"type":"live","value":64.0}"#);
        assert_eq!(session().handle_json(&text).unwrap(), Outcome::Live(64.0));
    }
}
