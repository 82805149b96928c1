use crate::error::{Error, Result};

/// The shared secret mixed into every expected watermark.
///
/// Must be byte-identical on the embedding device and the verifier for a
/// block to ever validate. Swapping in a different secret is how the
/// wrong-key attack is modeled.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    raw: Vec<u8>,
}

impl Secret {
    /// Create a secret from raw bytes. Empty secrets are rejected.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(Error::InvalidSecret);
        }
        Ok(Self {
            raw: bytes.to_vec(),
        })
    }

    /// Create a secret from a passphrase, using its UTF-8 bytes verbatim.
    pub fn from_passphrase(passphrase: &str) -> Result<Self> {
        Self::new(passphrase.as_bytes())
    }

    /// Returns the raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("raw", &"[REDACTED]")
            .finish()
    }
}
