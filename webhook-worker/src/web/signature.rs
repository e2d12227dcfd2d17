//! Discord webhook signature verification.
//!
//! Discord signs every webhook request with the application's Ed25519 key.
//! The signed message is the `X-Signature-Timestamp` header followed directly
//! by the raw request body.
//! Reference: https://discord.com/developers/docs/events/webhook-events#setting-up-an-endpoint-validating-security-request-headers

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH};
use thiserror::Error;
use tracing::warn;

/// Header carrying the hex-encoded Ed25519 signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Header carrying the timestamp that prefixes the signed message.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Reasons a request or key fails authentication.
///
/// These are only ever surfaced in server logs. Callers see one uniform
/// rejection regardless of the variant.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid hex in {field}: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("public key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("malformed key or signature: {0}")]
    Malformed(#[from] ed25519_dalek::SignatureError),

    #[error("signature does not match message")]
    Mismatch,
}

/// Decode a hex string into raw bytes.
///
/// Odd-length input and non-hex characters are rejected rather than decoded
/// into placeholder bytes.
pub fn decode_hex(field: &'static str, input: &str) -> Result<Vec<u8>, SignatureError> {
    hex::decode(input).map_err(|source| SignatureError::InvalidHex { field, source })
}

/// Verifies request signatures against the application's public key.
#[derive(Debug, Clone)]
pub struct Authenticator {
    key: VerifyingKey,
}

impl Authenticator {
    /// Import a hex-encoded Ed25519 public key.
    pub fn from_hex(public_key: &str) -> Result<Self, SignatureError> {
        let bytes = decode_hex("public_key", public_key.trim())?;
        let raw: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SignatureError::InvalidKeyLength(bytes.len()))?;

        Ok(Self {
            key: VerifyingKey::from_bytes(&raw)?,
        })
    }

    /// Verify `signature` (hex) over `timestamp ++ body`.
    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> Result<(), SignatureError> {
        if signature.is_empty() {
            return Err(SignatureError::MissingField("signature"));
        }
        if timestamp.is_empty() {
            return Err(SignatureError::MissingField("timestamp"));
        }
        if body.is_empty() {
            return Err(SignatureError::MissingField("body"));
        }

        let signature = Signature::from_slice(&decode_hex("signature", signature)?)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify_strict(&message, &signature)
            .map_err(|_| SignatureError::Mismatch)
    }

    /// Like [`Authenticator::verify`], logging the failure cause and
    /// collapsing it to a boolean.
    pub fn is_authentic(&self, signature: &str, timestamp: &str, body: &[u8]) -> bool {
        match self.verify(signature, timestamp, body) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    has_signature = !signature.is_empty(),
                    has_timestamp = !timestamp.is_empty(),
                    body_length = body.len(),
                    "signature_invalid"
                );
                false
            }
        }
    }
}
