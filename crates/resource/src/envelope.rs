//! Request-envelope codec.
//!
//! Turns a [`CapturedRequest`] into an opaque [`EnvelopeToken`] that the
//! downstream engine stores as a resource version `ref`, and back again.
//!
//! ## Token format
//!
//! ```text
//! webhook.v1:<standard base64 of the CapturedRequest JSON>
//! ```
//!
//! Tokens minted before the marker existed are plain base64 and are still
//! accepted. Decoding distinguishes two failure classes:
//!
//! | Token | Outcome |
//! |-------|---------|
//! | marker present, any decoding failure | [`EnvelopeError::Malformed`] |
//! | no marker, not base64 or not a JSON object | [`EnvelopeError::NotAnEnvelope`] |
//! | no marker, JSON object lacking required fields | [`EnvelopeError::Malformed`] |
//! | empty | [`EnvelopeError::NotAnEnvelope`] |
//!
//! `NotAnEnvelope` covers placeholder refs the engine hands out before any
//! webhook has been relayed; callers treat it as "no new version".

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CapturedRequest;

/// Version marker prefixed to every token this crate produces.
pub const ENVELOPE_MARKER: &str = "webhook.v1:";

/// Opaque string form of a captured request, used as a resource version ref.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvelopeToken(String);

impl EnvelopeToken {
    /// Wraps a ref received from the downstream engine without validating it.
    pub fn from_ref(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encodes `request` into a marked token.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Serialization`] if the request cannot be
    /// rendered as JSON. All fields are plain strings and bytes, so this is
    /// not expected in practice.
    pub fn encode(request: &CapturedRequest) -> Result<Self, EnvelopeError> {
        let json = serde_json::to_vec(request).map_err(EnvelopeError::Serialization)?;
        Ok(Self(format!("{ENVELOPE_MARKER}{}", STANDARD.encode(json))))
    }

    /// Decodes the token back into the captured request.
    ///
    /// # Errors
    ///
    /// See the module documentation for when [`EnvelopeError::NotAnEnvelope`]
    /// and [`EnvelopeError::Malformed`] are returned.
    pub fn decode(&self) -> Result<CapturedRequest, EnvelopeError> {
        if self.0.is_empty() {
            return Err(EnvelopeError::NotAnEnvelope);
        }

        match self.0.strip_prefix(ENVELOPE_MARKER) {
            Some(payload) => decode_marked(payload),
            None => decode_legacy(&self.0),
        }
    }
}

impl std::fmt::Display for EnvelopeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure to encode or decode an [`EnvelopeToken`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The token does not represent a captured request at all.
    #[error("version ref is not a captured request envelope")]
    NotAnEnvelope,

    /// The token claims to be an envelope but cannot be decoded.
    #[error("malformed envelope: {reason}")]
    Malformed {
        /// What was wrong with the token.
        reason: String,
    },

    /// The captured request could not be serialised.
    #[error("failed to serialise captured request: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl EnvelopeError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

fn decode_marked(payload: &str) -> Result<CapturedRequest, EnvelopeError> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| EnvelopeError::malformed(format!("invalid base64: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| EnvelopeError::malformed(format!("invalid captured request: {e}")))
}

fn decode_legacy(token: &str) -> Result<CapturedRequest, EnvelopeError> {
    let Ok(bytes) = STANDARD.decode(token) else {
        return Err(EnvelopeError::NotAnEnvelope);
    };

    let value = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(value) if value.is_object() => value,
        _ => return Err(EnvelopeError::NotAnEnvelope),
    };

    serde_json::from_value(value)
        .map_err(|e| EnvelopeError::malformed(format!("invalid captured request: {e}")))
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
