//! The captured form of an inbound HTTP request.
//!
//! A [`CapturedRequest`] is everything the relay saw on the wire: method,
//! path (with query), protocol, every header pair in arrival order, and the
//! raw body bytes. Nothing is normalised beyond lower-casing header names; the
//! signature check on the far side depends on the body being byte-identical.
//!
//! The JSON field names (`request` for the method, `[name, value]` header
//! arrays, base64 `body`) are the established wire shape and must not change
//! without bumping the envelope marker in [`crate::envelope`].

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::DeliveryId;

/// Header carrying the GitHub delivery GUID.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Header carrying the GitHub event type label (`push`, `pull_request`, ...).
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the HMAC-SHA1 body digest.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// One `(name, value)` header pair. Serialised as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair(String, String);

impl HeaderPair {
    /// Creates a pair, lower-casing the name.
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        Self(name.as_ref().to_ascii_lowercase(), value.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &str {
        &self.1
    }
}

/// A losslessly captured HTTP request plus the credential used to forward it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// HTTP method (`POST` for every GitHub delivery).
    #[serde(rename = "request")]
    pub method: String,

    /// Request path including the query string.
    pub path: String,

    /// Protocol identifier, e.g. `HTTP/1.1`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub proto: String,

    /// Header pairs in arrival order. Repeated names appear as separate pairs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<HeaderPair>,

    /// Raw body bytes, base64 in the JSON form.
    #[serde(default, with = "body_base64")]
    pub body: Vec<u8>,

    /// Bearer credential for the downstream engine. Not part of the HTTP
    /// request itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CapturedRequest {
    /// Starts a capture with no headers, an empty body and no token.
    pub fn new(method: impl Into<String>, path: impl Into<String>, proto: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            proto: proto.into(),
            headers: Vec::new(),
            body: Vec::new(),
            token: None,
        }
    }

    /// Appends a header pair. Existing pairs with the same name are kept.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderPair::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|pair| pair.name().eq_ignore_ascii_case(name))
            .map(HeaderPair::value)
    }

    /// Extracts the three headers every GitHub delivery must carry.
    ///
    /// An empty value counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`MissingHeader`] naming the first absent header, checked in
    /// the order delivery, event, signature.
    pub fn webhook_metadata(&self) -> Result<WebhookMetadata<'_>, MissingHeader> {
        let required = |name: &'static str| {
            self.header(name)
                .filter(|value| !value.is_empty())
                .ok_or(MissingHeader(name))
        };

        let delivery = required(DELIVERY_HEADER)?;
        let event = required(EVENT_HEADER)?;
        let signature = required(SIGNATURE_HEADER)?;

        Ok(WebhookMetadata {
            delivery: DeliveryId::new(delivery).ok_or(MissingHeader(DELIVERY_HEADER))?,
            event,
            signature,
        })
    }
}

/// The GitHub-specific headers of a captured delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookMetadata<'a> {
    pub delivery: DeliveryId,
    pub event: &'a str,
    pub signature: &'a str,
}

/// A mandatory webhook header was not present in the captured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} header is missing")]
pub struct MissingHeader(pub &'static str);

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

mod body_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
