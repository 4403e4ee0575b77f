//! Top-level error type for one check evaluation.
//!
//! [`CheckError`] covers every condition that aborts a check invocation.
//! Component-level errors (envelope, events, rules, forwarding) are defined in
//! their own modules and wrapped here.
//!
//! "The version ref is not an envelope" is deliberately absent: it is a normal
//! outcome (no webhook relayed yet) and produces an empty version list.

use thiserror::Error;

use crate::{DeliveryId, EventError, ForwardError, MissingHeader, RuleError};

/// Errors that abort a check evaluation. None of them are retried.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Standard input could not be read or is not a valid check request.
    #[error("unable to read check input: {message}")]
    InputUnreadable { message: String },

    /// The version ref is an envelope but cannot be decoded.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// A mandatory GitHub header is absent from the captured request.
    #[error(transparent)]
    MissingHeader(#[from] MissingHeader),

    /// The body digest does not match `X-Hub-Signature`.
    ///
    /// Signals either a wrong secret or a forged delivery.
    #[error("invalid signature for delivery {delivery}")]
    InvalidSignature { delivery: DeliveryId },

    /// The event type is unsupported or its body cannot be parsed.
    #[error(transparent)]
    Event(#[from] EventError),

    /// The trigger configuration is invalid.
    #[error("rule configuration error: {0}")]
    RuleConfiguration(#[from] RuleError),

    /// A downstream notification failed.
    #[error("downstream unavailable: {0}")]
    DownstreamUnavailable(#[from] ForwardError),
}

impl CheckError {
    /// Builds an [`CheckError::InputUnreadable`] from any displayable cause.
    pub fn input_unreadable(cause: impl std::fmt::Display) -> Self {
        Self::InputUnreadable {
            message: cause.to_string(),
        }
    }
}
