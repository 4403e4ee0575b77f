//! The check evaluator.
//!
//! One invocation runs the fixed sequence
//!
//! ```text
//! decode envelope ─┬─ not an envelope ─────────────► []
//!                  └─ request ─► headers ─► signature ─► event ─► rules ─┬─ no match ─► []
//!                                                                       └─ match ─► notify ─► [version]
//! ```
//!
//! Any error ends the invocation; the caller turns it into a failed process
//! without writing output.

use serde::{Deserialize, Serialize};
use tracing::{debug, field, info, instrument, warn, Span};

use crate::{
    signature, CheckError, CheckRequester, EnvelopeError, EnvelopeToken, ForwardError, Source,
    TriggerSet, VersionIn, VersionOut, WebhookEvent,
};

/// The JSON document the engine writes to the check process's standard input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInput {
    #[serde(default)]
    pub source: Source,

    /// `null` or absent on the very first check of a resource.
    #[serde(default)]
    pub version: Option<VersionIn>,
}

impl CheckInput {
    /// Parses the engine's check request.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::InputUnreadable`] if `input` is not a valid
    /// check request document.
    pub fn from_slice(input: &[u8]) -> Result<Self, CheckError> {
        serde_json::from_slice(input).map_err(CheckError::input_unreadable)
    }

    fn token(&self) -> Option<&EnvelopeToken> {
        self.version.as_ref()?.version_ref.as_ref()
    }
}

/// Evaluates one check request.
///
/// `requester` is used only when the matching trigger lists `checks` to
/// notify. Pass `None` when no engine URL is available; a match that needs
/// notifications then fails with [`ForwardError::NotConfigured`].
///
/// # Errors
///
/// Returns [`CheckError`] for every condition other than "no new version".
#[instrument(skip_all, fields(delivery = field::Empty, event = field::Empty))]
pub async fn evaluate(
    input: &CheckInput,
    requester: Option<&dyn CheckRequester>,
) -> Result<Vec<VersionOut>, CheckError> {
    let Some(token) = input.token() else {
        info!("no previous version; nothing to evaluate");
        return Ok(Vec::new());
    };

    let request = match token.decode() {
        Ok(request) => request,
        Err(EnvelopeError::NotAnEnvelope) => {
            info!("previous version is not a captured webhook; nothing to evaluate");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(CheckError::MalformedEnvelope {
                reason: err.to_string(),
            })
        }
    };

    let metadata = request.webhook_metadata()?;
    let span = Span::current();
    span.record("delivery", metadata.delivery.as_str());
    span.record("event", metadata.event);

    if !signature::validate(&request.body, metadata.signature, input.source.secret.as_bytes()) {
        warn!("signature does not match body");
        return Err(CheckError::InvalidSignature {
            delivery: metadata.delivery,
        });
    }

    let event = WebhookEvent::decode(metadata.event, &request.body)?;
    let triggers = TriggerSet::compile(&input.source.triggers)?;

    let Some(matched) = triggers.find_match(&event)? else {
        info!("no trigger matched");
        return Ok(Vec::new());
    };

    let bearer = request.token.as_deref().unwrap_or_default();
    for target in &matched.trigger.checks {
        let Some(requester) = requester else {
            return Err(ForwardError::NotConfigured {
                target: target.clone(),
                message: "no engine URL available for notifications".to_string(),
            }
            .into());
        };
        debug!(%target, "requesting downstream check");
        requester.request_check(target, token, bearer).await?;
    }

    info!(trigger = matched.index, notified = matched.trigger.checks.len(), "new version");
    Ok(vec![matched.version])
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
