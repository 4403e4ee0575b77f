//! Port traits implemented by infrastructure crates.
//!
//! The domain never talks HTTP itself. Anything that asks the downstream
//! engine to run a check goes through [`CheckRequester`]; the `concourse`
//! crate supplies the real implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::{EnvelopeToken, ResourceTarget};

/// Asks the downstream engine to check a resource from a given version.
#[async_trait]
pub trait CheckRequester: Send + Sync {
    /// Requests a check of `target` starting from the version `token`,
    /// authenticating with `bearer`.
    ///
    /// Exactly one request is made; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError`] when the engine cannot be reached, does not
    /// answer in time, or answers with a non-success status.
    async fn request_check(
        &self,
        target: &ResourceTarget,
        token: &EnvelopeToken,
        bearer: &str,
    ) -> Result<(), ForwardError>;
}

/// A check request did not succeed.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The engine answered with a non-success status.
    #[error("check of {target} rejected with status {status}")]
    Rejected { target: ResourceTarget, status: u16 },

    /// No answer within the configured timeout.
    #[error("check of {target} timed out")]
    Timeout { target: ResourceTarget },

    /// The engine could not be reached at all.
    #[error("engine unreachable while checking {target}: {message}")]
    Unavailable {
        target: ResourceTarget,
        message: String,
    },

    /// No engine URL is configured, so no request can be made.
    #[error("cannot request check of {target}: {message}")]
    NotConfigured {
        target: ResourceTarget,
        message: String,
    },
}

impl ForwardError {
    /// The downstream status code to surface, when the engine gave one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
