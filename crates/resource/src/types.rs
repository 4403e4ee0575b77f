//! Shared value types exchanged with the downstream engine.

use serde::{Deserialize, Serialize};

use crate::EnvelopeToken;

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// `ref` emitted for every qualifying delivery.
///
/// The version identity is fixed; the engine decides what a new check result
/// means. The captured request itself travels in the envelope, not here.
pub const MATCHED_VERSION_REF: &str = "blue";

/// `name` emitted alongside [`MATCHED_VERSION_REF`].
pub const MATCHED_VERSION_NAME: &str = "blood";

/// One entry of the version list written by the check evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionOut {
    #[serde(rename = "ref")]
    pub version_ref: String,
    pub name: String,
}

impl VersionOut {
    /// The fixed marker version signalling "a qualifying change arrived".
    pub fn matched() -> Self {
        Self {
            version_ref: MATCHED_VERSION_REF.to_string(),
            name: MATCHED_VERSION_NAME.to_string(),
        }
    }
}

/// The previous version handed to the check evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionIn {
    #[serde(rename = "ref", default)]
    pub version_ref: Option<EnvelopeToken>,
}

// ---------------------------------------------------------------------------
// Engine check request body
// ---------------------------------------------------------------------------

/// Body POSTed to the engine's check endpoint:
/// `{"version":{"from":{"ref":"<token>"}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequestBody {
    pub version: CheckFrom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFrom {
    pub from: CheckRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRef {
    #[serde(rename = "ref")]
    pub version_ref: EnvelopeToken,
}

impl CheckRequestBody {
    pub fn new(token: EnvelopeToken) -> Self {
        Self {
            version: CheckFrom {
                from: CheckRef { version_ref: token },
            },
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
