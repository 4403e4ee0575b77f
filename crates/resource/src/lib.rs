//! Domain of the GitHub webhook resource.
//!
//! Everything that decides whether a relayed delivery produces a new version
//! lives here: the envelope that carries a captured request through the
//! engine's version history, signature verification, event decoding, and the
//! trigger rules. Infrastructure crates implement the traits defined here; they
//! never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Talking to the downstream engine happens behind [`CheckRequester`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`TeamName`, `DeliveryId`, `ResourceTarget`, etc.) |
//! | [`request`] | The captured HTTP request and its GitHub headers |
//! | [`envelope`] | Encoding a captured request as a version ref and back |
//! | [`signature`] | `X-Hub-Signature` HMAC-SHA1 verification |
//! | [`events`] | Typed GitHub event payloads and their rule fields |
//! | [`config`] | The resource `source` block: secret, triggers, rules |
//! | [`triggers`] | Compiling rules and finding the first matching trigger |
//! | [`types`] | Version documents exchanged with the engine |
//! | [`ports`] | Traits implemented by infrastructure crates |
//! | [`errors`] | Top-level error type for a check |
//! | [`check`] | The check evaluator tying the above together |

pub mod check;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod events;
pub mod identifiers;
pub mod ports;
pub mod request;
pub mod signature;
pub mod triggers;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use check::{evaluate, CheckInput};
pub use config::{RulePattern, Source, Trigger, TriggerRule};
pub use envelope::{EnvelopeError, EnvelopeToken, ENVELOPE_MARKER};
pub use errors::CheckError;
pub use events::{
    Account, BranchRef, Commit, EventError, EventKind, PingEvent, PullRequest, PullRequestEvent,
    PushEvent, Pusher, RefEvent, Repository, WebhookEvent,
};
pub use identifiers::{DeliveryId, PipelineName, ResourceName, ResourceTarget, TeamName};
pub use ports::{CheckRequester, ForwardError};
pub use request::{
    CapturedRequest, HeaderPair, MissingHeader, WebhookMetadata, DELIVERY_HEADER, EVENT_HEADER,
    SIGNATURE_HEADER,
};
pub use triggers::{match_triggers, RuleError, TriggerMatch, TriggerSet};
pub use types::{
    CheckFrom, CheckRef, CheckRequestBody, VersionIn, VersionOut, MATCHED_VERSION_NAME,
    MATCHED_VERSION_REF,
};
