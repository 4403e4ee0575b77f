//! Concourse ATC client adapter.
//!
//! Implements the [`resource::CheckRequester`] trait over the ATC's
//! "check resource" endpoint:
//!
//! ```text
//! POST {base}/api/v1/teams/{team}/pipelines/{pipeline}/resources/{resource}/check
//! Authorization: Bearer {token}
//! Content-Type: application/json
//!
//! {"version":{"from":{"ref":"<envelope token>"}}}
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL assembly, TLS policy, timeouts, and the mapping from
//! HTTP outcomes to [`resource::ForwardError`] live here. The [`resource`]
//! crate sees only [`resource::CheckRequester`].
//!
//! TLS verification is decided once per client from
//! [`ClientConfig::insecure`]; nothing process-wide is touched.

pub mod client;

pub use client::{ClientConfig, ClientError, ConcourseClient, DEFAULT_TIMEOUT};
