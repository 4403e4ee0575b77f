//! Webhook relay.
//!
//! Receives GitHub webhook deliveries on
//! `POST /hook/{team}/{pipeline}/{resource}`, captures the whole request into
//! an [`resource::EnvelopeToken`], and asks the ATC to check the addressed
//! resource from that token. The resource's check then validates and matches
//! the delivery; the relay never inspects the payload.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP routing, request capture, and the mapping from
//! forwarding failures to status codes live here. Talking to the ATC happens
//! through [`resource::CheckRequester`], injected by the composition root.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`handlers`] | `/health` and `/hook/...` handlers, [`RelayError`] |
//! | [`server`] | Router assembly, access log, bind-and-serve with graceful shutdown |

pub mod handlers;
pub mod server;

use std::sync::Arc;

use resource::CheckRequester;

pub use handlers::RelayError;
pub use server::{create_router, serve, MAX_BODY_BYTES};

/// State shared by every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Client used to ask the ATC for a check.
    pub requester: Arc<dyn CheckRequester>,

    /// Bearer token sent to the ATC and carried inside each envelope.
    pub token: Arc<str>,
}

impl AppState {
    pub fn new(requester: Arc<dyn CheckRequester>, token: impl Into<Arc<str>>) -> Self {
        Self {
            requester,
            token: token.into(),
        }
    }
}
