//! Request handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use resource::{
    CapturedRequest, EnvelopeError, EnvelopeToken, ForwardError, PipelineName, ResourceName,
    ResourceTarget, TeamName,
};

use crate::AppState;

/// Failure to relay one delivery.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A path segment is empty.
    #[error("invalid hook target {0:?}")]
    InvalidTarget(String),

    /// A header value is not valid UTF-8 and cannot be captured as text.
    #[error("header {0} is not valid UTF-8")]
    NonUtf8Header(String),

    /// The captured request could not be encoded.
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] EnvelopeError),

    /// The ATC did not accept the check request.
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl RelayError {
    /// Status code returned to the webhook sender.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidTarget(_) => StatusCode::NOT_FOUND,
            Self::NonUtf8Header(_) => StatusCode::BAD_REQUEST,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forward(ForwardError::Rejected { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Forward(ForwardError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Forward(ForwardError::Unavailable { .. } | ForwardError::NotConfigured { .. }) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "relay failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "relay failed");
        }
        status.into_response()
    }
}

/// `GET /health`: 200 with an empty body.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `POST /hook/{team}/{pipeline}/{resource}`.
///
/// Captures the request verbatim, adds the relay token, and makes exactly one
/// check request. Answers 200 once the ATC accepts it.
#[instrument(skip_all, fields(team = %team, pipeline = %pipeline, resource = %resource))]
pub async fn forward_webhook(
    State(state): State<AppState>,
    Path((team, pipeline, resource)): Path<(String, String, String)>,
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RelayError> {
    let target = hook_target(team, pipeline, resource)?;
    let request = capture(&method, &uri, version, &headers, body)?.with_token(state.token.as_ref());
    let token = EnvelopeToken::encode(&request)?;

    state
        .requester
        .request_check(&target, &token, &state.token)
        .await?;

    info!(%target, "check requested");
    Ok(StatusCode::OK)
}

fn hook_target(team: String, pipeline: String, resource: String) -> Result<ResourceTarget, RelayError> {
    let invalid = || RelayError::InvalidTarget(format!("{team}/{pipeline}/{resource}"));
    Ok(ResourceTarget::new(
        TeamName::new(team.clone()).ok_or_else(invalid)?,
        PipelineName::new(pipeline.clone()).ok_or_else(invalid)?,
        ResourceName::new(resource.clone()).ok_or_else(invalid)?,
    ))
}

/// Builds the envelope payload from the parts of an inbound request.
///
/// Header names are lowercased; repeated headers keep one entry per value in
/// arrival order. Values are kept byte for byte, so a value that is not UTF-8
/// is refused rather than altered.
///
/// # Errors
///
/// Returns [`RelayError::NonUtf8Header`] naming the first offending header.
pub fn capture(
    method: &Method,
    uri: &Uri,
    version: Version,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<CapturedRequest, RelayError> {
    let path = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = CapturedRequest::new(method.as_str(), path, format!("{version:?}"));
    for (name, value) in headers {
        let value = std::str::from_utf8(value.as_bytes())
            .map_err(|_| RelayError::NonUtf8Header(name.to_string()))?;
        request = request.with_header(name.as_str(), value);
    }
    Ok(request.with_body(body.to_vec()))
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
