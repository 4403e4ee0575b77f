//! `reqwest` client for the ATC check endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use resource::{CheckRequestBody, CheckRequester, EnvelopeToken, ForwardError, ResourceTarget};

/// Upper bound on one check request when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`ConcourseClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the ATC. Any path is replaced per request.
    pub base_url: Url,

    /// Skip TLS certificate verification.
    pub insecure: bool,

    /// Overall deadline for one check request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration with certificate verification on and the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parses `base_url` and builds a default configuration from it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL.
    pub fn parse(base_url: &str) -> Result<Self, ClientError> {
        let url = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ClientError::NotABase {
                url: base_url.to_string(),
            });
        }
        Ok(Self::new(url))
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors raised while building a [`ConcourseClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid ATC URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("ATC URL {url:?} cannot carry a path")]
    NotABase { url: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Requests resource checks from a Concourse ATC.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ConcourseClient {
    http: Client,
    config: ClientConfig,
}

impl ConcourseClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the underlying HTTP client cannot be
    /// constructed with the given TLS settings.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of the check endpoint for `target`.
    pub fn check_url(&self, target: &ResourceTarget) -> Url {
        let mut url = self.config.base_url.clone();
        url.set_path(&target.check_path());
        url.set_query(None);
        url
    }
}

#[async_trait]
impl CheckRequester for ConcourseClient {
    #[instrument(skip_all, fields(%target))]
    async fn request_check(
        &self,
        target: &ResourceTarget,
        token: &EnvelopeToken,
        bearer: &str,
    ) -> Result<(), ForwardError> {
        let url = self.check_url(target);
        debug!(%url, "requesting check");

        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(&CheckRequestBody::new(token.clone()))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "check request failed");
                if e.is_timeout() {
                    ForwardError::Timeout {
                        target: target.clone(),
                    }
                } else {
                    ForwardError::Unavailable {
                        target: target.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "check rejected");
            return Err(ForwardError::Rejected {
                target: target.clone(),
                status: status.as_u16(),
            });
        }

        debug!(status = status.as_u16(), "check accepted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
