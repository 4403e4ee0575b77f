//! `webhook-relay` arguments and startup.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use concourse::{ClientConfig, ConcourseClient};
use relay::{create_router, AppState};

use crate::observability::LogFormat;

/// Relays GitHub webhooks to Concourse resource checks.
#[derive(Debug, Clone, Parser)]
#[command(name = "webhook-relay", version, about)]
pub struct RelayArgs {
    /// Listening address for incoming requests.
    #[arg(long, env = "WEBHOOK_RELAY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Concourse URL to forward the request to.
    #[arg(long, env = "CONCOURSE_URL", default_value = "http://localhost:8888")]
    pub concourse_url: String,

    /// Bearer token sent to Concourse.
    #[arg(long, env = "CONCOURSE_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    /// Disable TLS certificate verification towards Concourse.
    #[arg(long, env = "CONCOURSE_INSECURE")]
    pub insecure: bool,

    /// Seconds to wait for Concourse before giving up.
    #[arg(
        long,
        env = "WEBHOOK_RELAY_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OpenTelemetry collector (OTLP/gRPC) to export spans to.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl RelayArgs {
    /// Client settings for reaching Concourse.
    ///
    /// # Errors
    ///
    /// Returns an error if `--concourse-url` is not an absolute URL.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        Ok(ClientConfig::parse(&self.concourse_url)
            .context("invalid --concourse-url")?
            .with_insecure(self.insecure)
            .with_timeout(Duration::from_secs(self.timeout)))
    }
}

/// Builds the relay from `args` and serves until shutdown.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the address cannot be bound.
pub async fn run(args: RelayArgs) -> anyhow::Result<()> {
    let client = ConcourseClient::new(args.client_config()?)
        .context("failed to build Concourse client")?;

    info!(
        bind = %args.bind,
        concourse_url = %client.config().base_url,
        insecure = args.insecure,
        timeout_secs = args.timeout,
        "starting webhook relay"
    );

    let state = AppState::new(Arc::new(client), args.token);
    relay::serve(args.bind, create_router(state))
        .await
        .with_context(|| format!("relay failed on {}", args.bind))
}

#[cfg(test)]
#[path = "relay_cmd_tests.rs"]
mod tests;
