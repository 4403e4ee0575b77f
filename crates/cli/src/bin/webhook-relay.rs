//! GitHub webhook relay for Concourse.
//!
//! Accepts `POST /hook/{team}/{pipeline}/{resource}` and asks Concourse to
//! check that resource from the captured request. See `--help` for options.

use clap::Parser;

use cli::{
    observability,
    relay_cmd::{self, RelayArgs},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = RelayArgs::parse();
    let _telemetry =
        observability::init_relay("webhook-relay", args.log_format, args.otlp_endpoint.as_deref())?;

    relay_cmd::run(args).await
}
