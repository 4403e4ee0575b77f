//! Concourse `check` script for the GitHub webhook resource.
//!
//! Reads `{"source": ..., "version": ...}` from standard input and writes the
//! list of new versions to standard output. Logs and errors go to standard
//! error; on failure nothing is written to standard output and the exit
//! status is non-zero.

use std::{
    env,
    io::{self, IsTerminal, Write},
    process::ExitCode,
};

use anyhow::Context;

use cli::{check_cmd, observability};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = observability::init_check() {
        eprintln!("warning: {e:#}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "check failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let input = check_cmd::read_input(stdin.lock(), interactive)?;

    let atc_url = env::var(check_cmd::ATC_URL_ENV).ok();
    let versions = check_cmd::run(&input, atc_url.as_deref()).await?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &versions).context("failed to write versions")?;
    writeln!(stdout).context("failed to write versions")?;
    Ok(())
}
