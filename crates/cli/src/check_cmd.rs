//! The resource's `check` executable.

use std::io::Read;

use tracing::warn;

use concourse::{ClientConfig, ConcourseClient};
use resource::{evaluate, CheckError, CheckInput, CheckRequester, Source, VersionOut};

/// Environment variable through which the engine tells a resource container
/// where the ATC is.
pub const ATC_URL_ENV: &str = "ATC_EXTERNAL_URL";

/// Reads and parses the check request.
///
/// # Errors
///
/// Returns [`CheckError::InputUnreadable`] when `interactive` is set (nobody
/// is piping a request in), when reading fails, or when the document is not a
/// valid check request.
pub fn read_input(mut reader: impl Read, interactive: bool) -> Result<CheckInput, CheckError> {
    if interactive {
        return Err(CheckError::input_unreadable(
            "standard input is a terminal; expected a check request",
        ));
    }
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(CheckError::input_unreadable)?;
    CheckInput::from_slice(&buf)
}

/// Builds the client used for `checks` notifications.
///
/// Returns `None` when no ATC URL is known or it cannot be used; a match that
/// needs notifications then fails inside [`evaluate`].
pub fn requester_for(source: &Source, atc_url: Option<&str>) -> Option<ConcourseClient> {
    let atc_url = atc_url.filter(|url| !url.is_empty())?;
    let config = match ClientConfig::parse(atc_url) {
        Ok(config) => config.with_insecure(source.insecure),
        Err(e) => {
            warn!(error = %e, "ignoring {ATC_URL_ENV}");
            return None;
        }
    };
    match ConcourseClient::new(config) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "cannot build ATC client");
            None
        }
    }
}

/// Runs one check against `input`.
///
/// # Errors
///
/// Propagates every fatal [`CheckError`].
pub async fn run(input: &CheckInput, atc_url: Option<&str>) -> Result<Vec<VersionOut>, CheckError> {
    let client = requester_for(&input.source, atc_url);
    evaluate(input, client.as_ref().map(|c| c as &dyn CheckRequester)).await
}

#[cfg(test)]
#[path = "check_cmd_tests.rs"]
mod tests;
