//! Composition root for the two executables.
//!
//! - `webhook-relay`: parses [`relay_cmd::RelayArgs`], builds a
//!   [`concourse::ConcourseClient`], and serves the [`relay`] router.
//! - `check`: the resource's check script: reads the check request from
//!   standard input, runs [`resource::evaluate`], and prints the version list.
//!
//! Observability is wired here and nowhere else. Every `tracing` span and event
//! emitted by the workspace crates flows through the subscriber installed by
//! [`observability`].

pub mod check_cmd;
pub mod observability;
pub mod relay_cmd;
