//! Resource `source` configuration as written in a pipeline definition.
//!
//! ```json
//! {
//!   "secret": "s3cr3t",
//!   "insecure": false,
//!   "triggers": [
//!     {
//!       "event": "push",
//!       "rules": [{"ref": "^refs/heads/main$"}, {"ref": "^refs/tags/", "forced": false}],
//!       "checks": [{"team": "main", "pipeline": "deploy", "resource": "app-image"}]
//!     }
//!   ]
//! }
//! ```
//!
//! These types only describe the shape. Patterns are compiled and field
//! names validated in [`crate::triggers`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ResourceTarget;

/// The `source` block of the resource definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Webhook secret shared with GitHub.
    #[serde(default)]
    pub secret: String,

    /// Skip TLS certificate verification on calls to the engine.
    #[serde(default)]
    pub insecure: bool,

    /// Evaluated in order; the first trigger with a matching rule wins.
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

/// One event type and the rules that qualify a delivery of that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// `X-GitHub-Event` label this trigger applies to.
    pub event: String,

    #[serde(default)]
    pub rules: Vec<TriggerRule>,

    /// Other resources to ask the engine to check when this trigger matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<ResourceTarget>,
}

/// Field name → pattern. Every pattern must match for the rule to match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerRule(BTreeMap<String, RulePattern>);

impl TriggerRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the pattern for `field`.
    pub fn with(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.0.insert(field.into(), RulePattern(pattern.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field/pattern pairs in field-name order.
    pub fn patterns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, pattern)| (field.as_str(), pattern.as_str()))
    }
}

/// A regular expression over one event field.
///
/// Pipeline authors may write booleans and numbers (`"forced": true`); those
/// are taken as their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RulePattern(String);

impl RulePattern {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RulePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            Text(String),
            Flag(bool),
            Number(serde_json::Number),
        }

        Ok(match Scalar::deserialize(deserializer)? {
            Scalar::Text(text) => Self(text),
            Scalar::Flag(flag) => Self(flag.to_string()),
            Scalar::Number(number) => Self(number.to_string()),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
