//! Trigger rule matching.
//!
//! [`TriggerSet::compile`] validates a configured trigger list once: each rule
//! field must appear in its event kind's field table, and each pattern must be
//! a valid regular expression. Triggers whose label names no supported
//! [`EventKind`] can never match a delivery and are skipped with a warning. [`TriggerSet::find_match`] then walks the triggers for
//! the delivered event's kind in configuration order and returns the first one
//! with a matching rule.
//!
//! ## Matching rules
//!
//! - A rule matches when every one of its patterns finds a match anywhere in
//!   the field's value (unanchored search; use `^`/`$` to anchor).
//! - A field the payload left empty (e.g. `base_ref` on a plain push) never
//!   matches.
//! - A rule with no fields never matches, and neither does a trigger with no
//!   rules.

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{EventKind, Trigger, VersionOut, WebhookEvent};

/// A configured trigger list with all patterns compiled.
#[derive(Debug)]
pub struct TriggerSet<'a> {
    triggers: Vec<CompiledTrigger<'a>>,
}

#[derive(Debug)]
struct CompiledTrigger<'a> {
    index: usize,
    kind: EventKind,
    config: &'a Trigger,
    rules: Vec<CompiledRule>,
}

#[derive(Debug)]
struct CompiledRule {
    patterns: Vec<(String, Regex)>,
}

/// The trigger that qualified a delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMatch<'a> {
    /// Position of the trigger in the configured list.
    pub index: usize,
    pub trigger: &'a Trigger,
    pub version: VersionOut,
}

/// The trigger configuration cannot be evaluated.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule names a field its event kind does not expose.
    #[error("{event} events have no field '{field}' (available: {available})")]
    UnknownField {
        event: EventKind,
        field: String,
        available: String,
    },

    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

impl<'a> TriggerSet<'a> {
    /// Validates and compiles `triggers`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] found, in configuration order.
    pub fn compile(triggers: &'a [Trigger]) -> Result<Self, RuleError> {
        let triggers = triggers
            .iter()
            .enumerate()
            .filter_map(|(index, config)| compile_trigger(index, config).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { triggers })
    }

    /// Finds the first trigger for `event`'s kind with a matching rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownField`] if a rule reads a field the event
    /// does not expose. Compilation already rejects such rules, so this only
    /// fires if the field tables and compiled rules disagree.
    pub fn find_match(&self, event: &WebhookEvent) -> Result<Option<TriggerMatch<'a>>, RuleError> {
        let kind = event.kind();

        for trigger in &self.triggers {
            if trigger.kind != kind {
                continue;
            }
            for (rule_index, rule) in trigger.rules.iter().enumerate() {
                if rule.matches(kind, event)? {
                    debug!(trigger = trigger.index, rule = rule_index, event = %kind, "trigger rule matched");
                    return Ok(Some(TriggerMatch {
                        index: trigger.index,
                        trigger: trigger.config,
                        version: VersionOut::matched(),
                    }));
                }
            }
        }

        Ok(None)
    }
}

impl CompiledRule {
    fn matches(&self, kind: EventKind, event: &WebhookEvent) -> Result<bool, RuleError> {
        if self.patterns.is_empty() {
            return Ok(false);
        }

        for (field, pattern) in &self.patterns {
            let value = event
                .field(field)
                .ok_or_else(|| unknown_field(kind, field))?;

            match value {
                Some(value) if pattern.is_match(&value) => {}
                _ => return Ok(false),
            }
        }

        Ok(true)
    }
}

/// Convenience wrapper: compile `triggers` and match `event` in one step.
///
/// # Errors
///
/// See [`TriggerSet::compile`] and [`TriggerSet::find_match`].
pub fn match_triggers<'a>(
    event: &WebhookEvent,
    triggers: &'a [Trigger],
) -> Result<Option<TriggerMatch<'a>>, RuleError> {
    TriggerSet::compile(triggers)?.find_match(event)
}

fn compile_trigger(index: usize, config: &Trigger) -> Result<Option<CompiledTrigger<'_>>, RuleError> {
    let Some(kind) = EventKind::from_label(&config.event) else {
        warn!(trigger = index, event = %config.event, "skipping trigger for unsupported event type");
        return Ok(None);
    };

    let rules = config
        .rules
        .iter()
        .map(|rule| {
            let patterns = rule
                .patterns()
                .map(|(field, pattern)| {
                    if !kind.has_field(field) {
                        return Err(unknown_field(kind, field));
                    }
                    let regex = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
                        field: field.to_string(),
                        source,
                    })?;
                    Ok((field.to_string(), regex))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompiledRule { patterns })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(CompiledTrigger {
        index,
        kind,
        config,
        rules,
    }))
}

fn unknown_field(kind: EventKind, field: &str) -> RuleError {
    RuleError::UnknownField {
        event: kind,
        field: field.to_string(),
        available: kind.field_names().join(", "),
    }
}

#[cfg(test)]
#[path = "triggers_tests.rs"]
mod tests;
