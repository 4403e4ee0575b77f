//! Typed GitHub webhook events.
//!
//! [`WebhookEvent::decode`] is the single point where the `X-GitHub-Event`
//! label selects a variant. Each variant only parses the parts of GitHub's
//! payload that are exposed to trigger rules; everything else in the JSON is
//! ignored.
//!
//! ## Rule fields
//!
//! Trigger rules address event data by flat field name. Every variant owns a
//! static table mapping each name it exposes to an accessor returning the
//! value as a string. Adding an event type means adding a variant, its
//! payload struct and its table; the matcher in [`crate::triggers`] never
//! changes.
//!
//! | Event | Fields |
//! |-------|--------|
//! | `push` | `ref`, `before`, `after`, `base_ref`, `created`, `deleted`, `forced`, `compare`, `commit`, `message`, `repository`, `pusher`, `sender` |
//! | `pull_request` | `action`, `number`, `title`, `state`, `draft`, `merged`, `head_ref`, `head_sha`, `base_ref`, `base_sha`, `author`, `repository`, `sender` |
//! | `ping` | `zen`, `hook_id`, `repository`, `sender` |
//! | `create`, `delete` | `ref`, `ref_type`, `repository`, `sender` |
//!
//! Booleans render as `true` / `false`, numbers in decimal.

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The webhook event types this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Push,
    PullRequest,
    Ping,
    Create,
    Delete,
}

impl EventKind {
    /// Maps an `X-GitHub-Event` label to a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "push" => Some(Self::Push),
            "pull_request" => Some(Self::PullRequest),
            "ping" => Some(Self::Ping),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The `X-GitHub-Event` label for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Ping => "ping",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }

    /// Names of the rule fields this kind exposes, in table order.
    pub fn field_names(self) -> Vec<&'static str> {
        match self {
            Self::Push => names_of::<PushEvent>(),
            Self::PullRequest => names_of::<PullRequestEvent>(),
            Self::Ping => names_of::<PingEvent>(),
            Self::Create | Self::Delete => names_of::<RefEvent>(),
        }
    }

    /// Returns `true` if rules for this kind may reference `name`.
    pub fn has_field(self, name: &str) -> bool {
        self.field_names().contains(&name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Decoded events
// ---------------------------------------------------------------------------

/// A decoded webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Push(PushEvent),
    PullRequest(PullRequestEvent),
    Ping(PingEvent),
    Create(RefEvent),
    Delete(RefEvent),
}

impl WebhookEvent {
    /// Parses `body` as the payload for the `event_type` label.
    ///
    /// # Errors
    ///
    /// - [`EventError::UnknownEventType`] if the label has no variant.
    /// - [`EventError::MalformedEventBody`] if the body does not parse into
    ///   the variant's shape.
    pub fn decode(event_type: &str, body: &[u8]) -> Result<Self, EventError> {
        let kind = EventKind::from_label(event_type).ok_or_else(|| EventError::UnknownEventType {
            event: event_type.to_string(),
        })?;

        let parsed = match kind {
            EventKind::Push => serde_json::from_slice(body).map(Self::Push),
            EventKind::PullRequest => serde_json::from_slice(body).map(Self::PullRequest),
            EventKind::Ping => serde_json::from_slice(body).map(Self::Ping),
            EventKind::Create => serde_json::from_slice(body).map(Self::Create),
            EventKind::Delete => serde_json::from_slice(body).map(Self::Delete),
        };

        parsed.map_err(|source| EventError::MalformedEventBody { event: kind, source })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Push(_) => EventKind::Push,
            Self::PullRequest(_) => EventKind::PullRequest,
            Self::Ping(_) => EventKind::Ping,
            Self::Create(_) => EventKind::Create,
            Self::Delete(_) => EventKind::Delete,
        }
    }

    /// Reads a rule field.
    ///
    /// The outer `Option` is `None` when the variant has no such field; the
    /// inner one is `None` when the field exists but the payload left it
    /// empty (for example `base_ref` on an ordinary push).
    pub fn field(&self, name: &str) -> Option<Option<String>> {
        match self {
            Self::Push(event) => read_field(event, name),
            Self::PullRequest(event) => read_field(event, name),
            Self::Ping(event) => read_field(event, name),
            Self::Create(event) | Self::Delete(event) => read_field(event, name),
        }
    }
}

/// The event could not be decoded.
#[derive(Debug, Error)]
pub enum EventError {
    /// The `X-GitHub-Event` label does not map to a supported variant.
    #[error("unsupported webhook event type '{event}'")]
    UnknownEventType { event: String },

    /// The body is not a valid payload for the event type.
    #[error("malformed {event} event body: {source}")]
    MalformedEventBody {
        event: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Field tables
// ---------------------------------------------------------------------------

type Accessor<E> = fn(&E) -> Option<String>;

/// Static name → accessor table for one payload type.
trait RuleFields: Sized + 'static {
    const FIELDS: &'static [(&'static str, Accessor<Self>)];
}

fn names_of<E: RuleFields>() -> Vec<&'static str> {
    E::FIELDS.iter().map(|(name, _)| *name).collect()
}

fn read_field<E: RuleFields>(event: &E, name: &str) -> Option<Option<String>> {
    E::FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, get)| get(event))
}

fn login(account: &Option<Account>) -> Option<String> {
    account.as_ref().map(|a| a.login.clone())
}

fn full_name(repository: &Option<Repository>) -> Option<String> {
    repository.as_ref().map(|r| r.full_name.clone())
}

// ---------------------------------------------------------------------------
// Shared payload fragments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub login: String,
}

// ---------------------------------------------------------------------------
// push
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub base_ref: Option<String>,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub forced: bool,
    #[serde(default)]
    pub compare: Option<String>,
    #[serde(default)]
    pub head_commit: Option<Commit>,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub pusher: Option<Pusher>,
    #[serde(default)]
    pub sender: Option<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pusher {
    pub name: String,
}

impl RuleFields for PushEvent {
    const FIELDS: &'static [(&'static str, Accessor<Self>)] = &[
        ("ref", |e| Some(e.git_ref.clone())),
        ("before", |e| e.before.clone()),
        ("after", |e| e.after.clone()),
        ("base_ref", |e| e.base_ref.clone()),
        ("created", |e| Some(e.created.to_string())),
        ("deleted", |e| Some(e.deleted.to_string())),
        ("forced", |e| Some(e.forced.to_string())),
        ("compare", |e| e.compare.clone()),
        ("commit", |e| e.head_commit.as_ref().map(|c| c.id.clone())),
        ("message", |e| e.head_commit.as_ref().map(|c| c.message.clone())),
        ("repository", |e| full_name(&e.repository)),
        ("pusher", |e| e.pusher.as_ref().map(|p| p.name.clone())),
        ("sender", |e| login(&e.sender)),
    ];
}

// ---------------------------------------------------------------------------
// pull_request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub number: u64,
    pub pull_request: PullRequest,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged: Option<bool>,
    pub head: BranchRef,
    pub base: BranchRef,
    #[serde(default)]
    pub user: Option<Account>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub sha: String,
}

impl RuleFields for PullRequestEvent {
    const FIELDS: &'static [(&'static str, Accessor<Self>)] = &[
        ("action", |e| Some(e.action.clone())),
        ("number", |e| Some(e.number.to_string())),
        ("title", |e| Some(e.pull_request.title.clone())),
        ("state", |e| Some(e.pull_request.state.clone())),
        ("draft", |e| Some(e.pull_request.draft.to_string())),
        ("merged", |e| e.pull_request.merged.map(|m| m.to_string())),
        ("head_ref", |e| Some(e.pull_request.head.git_ref.clone())),
        ("head_sha", |e| Some(e.pull_request.head.sha.clone())),
        ("base_ref", |e| Some(e.pull_request.base.git_ref.clone())),
        ("base_sha", |e| Some(e.pull_request.base.sha.clone())),
        ("author", |e| login(&e.pull_request.user)),
        ("repository", |e| full_name(&e.repository)),
        ("sender", |e| login(&e.sender)),
    ];
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PingEvent {
    #[serde(default)]
    pub zen: String,
    pub hook_id: u64,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<Account>,
}

impl RuleFields for PingEvent {
    const FIELDS: &'static [(&'static str, Accessor<Self>)] = &[
        ("zen", |e| Some(e.zen.clone())),
        ("hook_id", |e| Some(e.hook_id.to_string())),
        ("repository", |e| full_name(&e.repository)),
        ("sender", |e| login(&e.sender)),
    ];
}

// ---------------------------------------------------------------------------
// create / delete
// ---------------------------------------------------------------------------

/// Payload shared by `create` and `delete` (branch or tag lifecycle).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub ref_type: String,
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(default)]
    pub sender: Option<Account>,
}

impl RuleFields for RefEvent {
    const FIELDS: &'static [(&'static str, Accessor<Self>)] = &[
        ("ref", |e| Some(e.git_ref.clone())),
        ("ref_type", |e| Some(e.ref_type.clone())),
        ("repository", |e| full_name(&e.repository)),
        ("sender", |e| login(&e.sender)),
    ];
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
