//! Newtype domain identifiers.
//!
//! The downstream engine addresses a resource by three path segments (team,
//! pipeline, resource). Each is a distinct newtype so the three cannot be
//! swapped by accident when a check URL is assembled.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
                    .ok_or_else(|| format!("{} must not be empty", stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — downstream engine addressing
// ---------------------------------------------------------------------------

string_id! {
    /// Name of the team that owns a pipeline on the downstream engine.
    TeamName
}

string_id! {
    /// Name of a pipeline within a team.
    PipelineName
}

string_id! {
    /// Name of a resource within a pipeline.
    ResourceName
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub delivery metadata
// ---------------------------------------------------------------------------

string_id! {
    /// GUID GitHub assigns to each webhook delivery (`X-GitHub-Delivery`).
    DeliveryId
}

/// Fully-qualified address of one resource on the downstream engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTarget {
    pub team: TeamName,
    pub pipeline: PipelineName,
    pub resource: ResourceName,
}

impl ResourceTarget {
    /// Creates a target from its three path segments.
    pub fn new(team: TeamName, pipeline: PipelineName, resource: ResourceName) -> Self {
        Self {
            team,
            pipeline,
            resource,
        }
    }

    /// Path of the engine's "check resource" endpoint for this target.
    pub fn check_path(&self) -> String {
        format!(
            "/api/v1/teams/{}/pipelines/{}/resources/{}/check",
            self.team, self.pipeline, self.resource
        )
    }
}

impl std::fmt::Display for ResourceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.team, self.pipeline, self.resource)
    }
}

#[cfg(test)]
#[path = "identifiers_tests.rs"]
mod tests;
