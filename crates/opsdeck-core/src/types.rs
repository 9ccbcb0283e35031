use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ─── Alert Status ─────────────────────────────────────────────────

/// Lifecycle status of a server-side alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub const ALL: [Self; 3] = [Self::Open, Self::Acknowledged, Self::Resolved];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "ACKNOWLEDGED" => Ok(Self::Acknowledged),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(ConsoleError::Validation(format!(
                "unknown alert status: {s}"
            ))),
        }
    }
}

// ─── Alert ────────────────────────────────────────────────────────

/// Key in [`Alert::context`] carrying the alert sub-type tag.
pub const CONTEXT_ALERT_TYPE: &str = "alertType";

/// Key in [`Alert::context`] carrying the originating resource path.
pub const CONTEXT_RESOURCE_PATH: &str = "resourcePath";

/// A server-side alert record. The console reads and annotates these;
/// it never constructs them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub status: AlertStatus,
    /// Free-form context map; `alertType` and `resourcePath` are the
    /// keys the routing layer cares about.
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(rename = "dataId", default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<String>,
    /// Alert start in epoch milliseconds.
    #[serde(rename = "start")]
    pub start_ms: i64,
    /// Alert end in epoch milliseconds, if the condition has cleared.
    #[serde(rename = "end", default, skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<i64>,
    #[serde(rename = "ackBy", default, skip_serializing_if = "Option::is_none")]
    pub ack_by: Option<String>,
    #[serde(rename = "ackNotes", default, skip_serializing_if = "Option::is_none")]
    pub ack_notes: Option<String>,
    #[serde(
        rename = "resolvedBy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_by: Option<String>,
    #[serde(
        rename = "resolvedNotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_notes: Option<String>,
}

impl Alert {
    /// The `alertType` tag from the context map, if present.
    pub fn alert_type(&self) -> Option<&str> {
        self.context.get(CONTEXT_ALERT_TYPE).map(String::as_str)
    }

    /// The `resourcePath` tag from the context map, if present.
    pub fn resource_path(&self) -> Option<&str> {
        self.context.get(CONTEXT_RESOURCE_PATH).map(String::as_str)
    }
}

// ─── Persona ──────────────────────────────────────────────────────

/// A tenant-like identity context scoping backend queries.
/// Exactly one persona is current at any time; switching is explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdAt", default)]
    pub created_at_ms: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at_ms: i64,
}

// ─── Alert Query ──────────────────────────────────────────────────

/// Identity of one alert fetch. The poll cache keys its latest-known
/// results by this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertQuery {
    pub resource_id: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub statuses: Vec<AlertStatus>,
}

impl AlertQuery {
    /// Query for open alerts on one resource — the shape the routing
    /// layer always uses.
    pub fn open_alerts(resource_id: &str, start_ms: i64, end_ms: i64) -> Self {
        Self {
            resource_id: resource_id.to_owned(),
            start_ms,
            end_ms,
            statuses: vec![AlertStatus::Open],
        }
    }
}

/// Full result of one alert fetch, before any per-consumer filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertQueryResult {
    pub alerts: Vec<Alert>,
}

// ─── Error ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("no current persona")]
    NoCurrentPersona,
}

// ─── Tests ────────────────────────────────────────────────────────
