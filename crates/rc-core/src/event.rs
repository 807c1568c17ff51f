//! Presence signals from source systems.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EventId, EventKind, PersonId};

/// The channel a presence signal arrived from.
///
/// The set is closed; source strings outside it parse as [`Self::Other`]
/// so that new producers degrade to the lowest-confidence handling instead
/// of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Biometric,
    Mobile,
    Task,
    Calendar,
    Panic,
    Other,
}

impl EventSource {
    /// String representation for storage and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Biometric => "biometric",
            Self::Mobile => "mobile",
            Self::Task => "task",
            Self::Calendar => "calendar",
            Self::Panic => "panic",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "biometric" => Self::Biometric,
            "mobile" => Self::Mobile,
            "task" => Self::Task,
            "calendar" => Self::Calendar,
            "panic" => Self::Panic,
            _ => Self::Other,
        })
    }
}

impl Serialize for EventSource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(source) = s.parse::<Self>();
        Ok(source)
    }
}

/// An immutable presence fact emitted by a source system.
///
/// Events are never updated or deleted once stored; the event log is the
/// source of truth for audit and replay. The `id` is the idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceEvent {
    /// Globally unique idempotency key.
    pub id: EventId,
    /// The person this signal is about.
    pub person_id: PersonId,
    /// When the signal occurred at the source (not arrival time).
    pub timestamp: DateTime<Utc>,
    /// The originating channel.
    pub source: EventSource,
    /// Free-form event type, e.g. `entry`, `exit`, `assigned`, `geo_exit`.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Optional source-specific context as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}
