//! Operational status and priority tier enums, and the derived snapshot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PersonId;

/// A person's derived operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    OffShift,
    OnShift,
    Available,
    Busy,
    Break,
    Emergency,
}

impl Status {
    /// String representation for storage and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OffShift => "OFF_SHIFT",
            Self::OnShift => "ON_SHIFT",
            Self::Available => "AVAILABLE",
            Self::Busy => "BUSY",
            Self::Break => "BREAK",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFF_SHIFT" => Ok(Self::OffShift),
            "ON_SHIFT" => Ok(Self::OnShift),
            "AVAILABLE" => Ok(Self::Available),
            "BUSY" => Ok(Self::Busy),
            "BREAK" => Ok(Self::Break),
            "EMERGENCY" => Ok(Self::Emergency),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for status strings outside the known set.
///
/// A stored snapshot carrying one of these is treated as inconsistent
/// state and surfaced, never guessed at.
#[derive(Debug, Clone)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// Fixed urgency ranking of an event's originating source/type.
///
/// The order is total: EMERGENCY outranks BIOMETRIC outranks GEOFENCE
/// outranks TASK outranks CALENDAR. Conflicts are adjudicated by comparing
/// [`Self::rank`], where a smaller rank is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityTier {
    Emergency,
    Biometric,
    Geofence,
    Task,
    Calendar,
}

impl PriorityTier {
    /// Urgency rank. Lower is more urgent.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Emergency => 0,
            Self::Biometric => 1,
            Self::Geofence => 2,
            Self::Task => 3,
            Self::Calendar => 4,
        }
    }

    /// String representation for storage and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Biometric => "BIOMETRIC",
            Self::Geofence => "GEOFENCE",
            Self::Task => "TASK",
            Self::Calendar => "CALENDAR",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMERGENCY" => Ok(Self::Emergency),
            "BIOMETRIC" => Ok(Self::Biometric),
            "GEOFENCE" => Ok(Self::Geofence),
            "TASK" => Ok(Self::Task),
            "CALENDAR" => Ok(Self::Calendar),
            _ => Err(UnknownTier(s.to_string())),
        }
    }
}

impl Serialize for PriorityTier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PriorityTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for tier strings outside the known set.
#[derive(Debug, Clone)]
pub struct UnknownTier(pub String);

impl fmt::Display for UnknownTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority tier: {}", self.0)
    }
}

impl std::error::Error for UnknownTier {}

/// The engine's belief about a person's status at a point in time.
///
/// Snapshots are append-only history entries; they are never mutated or
/// deleted, and "current status" means the snapshot with the maximum
/// timestamp for the person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub person_id: PersonId,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    pub tier: PriorityTier,
    pub reason: String,
}

/// A proposed status transition produced by the rule evaluator.
///
/// Candidates are values, not history: only the conflict resolver decides
/// whether one becomes a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub status: Status,
    pub reason: &'static str,
    pub tier: PriorityTier,
}
