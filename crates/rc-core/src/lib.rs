//! Core domain logic for the rollcall presence engine.
//!
//! This crate contains the pure building blocks of status resolution:
//! - Classification: mapping an event's source/type to an urgency tier
//! - Rule evaluation: deriving a candidate status from an event
//! - Conflict resolution: adjudicating the candidate against the
//!   persisted snapshot by tier, then by event time
//! - Shift windows: duty-interval membership with trailing grace
//!
//! Nothing here performs I/O; storage and transport live in `rc-db` and
//! the CLI crate.

pub mod classify;
pub mod event;
pub mod resolve;
pub mod rules;
pub mod shift;
pub mod status;
pub mod types;

pub use classify::classify;
pub use event::{EventSource, PresenceEvent};
pub use resolve::{Resolution, Winner, resolve};
pub use rules::{RuleContext, evaluate};
pub use shift::{SHIFT_GRACE, ShiftWindow, any_active};
pub use status::{
    Candidate, PriorityTier, Status, StatusSnapshot, UnknownStatus, UnknownTier,
};
pub use types::{EventId, EventKind, PersonId, ValidationError};
