//! Conflict resolution between a candidate and the persisted snapshot.

use chrono::{DateTime, Utc};

use crate::status::{Candidate, PriorityTier, Status, StatusSnapshot};

/// Which side of a conflict the resolver picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Candidate,
    Incumbent,
}

/// The resolver's decision, tagged explicitly.
///
/// When the incumbent wins, its status, reason, and recorded tier are
/// carried forward so a re-affirming snapshot can still be appended and
/// history stays walk-forward continuous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub winner: Winner,
    pub status: Status,
    pub reason: String,
    pub tier: PriorityTier,
}

/// Adjudicates the candidate against the current snapshot.
///
/// Tier rank decides first (smaller rank is more urgent); within the same
/// tier, the later event timestamp wins. Event time is what orders
/// same-tier signals, so out-of-order delivery within a tier cannot roll a
/// person's status backwards, and a panic signal is never overwritten by a
/// late lower-tier read.
#[must_use]
pub fn resolve(
    candidate: &Candidate,
    current: Option<&StatusSnapshot>,
    event_ts: DateTime<Utc>,
) -> Resolution {
    let Some(current) = current else {
        return won_by_candidate(candidate);
    };

    let candidate_rank = candidate.tier.rank();
    let current_rank = current.tier.rank();

    if candidate_rank < current_rank
        || (candidate_rank == current_rank && event_ts >= current.timestamp)
    {
        return won_by_candidate(candidate);
    }

    Resolution {
        winner: Winner::Incumbent,
        status: current.status,
        reason: current.reason.clone(),
        tier: current.tier,
    }
}

fn won_by_candidate(candidate: &Candidate) -> Resolution {
    Resolution {
        winner: Winner::Candidate,
        status: candidate.status,
        reason: candidate.reason.to_string(),
        tier: candidate.tier,
    }
}
