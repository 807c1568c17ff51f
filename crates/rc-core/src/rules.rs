//! Status inference rules.
//!
//! The precedence table is data: an ordered slice of (predicate, outcome)
//! entries walked top to bottom, first match wins. Each row is testable on
//! its own and the ordering is visible in one place instead of being buried
//! in nested control flow.

use crate::classify::classify;
use crate::event::{EventSource, PresenceEvent};
use crate::status::{Candidate, PriorityTier, Status, StatusSnapshot};

/// Inputs a rule predicate may inspect.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub source: EventSource,
    pub kind: &'a str,
    pub current: Option<&'a StatusSnapshot>,
    pub shift_active: bool,
}

enum Outcome {
    /// A fixed status transition.
    Set {
        status: Status,
        reason: &'static str,
        tier: PriorityTier,
    },
    /// OFF_SHIFT because no shift window covers the event.
    OutsideShift,
}

struct Rule {
    name: &'static str,
    when: fn(&RuleContext<'_>) -> bool,
    then: Outcome,
}

fn kind_panic(ctx: &RuleContext<'_>) -> bool {
    ctx.kind == "panic"
}

fn biometric_entry(ctx: &RuleContext<'_>) -> bool {
    ctx.source == EventSource::Biometric && ctx.kind == "entry"
}

fn biometric_exit(ctx: &RuleContext<'_>) -> bool {
    ctx.source == EventSource::Biometric && ctx.kind == "exit"
}

fn task_assigned(ctx: &RuleContext<'_>) -> bool {
    ctx.source == EventSource::Task && ctx.kind == "assigned"
}

fn task_completed(ctx: &RuleContext<'_>) -> bool {
    ctx.source == EventSource::Task && ctx.kind == "completed"
}

fn geo_enter_on_shift(ctx: &RuleContext<'_>) -> bool {
    ctx.source == EventSource::Mobile && ctx.kind == "geo_enter" && ctx.shift_active
}

fn geo_exit(ctx: &RuleContext<'_>) -> bool {
    ctx.kind == "geo_exit"
}

fn outside_shift(ctx: &RuleContext<'_>) -> bool {
    !ctx.shift_active
}

static RULES: &[Rule] = &[
    Rule {
        name: "panic",
        when: kind_panic,
        then: Outcome::Set {
            status: Status::Emergency,
            reason: "panic button",
            tier: PriorityTier::Emergency,
        },
    },
    Rule {
        name: "biometric_entry",
        when: biometric_entry,
        then: Outcome::Set {
            status: Status::OnShift,
            reason: "biometric entry",
            tier: PriorityTier::Biometric,
        },
    },
    Rule {
        name: "biometric_exit",
        when: biometric_exit,
        then: Outcome::Set {
            status: Status::OffShift,
            reason: "biometric exit",
            tier: PriorityTier::Biometric,
        },
    },
    Rule {
        name: "task_assigned",
        when: task_assigned,
        then: Outcome::Set {
            status: Status::Busy,
            reason: "task assigned",
            tier: PriorityTier::Task,
        },
    },
    Rule {
        name: "task_completed",
        when: task_completed,
        then: Outcome::Set {
            status: Status::Available,
            reason: "task completed",
            tier: PriorityTier::Task,
        },
    },
    Rule {
        name: "geo_enter_on_shift",
        when: geo_enter_on_shift,
        then: Outcome::Set {
            status: Status::Available,
            reason: "geofence entry during shift",
            tier: PriorityTier::Geofence,
        },
    },
    Rule {
        name: "geo_exit",
        when: geo_exit,
        then: Outcome::Set {
            status: Status::Break,
            reason: "geofence exit",
            tier: PriorityTier::Geofence,
        },
    },
    Rule {
        name: "outside_shift",
        when: outside_shift,
        then: Outcome::OutsideShift,
    },
];

/// Maps an event, the current snapshot, and the shift-activity flag to a
/// candidate status transition.
///
/// Pure and total: every well-formed event yields a candidate. With no
/// prior snapshot the carried default is OFF_SHIFT.
#[must_use]
pub fn evaluate(
    event: &PresenceEvent,
    current: Option<&StatusSnapshot>,
    shift_active: bool,
) -> Candidate {
    let ctx = RuleContext {
        source: event.source,
        kind: event.kind.as_str(),
        current,
        shift_active,
    };
    RULES
        .iter()
        .find(|rule| (rule.when)(&ctx))
        .map_or_else(
            || {
                tracing::trace!(event_id = %event.id, rule = "carry", "no rule matched");
                carry(&ctx)
            },
            |rule| {
                tracing::trace!(event_id = %event.id, rule = rule.name, "rule matched");
                apply(&rule.then, &ctx)
            },
        )
}

fn apply(outcome: &Outcome, ctx: &RuleContext<'_>) -> Candidate {
    match outcome {
        Outcome::Set {
            status,
            reason,
            tier,
        } => Candidate {
            status: *status,
            reason,
            tier: *tier,
        },
        Outcome::OutsideShift => Candidate {
            status: Status::OffShift,
            reason: "outside shift",
            tier: classify(ctx.source, ctx.kind),
        },
    }
}

fn carry(ctx: &RuleContext<'_>) -> Candidate {
    Candidate {
        status: ctx.current.map_or(Status::OffShift, |snapshot| snapshot.status),
        reason: "no change",
        tier: classify(ctx.source, ctx.kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventId, EventKind, PersonId};
    use chrono::{DateTime, Utc};

    fn event(source: EventSource, kind: &str) -> PresenceEvent {
        PresenceEvent {
            id: EventId::new("evt-1").unwrap(),
            person_id: PersonId::new("p-1").unwrap(),
            timestamp: ts("2025-03-01T09:00:00Z"),
            source,
            kind: EventKind::new(kind).unwrap(),
            payload: None,
        }
    }

    fn ts(value: &str) -> DateTime<Utc> {
        value.parse().unwrap()
    }

    fn snapshot(status: Status, tier: PriorityTier) -> StatusSnapshot {
        StatusSnapshot {
            person_id: PersonId::new("p-1").unwrap(),
            status,
            timestamp: ts("2025-03-01T08:00:00Z"),
            tier,
            reason: "earlier".to_string(),
        }
    }

    #[test]
    fn panic_wins_over_every_other_row() {
        // A panic-typed event from a low-urgency source still matches row 1.
        let candidate = evaluate(&event(EventSource::Calendar, "panic"), None, true);
        assert_eq!(candidate.status, Status::Emergency);
        assert_eq!(candidate.reason, "panic button");
        assert_eq!(candidate.tier, PriorityTier::Emergency);
    }

    #[test]
    fn biometric_entry_yields_on_shift() {
        let candidate = evaluate(&event(EventSource::Biometric, "entry"), None, true);
        assert_eq!(candidate.status, Status::OnShift);
        assert_eq!(candidate.reason, "biometric entry");
        assert_eq!(candidate.tier, PriorityTier::Biometric);
    }

    #[test]
    fn biometric_exit_yields_off_shift() {
        let candidate = evaluate(&event(EventSource::Biometric, "exit"), None, true);
        assert_eq!(candidate.status, Status::OffShift);
        assert_eq!(candidate.reason, "biometric exit");
        assert_eq!(candidate.tier, PriorityTier::Biometric);
    }

    #[test]
    fn task_assignment_yields_busy_inside_shift() {
        let candidate = evaluate(&event(EventSource::Task, "assigned"), None, true);
        assert_eq!(candidate.status, Status::Busy);
        assert_eq!(candidate.reason, "task assigned");
        assert_eq!(candidate.tier, PriorityTier::Task);
    }

    #[test]
    fn task_completion_yields_available() {
        let candidate = evaluate(&event(EventSource::Task, "completed"), None, true);
        assert_eq!(candidate.status, Status::Available);
        assert_eq!(candidate.reason, "task completed");
    }

    #[test]
    fn geofence_entry_during_shift_yields_available() {
        let candidate = evaluate(&event(EventSource::Mobile, "geo_enter"), None, true);
        assert_eq!(candidate.status, Status::Available);
        assert_eq!(candidate.reason, "geofence entry during shift");
        assert_eq!(candidate.tier, PriorityTier::Geofence);
    }

    #[test]
    fn geofence_entry_outside_shift_falls_to_outside_rule() {
        // The geo_enter row requires an active shift; without one the event
        // falls through to the outside-shift row.
        let candidate = evaluate(&event(EventSource::Mobile, "geo_enter"), None, false);
        assert_eq!(candidate.status, Status::OffShift);
        assert_eq!(candidate.reason, "outside shift");
        assert_eq!(candidate.tier, PriorityTier::Geofence);
    }

    #[test]
    fn geofence_exit_yields_break_regardless_of_source() {
        let candidate = evaluate(&event(EventSource::Other, "geo_exit"), None, true);
        assert_eq!(candidate.status, Status::Break);
        assert_eq!(candidate.reason, "geofence exit");
        assert_eq!(candidate.tier, PriorityTier::Geofence);
    }

    #[test]
    fn task_rows_still_match_outside_shift() {
        // Task rows sit above the outside-shift row, so assignment beats it
        // even when no shift is active; unmatched kinds do not.
        let candidate = evaluate(&event(EventSource::Task, "assigned"), None, false);
        assert_eq!(candidate.status, Status::Busy);

        let current = snapshot(Status::OnShift, PriorityTier::Biometric);
        let candidate = evaluate(&event(EventSource::Task, "reopened"), Some(&current), false);
        assert_eq!(candidate.status, Status::OffShift);
        assert_eq!(candidate.reason, "outside shift");
        assert_eq!(candidate.tier, PriorityTier::Task);
    }

    #[test]
    fn unmatched_event_inside_shift_carries_current_status() {
        let current = snapshot(Status::Busy, PriorityTier::Task);
        let candidate = evaluate(&event(EventSource::Calendar, "reminder"), Some(&current), true);
        assert_eq!(candidate.status, Status::Busy);
        assert_eq!(candidate.reason, "no change");
        assert_eq!(candidate.tier, PriorityTier::Calendar);
    }

    #[test]
    fn unmatched_event_with_no_history_defaults_to_off_shift() {
        let candidate = evaluate(&event(EventSource::Calendar, "reminder"), None, true);
        assert_eq!(candidate.status, Status::OffShift);
        assert_eq!(candidate.reason, "no change");
    }
}
