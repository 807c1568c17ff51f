//! Priority classification of presence events.

use crate::event::EventSource;
use crate::status::PriorityTier;

/// Maps an event's source and type to its urgency tier.
///
/// Rules are evaluated in order, first match wins. Anything unclassified
/// falls back to [`PriorityTier::Task`]: a fallback signal should outrank a
/// calendar trigger but nothing observed directly.
#[must_use]
pub fn classify(source: EventSource, kind: &str) -> PriorityTier {
    if kind == "panic" || source == EventSource::Panic {
        PriorityTier::Emergency
    } else if source == EventSource::Biometric {
        PriorityTier::Biometric
    } else if source == EventSource::Mobile || kind.starts_with("geo_") {
        PriorityTier::Geofence
    } else if source == EventSource::Task {
        PriorityTier::Task
    } else if source == EventSource::Calendar {
        PriorityTier::Calendar
    } else {
        PriorityTier::Task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_kind_is_emergency_from_any_source() {
        assert_eq!(
            classify(EventSource::Calendar, "panic"),
            PriorityTier::Emergency
        );
        assert_eq!(
            classify(EventSource::Biometric, "panic"),
            PriorityTier::Emergency
        );
    }

    #[test]
    fn panic_source_is_emergency_for_any_kind() {
        assert_eq!(
            classify(EventSource::Panic, "pressed"),
            PriorityTier::Emergency
        );
    }

    #[test]
    fn biometric_source_outranks_geo_prefix() {
        // Source check comes before the geo_ prefix rule.
        assert_eq!(
            classify(EventSource::Biometric, "geo_enter"),
            PriorityTier::Biometric
        );
    }

    #[test]
    fn mobile_and_geo_prefix_classify_as_geofence() {
        assert_eq!(
            classify(EventSource::Mobile, "heartbeat"),
            PriorityTier::Geofence
        );
        assert_eq!(
            classify(EventSource::Other, "geo_exit"),
            PriorityTier::Geofence
        );
    }

    #[test]
    fn task_and_calendar_sources_map_to_their_tiers() {
        assert_eq!(classify(EventSource::Task, "assigned"), PriorityTier::Task);
        assert_eq!(
            classify(EventSource::Calendar, "shift_start"),
            PriorityTier::Calendar
        );
    }

    #[test]
    fn unclassified_falls_back_to_task() {
        assert_eq!(classify(EventSource::Other, "ping"), PriorityTier::Task);
    }
}
