//! Shift window membership with trailing grace.

use chrono::{DateTime, Utc};

/// Trailing grace after a shift's end during which the person still counts
/// as on duty. Absorbs clock and ingestion lag around shift boundaries.
pub const SHIFT_GRACE: chrono::Duration = chrono::Duration::seconds(600);

/// A scheduled duty interval, owned by the scheduling collaborator.
///
/// `end_ts` of `None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
}

impl ShiftWindow {
    /// Whether `at` falls inside this window, including the trailing grace.
    #[must_use]
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start_ts <= at && self.end_ts.is_none_or(|end| end >= at - SHIFT_GRACE)
    }
}

/// Whether any of the given windows covers `at`.
#[must_use]
pub fn any_active(windows: &[ShiftWindow], at: DateTime<Utc>) -> bool {
    windows.iter().any(|window| window.covers(at))
}
