//! Small helpers shared by the command implementations.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Parses an RFC 3339 timestamp from a CLI argument.
pub fn parse_rfc3339(value: &str, flag: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .with_context(|| format!("invalid {flag} value {value:?} (expected RFC 3339)"))
}

/// Renders a timestamp for human-readable output.
pub fn display_ts(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_rfc3339("2025-03-01T10:00:00+02:00", "--at").unwrap();
        assert_eq!(display_ts(parsed), "2025-03-01T08:00:00Z");
    }

    #[test]
    fn rejects_garbage_with_flag_context() {
        let err = parse_rfc3339("yesterday", "--from").unwrap_err();
        assert!(err.to_string().contains("--from"));
    }
}
