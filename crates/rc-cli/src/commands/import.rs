//! Import command for batch-processing newline-delimited JSON events.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use rc_core::{EventId, EventKind, EventSource, PersonId, PresenceEvent};
use rc_db::Database;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Read events from this file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &ImportArgs) -> Result<()> {
    let events = match &args.file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            parse_events(BufReader::new(file))?
        }
        None => parse_events(io::stdin().lock())?,
    };

    let mut duplicates = 0;
    for event in &events {
        let outcome = db
            .ingest(event)
            .with_context(|| format!("failed to process event {}", event.id))?;
        if !outcome.event_inserted {
            duplicates += 1;
        }
    }

    writeln!(
        writer,
        "Processed {} events ({duplicates} duplicates).",
        events.len()
    )?;
    Ok(())
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<PresenceEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let event = parsed
            .into_event()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct ImportEvent {
    #[serde(default)]
    id: Option<String>,
    person_id: String,
    timestamp: String,
    source: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl ImportEvent {
    fn into_event(self) -> Result<PresenceEvent> {
        let id = match self.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let timestamp = super::util::parse_rfc3339(&self.timestamp, "timestamp")?;
        let Ok(source) = self.source.parse::<EventSource>();
        Ok(PresenceEvent {
            id: EventId::new(id)?,
            person_id: PersonId::new(self.person_id)?,
            timestamp,
            source,
            kind: EventKind::new(self.kind)?,
            payload: self.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    #[test]
    fn parse_events_reads_one_event_per_line() {
        let input = concat!(
            r#"{"id":"evt-1","person_id":"p-1","timestamp":"2025-03-01T08:00:00Z","source":"biometric","type":"entry"}"#,
            "\n\n",
            r#"{"id":"evt-2","person_id":"p-1","timestamp":"2025-03-01T16:00:00Z","source":"biometric","type":"exit"}"#,
            "\n",
        );
        let events = parse_events(Cursor::new(input)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_str(), "evt-1");
        assert_eq!(events[1].kind.as_str(), "exit");
    }

    #[test]
    fn parse_events_generates_missing_ids() {
        let input = r#"{"person_id":"p-1","timestamp":"2025-03-01T08:00:00Z","source":"panic","type":"panic"}"#;
        let events = parse_events(Cursor::new(input)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].id.as_str().is_empty());
    }

    #[test]
    fn parse_events_reports_the_failing_line() {
        let input = concat!(
            r#"{"id":"evt-1","person_id":"p-1","timestamp":"2025-03-01T08:00:00Z","source":"biometric","type":"entry"}"#,
            "\n",
            r#"{"id":"evt-2","person_id":"p-1","timestamp":"not-a-time","source":"biometric","type":"exit"}"#,
        );
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn unknown_source_degrades_to_other() {
        let input = r#"{"id":"evt-1","person_id":"p-1","timestamp":"2025-03-01T08:00:00Z","source":"smartwatch","type":"ping"}"#;
        let events = parse_events(Cursor::new(input)).unwrap();
        assert_eq!(events[0].source, EventSource::Other);
    }
}
