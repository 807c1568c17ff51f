//! Ingest command for processing a single presence event.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use rc_core::{EventId, EventKind, EventSource, PersonId, PresenceEvent};
use rc_db::Database;

use super::util::display_ts;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// The person the signal is about.
    #[arg(long)]
    pub person: String,

    /// The originating channel (biometric|mobile|task|calendar|panic|other).
    #[arg(long)]
    pub source: String,

    /// The event type, e.g. entry, exit, assigned, geo_enter.
    #[arg(long)]
    pub kind: String,

    /// Event timestamp (RFC 3339). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,

    /// Idempotency key. Defaults to a generated UUID.
    #[arg(long)]
    pub id: Option<String>,

    /// Optional JSON payload.
    #[arg(long)]
    pub payload: Option<String>,

    /// Emit the resulting snapshot as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &IngestArgs) -> Result<()> {
    let event = build_event(args)?;
    let outcome = db.ingest(&event)?;

    if !outcome.event_inserted {
        tracing::debug!(event_id = %event.id, "duplicate event id, event log unchanged");
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &outcome.snapshot)?;
        writeln!(writer)?;
    } else {
        let snapshot = &outcome.snapshot;
        writeln!(
            writer,
            "{} {} ({}) at {}, {}",
            snapshot.person_id,
            snapshot.status,
            snapshot.tier,
            display_ts(snapshot.timestamp),
            snapshot.reason,
        )?;
    }
    Ok(())
}

fn build_event(args: &IngestArgs) -> Result<PresenceEvent> {
    let id = args
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let timestamp = match args.at.as_deref() {
        Some(value) => super::util::parse_rfc3339(value, "--at")?,
        None => Utc::now(),
    };
    let Ok(source) = args.source.parse::<EventSource>();
    let payload = args
        .payload
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("invalid --payload JSON")?;

    Ok(PresenceEvent {
        id: EventId::new(id)?,
        person_id: PersonId::new(args.person.clone())?,
        timestamp,
        source,
        kind: EventKind::new(args.kind.clone())?,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn args(person: &str, source: &str, kind: &str) -> IngestArgs {
        IngestArgs {
            person: person.to_string(),
            source: source.to_string(),
            kind: kind.to_string(),
            at: Some("2025-03-01T08:00:00Z".to_string()),
            id: Some("evt-1".to_string()),
            payload: None,
            json: false,
        }
    }

    #[test]
    fn build_event_generates_id_when_omitted() {
        let mut args = args("p-1", "biometric", "entry");
        args.id = None;
        let event = build_event(&args).unwrap();
        assert!(!event.id.as_str().is_empty());
    }

    #[test]
    fn build_event_rejects_empty_person() {
        let args = args("", "biometric", "entry");
        assert!(build_event(&args).is_err());
    }

    #[test]
    fn build_event_rejects_bad_payload() {
        let mut args = args("p-1", "mobile", "geo_enter");
        args.payload = Some("{not json".to_string());
        assert!(build_event(&args).is_err());
    }

    #[test]
    fn ingest_prints_resolved_status() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_person(&rc_db::PersonRecord {
            id: "p-1".to_string(),
            name: "Ana".to_string(),
            unit: None,
            role: None,
        })
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut db, &args("p-1", "biometric", "entry")).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output.trim_end(), @"p-1 ON_SHIFT (BIOMETRIC) at 2025-03-01T08:00:00Z, biometric entry");
    }
}
