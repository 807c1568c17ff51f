//! History command for walking a person's status log.

use std::io::Write;

use anyhow::Result;

use rc_core::PersonId;
use rc_db::Database;

use super::util::{display_ts, parse_rfc3339};

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    person: &str,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let person_id = PersonId::new(person)?;
    let from = from.map(|value| parse_rfc3339(value, "--from")).transpose()?;
    let to = to.map(|value| parse_rfc3339(value, "--to")).transpose()?;

    let snapshots = db.history(&person_id, from, to)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &snapshots)?;
        writeln!(writer)?;
        return Ok(());
    }

    if snapshots.is_empty() {
        writeln!(writer, "No history for {person}.")?;
        return Ok(());
    }

    for snapshot in snapshots {
        writeln!(
            writer,
            "- {}: {} ({}), {}",
            display_ts(snapshot.timestamp),
            snapshot.status,
            snapshot.tier,
            snapshot.reason,
        )?;
    }

    Ok(())
}
