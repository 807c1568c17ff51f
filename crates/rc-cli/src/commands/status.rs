//! Status command for showing the current board.

use std::io::Write;

use anyhow::Result;

use rc_db::Database;

use super::util::display_ts;

pub fn run<W: Write>(writer: &mut W, db: &Database, unit: Option<&str>, json: bool) -> Result<()> {
    let board = db.current_statuses(unit)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &board)?;
        writeln!(writer)?;
        return Ok(());
    }

    if board.is_empty() {
        writeln!(writer, "No statuses recorded.")?;
        return Ok(());
    }

    for entry in board {
        let unit = entry.person.unit.as_deref().unwrap_or("-");
        writeln!(
            writer,
            "- {} [{}]: {} ({}) at {}, {}",
            entry.person.name,
            unit,
            entry.snapshot.status,
            entry.snapshot.tier,
            display_ts(entry.snapshot.timestamp),
            entry.snapshot.reason,
        )?;
    }

    Ok(())
}
