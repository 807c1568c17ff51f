//! Shift schedule adapter commands.

use std::io::Write;

use anyhow::Result;

use rc_core::PersonId;
use rc_db::Database;

use super::util::parse_rfc3339;

pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    person: &str,
    start: &str,
    end: Option<&str>,
) -> Result<()> {
    let person_id = PersonId::new(person)?;
    let start_ts = parse_rfc3339(start, "--start")?;
    let end_ts = end.map(|value| parse_rfc3339(value, "--end")).transpose()?;

    let id = db.add_shift(&person_id, start_ts, end_ts)?;
    writeln!(writer, "Added shift {id} for {person}.")?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, person: &str, json: bool) -> Result<()> {
    let person_id = PersonId::new(person)?;
    let shifts = db.list_shifts(&person_id)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &shifts)?;
        writeln!(writer)?;
        return Ok(());
    }

    if shifts.is_empty() {
        writeln!(writer, "No shifts for {person}.")?;
        return Ok(());
    }

    for shift in shifts {
        let end = shift.end_ts.as_deref().unwrap_or("open");
        writeln!(writer, "- {} .. {end}", shift.start_ts)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use rc_db::PersonRecord;

    #[test]
    fn add_then_list_round_trips() {
        let db = Database::open_in_memory().unwrap();
        db.insert_person(&PersonRecord {
            id: "p-1".to_string(),
            name: "Ana".to_string(),
            unit: None,
            role: None,
        })
        .unwrap();

        let mut output = Vec::new();
        add(
            &mut output,
            &db,
            "p-1",
            "2025-03-01T08:00:00Z",
            Some("2025-03-01T16:00:00Z"),
        )
        .unwrap();
        add(&mut output, &db, "p-1", "2025-03-02T08:00:00Z", None).unwrap();

        let mut output = Vec::new();
        list(&mut output, &db, "p-1", false).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output.trim_end(), @r"
        - 2025-03-01T08:00:00.000Z .. 2025-03-01T16:00:00.000Z
        - 2025-03-02T08:00:00.000Z .. open
        ");
    }

    #[test]
    fn shift_for_unknown_person_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        // Foreign key enforcement rejects the row.
        assert!(add(&mut output, &db, "ghost", "2025-03-01T08:00:00Z", None).is_err());
    }
}
