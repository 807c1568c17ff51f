//! Roster adapter commands.

use std::io::Write;

use anyhow::Result;

use rc_db::{Database, PersonRecord};

pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    id: &str,
    name: &str,
    unit: Option<&str>,
    role: Option<&str>,
) -> Result<()> {
    db.insert_person(&PersonRecord {
        id: id.to_string(),
        name: name.to_string(),
        unit: unit.map(str::to_string),
        role: role.map(str::to_string),
    })?;
    writeln!(writer, "Added {name} ({id}).")?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, unit: Option<&str>, json: bool) -> Result<()> {
    let people = db.list_people(unit)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &people)?;
        writeln!(writer)?;
        return Ok(());
    }

    if people.is_empty() {
        writeln!(writer, "No people on the roster.")?;
        return Ok(());
    }

    for person in people {
        let unit = person.unit.as_deref().unwrap_or("-");
        let role = person.role.as_deref().unwrap_or("-");
        writeln!(writer, "- {} ({}) unit={unit} role={role}", person.name, person.id)?;
    }

    Ok(())
}
