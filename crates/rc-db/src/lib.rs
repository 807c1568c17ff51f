//! Storage layer and ingest pipeline for the rollcall presence engine.
//!
//! Provides persistence for presence events and status snapshots using
//! `rusqlite`, plus the orchestration that turns an incoming event into a
//! new snapshot (read latest snapshot → evaluate rules → resolve conflict
//! → append).
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send`
//! but not `Sync`. A `Database` instance can be moved between threads but
//! cannot be shared across threads without external synchronization.
//!
//! For multi-threaded access, either:
//! - Use a `Mutex<Database>` to serialize access
//! - Use separate `Database` instances per thread
//!
//! Either way the per-person ordering invariant holds: every ingest runs
//! inside an immediate (write-locking) transaction, so the
//! read-evaluate-append sequence for one event can never interleave with
//! another writer's. Snapshot appends are linearizable.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond
//! precision (e.g. `2025-03-01T08:00:00.000Z`), always UTC. Lexicographic
//! ordering matches chronological ordering, which the latest-snapshot and
//! history queries rely on.
//!
//! Both the event log and the snapshot log are append-only: rows are never
//! updated or deleted, and the event `id` column is the idempotency key.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;
use thiserror::Error;

use rc_core::{
    PersonId, PresenceEvent, ShiftWindow, Status, StatusSnapshot, Winner, any_active, evaluate,
    resolve,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database. Transient store failures
    /// surface here; the caller owns retry policy.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The event references a person the roster does not know.
    #[error("unknown person: {person_id}")]
    UnknownPerson { person_id: String },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp in {context}: {timestamp}")]
    TimestampParse {
        context: &'static str,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored snapshot carries a status or tier outside the known enum
    /// set. Fatal for the event being processed, never guessed at.
    #[error("inconsistent state for person {person_id}: {message}")]
    InconsistentState { person_id: String, message: String },
    /// A core-type validation failure while reading stored rows.
    #[error(transparent)]
    Validation(#[from] rc_core::ValidationError),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A roster entry. The engine only reads these; the roster is owned by
/// whoever seeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub unit: Option<String>,
    pub role: Option<String>,
}

/// A stored shift row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftRecord {
    pub id: i64,
    pub person_id: String,
    pub start_ts: String,
    pub end_ts: Option<String>,
}

/// A person's current status on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub person: PersonRecord,
    pub snapshot: StatusSnapshot,
}

/// The result of processing one presence event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The snapshot appended for this event.
    pub snapshot: StatusSnapshot,
    /// Whether the event produced a new row in the event log. `false`
    /// means the id was already known (idempotent re-submission).
    pub event_inserted: bool,
    /// Which side of the conflict won.
    pub winner: Winner,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS people (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                unit TEXT,
                role TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_people_unit ON people(unit);

            CREATE TABLE IF NOT EXISTS shifts (
                id INTEGER PRIMARY KEY,
                person_id TEXT NOT NULL,
                start_ts TEXT NOT NULL,
                end_ts TEXT,
                FOREIGN KEY (person_id) REFERENCES people(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_shifts_person ON shifts(person_id, start_ts);

            -- Event log: immutable presence facts, id is the idempotency key
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                person_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                source TEXT NOT NULL,
                type TEXT NOT NULL,
                payload TEXT,
                FOREIGN KEY (person_id) REFERENCES people(id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_person_ts ON events(person_id, timestamp);

            -- Snapshot log: append-only derived statuses; the latest row
            -- per person (by timestamp, then id) is the current status
            CREATE TABLE IF NOT EXISTS snapshots (
                id INTEGER PRIMARY KEY,
                person_id TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                tier TEXT NOT NULL,
                reason TEXT NOT NULL,
                FOREIGN KEY (person_id) REFERENCES people(id)
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_person_ts ON snapshots(person_id, timestamp);
            ",
        )?;
        Ok(())
    }

    /// Inserts a roster entry.
    pub fn insert_person(&self, person: &PersonRecord) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO people (id, name, unit, role) VALUES (?, ?, ?, ?)",
            params![person.id, person.name, person.unit, person.role],
        )?;
        Ok(())
    }

    /// Whether the roster knows this person.
    pub fn person_exists(&self, person_id: &PersonId) -> Result<bool, DbError> {
        person_exists_on(&self.conn, person_id)
    }

    /// Lists roster entries, optionally filtered by unit, ordered by name.
    pub fn list_people(&self, unit: Option<&str>) -> Result<Vec<PersonRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, unit, role
            FROM people
            WHERE ?1 IS NULL OR unit = ?1
            ORDER BY name ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![unit], |row| {
            Ok(PersonRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                unit: row.get(2)?,
                role: row.get(3)?,
            })
        })?;
        let mut people = Vec::new();
        for row in rows {
            people.push(row?);
        }
        Ok(people)
    }

    /// Adds a shift row for a person. `end_ts` of `None` is open-ended.
    pub fn add_shift(
        &self,
        person_id: &PersonId,
        start_ts: DateTime<Utc>,
        end_ts: Option<DateTime<Utc>>,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO shifts (person_id, start_ts, end_ts) VALUES (?, ?, ?)",
            params![
                person_id.as_str(),
                format_timestamp(start_ts),
                end_ts.map(format_timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists a person's shift rows ordered by start time.
    pub fn list_shifts(&self, person_id: &PersonId) -> Result<Vec<ShiftRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, person_id, start_ts, end_ts
            FROM shifts
            WHERE person_id = ?
            ORDER BY start_ts ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([person_id.as_str()], |row| {
            Ok(ShiftRecord {
                id: row.get(0)?,
                person_id: row.get(1)?,
                start_ts: row.get(2)?,
                end_ts: row.get(3)?,
            })
        })?;
        let mut shifts = Vec::new();
        for row in rows {
            shifts.push(row?);
        }
        Ok(shifts)
    }

    /// Whether the person is inside an active shift at `at`, with the
    /// trailing grace applied by the core window math.
    pub fn shift_active(&self, person_id: &PersonId, at: DateTime<Utc>) -> Result<bool, DbError> {
        shift_active_on(&self.conn, person_id, at)
    }

    /// Appends an event to the log. Returns `false` if the id was already
    /// present (idempotent no-op).
    pub fn append_event(&self, event: &PresenceEvent) -> Result<bool, DbError> {
        append_event_on(&self.conn, event)
    }

    /// The snapshot with the maximum timestamp for this person, if any.
    pub fn latest_snapshot(
        &self,
        person_id: &PersonId,
    ) -> Result<Option<StatusSnapshot>, DbError> {
        latest_snapshot_on(&self.conn, person_id)
    }

    /// Appends a snapshot to the history log.
    pub fn append_snapshot(&self, snapshot: &StatusSnapshot) -> Result<(), DbError> {
        append_snapshot_on(&self.conn, snapshot)
    }

    /// Status history for a person, newest first. `from`/`to` are
    /// inclusive bounds on the snapshot timestamp.
    pub fn history(
        &self,
        person_id: &PersonId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<StatusSnapshot>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT person_id, status, timestamp, tier, reason
            FROM snapshots
            WHERE person_id = ?1
              AND (?2 IS NULL OR timestamp >= ?2)
              AND (?3 IS NULL OR timestamp <= ?3)
            ORDER BY timestamp DESC, id DESC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                person_id.as_str(),
                from.map(format_timestamp),
                to.map(format_timestamp),
            ],
            snapshot_row,
        )?;
        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(parse_snapshot(row?)?);
        }
        Ok(snapshots)
    }

    /// Current status per person, optionally filtered by unit, ordered by
    /// person name. People with no snapshots yet are omitted.
    pub fn current_statuses(&self, unit: Option<&str>) -> Result<Vec<BoardEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT p.id, p.name, p.unit, p.role,
                   s.person_id, s.status, s.timestamp, s.tier, s.reason
            FROM people p
            JOIN snapshots s ON s.person_id = p.id
            WHERE (?1 IS NULL OR p.unit = ?1)
              AND s.id = (
                  SELECT s2.id FROM snapshots s2
                  WHERE s2.person_id = p.id
                  ORDER BY s2.timestamp DESC, s2.id DESC
                  LIMIT 1
              )
            ORDER BY p.name ASC, p.id ASC
            ",
        )?;
        let rows = stmt.query_map(params![unit], |row| {
            let person = PersonRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                unit: row.get(2)?,
                role: row.get(3)?,
            };
            let snapshot = SnapshotRow {
                person_id: row.get(4)?,
                status: row.get(5)?,
                timestamp: row.get(6)?,
                tier: row.get(7)?,
                reason: row.get(8)?,
            };
            Ok((person, snapshot))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (person, snapshot) = row?;
            entries.push(BoardEntry {
                person,
                snapshot: parse_snapshot(snapshot)?,
            });
        }
        Ok(entries)
    }

    /// Processes one presence event through the full pipeline: idempotent
    /// event append, rule evaluation against the latest snapshot and the
    /// shift-activity flag, conflict resolution, snapshot append.
    ///
    /// The whole sequence runs inside an immediate transaction, so
    /// concurrent ingests cannot both read the same snapshot tail and
    /// silently drop one result. A re-submitted event id skips the event
    /// log but still derives and appends a snapshot, which is what makes a
    /// retry after a crash between the two appends safe.
    pub fn ingest(&mut self, event: &PresenceEvent) -> Result<IngestOutcome, DbError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !person_exists_on(&tx, &event.person_id)? {
            return Err(DbError::UnknownPerson {
                person_id: event.person_id.to_string(),
            });
        }

        let event_inserted = append_event_on(&tx, event)?;
        let current = latest_snapshot_on(&tx, &event.person_id)?;
        let shift_active = shift_active_on(&tx, &event.person_id, event.timestamp)?;

        let candidate = evaluate(event, current.as_ref(), shift_active);
        let resolution = resolve(&candidate, current.as_ref(), event.timestamp);

        let snapshot = StatusSnapshot {
            person_id: event.person_id.clone(),
            status: resolution.status,
            timestamp: event.timestamp,
            tier: resolution.tier,
            reason: resolution.reason,
        };
        append_snapshot_on(&tx, &snapshot)?;
        tx.commit()?;

        tracing::debug!(
            event_id = %event.id,
            person_id = %event.person_id,
            status = %snapshot.status,
            tier = %snapshot.tier,
            winner = ?resolution.winner,
            event_inserted,
            "event resolved"
        );

        Ok(IngestOutcome {
            snapshot,
            event_inserted,
            winner: resolution.winner,
        })
    }
}

/// Raw snapshot columns before enum validation.
struct SnapshotRow {
    person_id: String,
    status: String,
    timestamp: String,
    tier: String,
    reason: String,
}

fn snapshot_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SnapshotRow> {
    Ok(SnapshotRow {
        person_id: row.get(0)?,
        status: row.get(1)?,
        timestamp: row.get(2)?,
        tier: row.get(3)?,
        reason: row.get(4)?,
    })
}

fn parse_snapshot(row: SnapshotRow) -> Result<StatusSnapshot, DbError> {
    let status: Status = row
        .status
        .parse()
        .map_err(|err: rc_core::UnknownStatus| DbError::InconsistentState {
            person_id: row.person_id.clone(),
            message: err.to_string(),
        })?;
    let tier = row
        .tier
        .parse()
        .map_err(|err: rc_core::UnknownTier| DbError::InconsistentState {
            person_id: row.person_id.clone(),
            message: err.to_string(),
        })?;
    let timestamp = parse_timestamp(&row.timestamp, "snapshot")?;
    Ok(StatusSnapshot {
        person_id: PersonId::new(row.person_id)?,
        status,
        timestamp,
        tier,
        reason: row.reason,
    })
}

fn person_exists_on(conn: &Connection, person_id: &PersonId) -> Result<bool, DbError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM people WHERE id = ?",
            [person_id.as_str()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn append_event_on(conn: &Connection, event: &PresenceEvent) -> Result<bool, DbError> {
    let payload = event
        .payload
        .as_ref()
        .map(std::string::ToString::to_string);
    let inserted = conn.execute(
        "
        INSERT OR IGNORE INTO events (id, person_id, timestamp, source, type, payload)
        VALUES (?, ?, ?, ?, ?, ?)
        ",
        params![
            event.id.as_str(),
            event.person_id.as_str(),
            format_timestamp(event.timestamp),
            event.source.as_str(),
            event.kind.as_str(),
            payload,
        ],
    )?;
    Ok(inserted == 1)
}

fn latest_snapshot_on(
    conn: &Connection,
    person_id: &PersonId,
) -> Result<Option<StatusSnapshot>, DbError> {
    let row = conn
        .query_row(
            "
            SELECT person_id, status, timestamp, tier, reason
            FROM snapshots
            WHERE person_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT 1
            ",
            [person_id.as_str()],
            snapshot_row,
        )
        .optional()?;
    row.map(parse_snapshot).transpose()
}

fn append_snapshot_on(conn: &Connection, snapshot: &StatusSnapshot) -> Result<(), DbError> {
    conn.execute(
        "
        INSERT INTO snapshots (person_id, status, timestamp, tier, reason)
        VALUES (?, ?, ?, ?, ?)
        ",
        params![
            snapshot.person_id.as_str(),
            snapshot.status.as_str(),
            format_timestamp(snapshot.timestamp),
            snapshot.tier.as_str(),
            snapshot.reason,
        ],
    )?;
    Ok(())
}

fn shift_active_on(
    conn: &Connection,
    person_id: &PersonId,
    at: DateTime<Utc>,
) -> Result<bool, DbError> {
    // Prefilter on start only; the grace comparison on end_ts lives in the
    // core window type so the boundary math has one owner.
    let mut stmt = conn.prepare(
        "
        SELECT start_ts, end_ts
        FROM shifts
        WHERE person_id = ? AND start_ts <= ?
        ",
    )?;
    let rows = stmt.query_map(
        params![person_id.as_str(), format_timestamp(at)],
        |row| {
            let start_ts: String = row.get(0)?;
            let end_ts: Option<String> = row.get(1)?;
            Ok((start_ts, end_ts))
        },
    )?;
    let mut windows = Vec::new();
    for row in rows {
        let (start_ts, end_ts) = row?;
        windows.push(ShiftWindow {
            start_ts: parse_timestamp(&start_ts, "shift")?,
            end_ts: end_ts
                .map(|value| parse_timestamp(&value, "shift"))
                .transpose()?,
        });
    }
    Ok(any_active(&windows, at))
}

fn parse_timestamp(timestamp: &str, context: &'static str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            context,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
