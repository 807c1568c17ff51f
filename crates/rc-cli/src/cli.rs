//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::import::ImportArgs;
use crate::commands::ingest::IngestArgs;

/// Presence status board for tracked personnel.
///
/// Ingests presence signals (biometric scans, geofence transitions, task
/// events, panic buttons, calendar triggers) and resolves each person's
/// current operational status with full history.
#[derive(Debug, Parser)]
#[command(name = "rollcall", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Process a single presence event.
    Ingest(IngestArgs),

    /// Process newline-delimited JSON events from a file or stdin.
    Import(ImportArgs),

    /// Show the current status board.
    Status {
        /// Only show people in this unit.
        #[arg(long)]
        unit: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show status history for a person, newest first.
    History {
        /// The person ID.
        person: String,

        /// Inclusive lower bound (RFC 3339).
        #[arg(long)]
        from: Option<String>,

        /// Inclusive upper bound (RFC 3339).
        #[arg(long)]
        to: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Manage roster entries.
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },

    /// Manage shift windows.
    Shift {
        #[command(subcommand)]
        action: ShiftAction,
    },
}

/// Roster subcommands.
#[derive(Debug, Subcommand)]
pub enum PersonAction {
    /// Add a roster entry.
    Add {
        /// The person ID (opaque, unique).
        #[arg(long)]
        id: String,

        /// Display name.
        #[arg(long)]
        name: String,

        /// Organizational unit.
        #[arg(long)]
        unit: Option<String>,

        /// Role label.
        #[arg(long)]
        role: Option<String>,
    },

    /// List roster entries.
    List {
        /// Only show people in this unit.
        #[arg(long)]
        unit: Option<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

/// Shift subcommands.
#[derive(Debug, Subcommand)]
pub enum ShiftAction {
    /// Add a shift window for a person.
    Add {
        /// The person ID.
        #[arg(long)]
        person: String,

        /// Shift start (RFC 3339).
        #[arg(long)]
        start: String,

        /// Shift end (RFC 3339). Omit for an open-ended shift.
        #[arg(long)]
        end: Option<String>,
    },

    /// List a person's shift windows.
    List {
        /// The person ID.
        person: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}
