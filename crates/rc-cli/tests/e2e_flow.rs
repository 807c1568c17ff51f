//! End-to-end integration tests for the presence pipeline.
//!
//! Tests the full flow through the built binary: roster seeding → shift
//! seeding → event ingestion → status board → history.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn rollcall_binary() -> String {
    env!("CARGO_BIN_EXE_rollcall").to_string()
}

fn run(db_path: &Path, args: &[&str]) -> Output {
    Command::new(rollcall_binary())
        .env("RC_DATABASE_PATH", db_path)
        .args(args)
        .output()
        .expect("failed to run rollcall")
}

fn run_ok(db_path: &Path, args: &[&str]) -> String {
    let output = run(db_path, args);
    assert!(
        output.status.success(),
        "rollcall {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn seed_person(db_path: &Path, id: &str, name: &str, unit: &str) {
    run_ok(
        db_path,
        &[
            "person", "add", "--id", id, "--name", name, "--unit", unit,
        ],
    );
}

#[test]
fn test_full_resolution_flow() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rollcall.db");

    seed_person(&db_path, "p-1", "Ana", "north");
    run_ok(
        &db_path,
        &[
            "shift",
            "add",
            "--person",
            "p-1",
            "--start",
            "2025-03-01T08:00:00Z",
            "--end",
            "2025-03-01T16:00:00Z",
        ],
    );

    // Biometric entry puts the person on shift.
    let out = run_ok(
        &db_path,
        &[
            "ingest",
            "--person",
            "p-1",
            "--source",
            "biometric",
            "--kind",
            "entry",
            "--at",
            "2025-03-01T08:00:00Z",
            "--id",
            "evt-1",
        ],
    );
    assert!(out.contains("ON_SHIFT"), "unexpected output: {out}");

    // A panic signal overrides everything.
    let out = run_ok(
        &db_path,
        &[
            "ingest",
            "--person",
            "p-1",
            "--source",
            "panic",
            "--kind",
            "panic",
            "--at",
            "2025-03-01T09:00:00Z",
            "--id",
            "evt-2",
        ],
    );
    assert!(out.contains("EMERGENCY"), "unexpected output: {out}");

    // A later lower-tier exit cannot displace the emergency.
    let out = run_ok(
        &db_path,
        &[
            "ingest",
            "--person",
            "p-1",
            "--source",
            "biometric",
            "--kind",
            "exit",
            "--at",
            "2025-03-01T09:05:00Z",
            "--id",
            "evt-3",
        ],
    );
    assert!(out.contains("EMERGENCY"), "unexpected output: {out}");

    // The board shows the emergency; history has one line per event.
    let board = run_ok(&db_path, &["status"]);
    assert!(board.contains("Ana"), "unexpected board: {board}");
    assert!(board.contains("EMERGENCY"), "unexpected board: {board}");

    let history = run_ok(&db_path, &["history", "p-1"]);
    assert_eq!(
        history.lines().count(),
        3,
        "one snapshot per event: {history}"
    );
}

#[test]
fn test_duplicate_event_id_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rollcall.db");

    seed_person(&db_path, "p-1", "Ana", "north");

    let args = [
        "ingest",
        "--person",
        "p-1",
        "--source",
        "biometric",
        "--kind",
        "entry",
        "--at",
        "2025-03-01T08:00:00Z",
        "--id",
        "evt-dup",
    ];
    let first = run_ok(&db_path, &args);
    let second = run_ok(&db_path, &args);

    // The re-submission resolves to the same status.
    assert_eq!(first, second);
}

#[test]
fn test_unknown_person_is_rejected() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rollcall.db");

    let output = run(
        &db_path,
        &[
            "ingest", "--person", "ghost", "--source", "panic", "--kind", "panic",
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown person"), "stderr: {stderr}");
}

#[test]
fn test_unit_filter_on_status_board() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("rollcall.db");

    seed_person(&db_path, "p-1", "Ana", "north");
    seed_person(&db_path, "p-2", "Bruno", "south");

    for (person, id) in [("p-1", "evt-1"), ("p-2", "evt-2")] {
        run_ok(
            &db_path,
            &[
                "ingest",
                "--person",
                person,
                "--source",
                "biometric",
                "--kind",
                "entry",
                "--at",
                "2025-03-01T08:00:00Z",
                "--id",
                id,
            ],
        );
    }

    let board = run_ok(&db_path, &["status", "--unit", "south"]);
    assert!(board.contains("Bruno"), "unexpected board: {board}");
    assert!(!board.contains("Ana"), "unexpected board: {board}");
}
