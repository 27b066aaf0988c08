//! Integration tests for the `rdv` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise each subcommand
//! through the actual binary, including stdin piping, file input, and error
//! exits.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the bookings.json fixture.
fn bookings_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bookings.json")
}

/// Helper: path to the waiting.json fixture.
fn waiting_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/waiting.json")
}

/// Helper: an `rdv` command isolated from the caller's environment.
fn rdv() -> Command {
    let mut cmd = Command::cargo_bin("rdv").unwrap();
    cmd.env_remove("RDV_TICK_SECONDS")
        .env_remove("RDV_DEFAULT_DURATION")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: run and parse stdout as JSON.
fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// end-time
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn end_time_uses_default_duration() {
    let out = run_json(rdv().args(["end-time", "--start", "09:45"]));
    assert_eq!(out["end"], "10:15");
    assert_eq!(out["duration"], 30);
}

#[test]
fn end_time_duration_from_environment() {
    let out = run_json(
        rdv()
            .env("RDV_DEFAULT_DURATION", "45")
            .args(["end-time", "--start", "14:00"]),
    );
    assert_eq!(out["end"], "14:45");
}

#[test]
fn end_time_crossing_midnight_fails() {
    rdv()
        .args(["end-time", "--start", "23:45", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crosses midnight"));
}

#[test]
fn malformed_time_is_rejected_by_argument_parser() {
    rdv()
        .args(["end-time", "--start", "9h00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time of day"));
}

// ─────────────────────────────────────────────────────────────────────────────
// conflict
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn touching_slot_is_free() {
    let out = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "09:30",
    ]));
    assert_eq!(out["conflict"], false);
    assert_eq!(out["end"], "10:00");
    assert_eq!(out["blocking"], Value::Null);
}

#[test]
fn overlapping_slot_reports_blocking_booking() {
    let out = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "09:15",
    ]));
    assert_eq!(out["conflict"], true);
    assert_eq!(out["blocking"], 1);
}

#[test]
fn cancelled_slot_is_free_and_edit_excludes_itself() {
    let cancelled = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "11:00",
    ]));
    assert_eq!(cancelled["conflict"], false);

    let edit = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "09:15", "--exclude", "1",
    ]));
    assert_eq!(edit["conflict"], false);
}

#[test]
fn exclude_only_skips_the_booking_being_edited() {
    let out = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "09:15", "--duration", "60", "--exclude", "1",
    ]));
    assert_eq!(out["conflict"], true);
    assert_eq!(out["blocking"], 2);
    assert_eq!(out["end"], "10:15");

    let other = run_json(rdv().args([
        "conflict", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
        "--start", "09:15", "--exclude", "2",
    ]));
    assert_eq!(other["conflict"], true);
    assert_eq!(other["blocking"], 1);
}

#[test]
fn conflict_reads_bookings_from_stdin() {
    let bookings = std::fs::read_to_string(bookings_path()).unwrap();
    let out = run_json(
        rdv()
            .args(["conflict", "--practitioner", "2", "--date", "2025-12-30", "--start", "09:30"])
            .write_stdin(bookings),
    );
    assert_eq!(out["conflict"], true);
    assert_eq!(out["blocking"], 4);
}

#[test]
fn conflict_with_bad_bookings_json_fails() {
    rdv()
        .args(["conflict", "--practitioner", "1", "--date", "2025-12-30", "--start", "09:00"])
        .write_stdin(r#"[{"id":1,"practitionerId":1,"date":"2025-12-30","start":"09:00","end":"09:30","status":"Disponible"}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse bookings JSON"));
}

// ─────────────────────────────────────────────────────────────────────────────
// slots / audit
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_lists_free_default_start_times() {
    let out = run_json(rdv().args([
        "slots", "-i", bookings_path(), "--practitioner", "1", "--date", "2025-12-30",
    ]));
    let starts: Vec<&str> = out.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(starts.len(), 14);
    assert!(!starts.contains(&"09:00"));
    assert!(!starts.contains(&"10:00"));
    assert!(starts.contains(&"09:30"));
    assert!(starts.contains(&"11:00"));
}

#[test]
fn audit_of_clean_fixture_is_empty() {
    let out = run_json(rdv().args(["audit", "-i", bookings_path()]));
    assert_eq!(out, Value::Array(vec![]));
}

// ─────────────────────────────────────────────────────────────────────────────
// queue
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn queue_orders_and_reports_stats() {
    let out = run_json(rdv().args(["queue", "-i", waiting_path(), "--now", "2026-03-16T10:00:00"]));

    let order: Vec<u64> = out["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect();
    assert_eq!(order, vec![1, 3, 2, 4]);
    assert_eq!(out["entries"][0]["elapsedMinutes"], 15);
    assert_eq!(out["stats"]["waitingCount"], 3);
    assert_eq!(out["stats"]["meanWaitMinutes"], 23);
    assert_eq!(out["stats"]["nextWaiting"], 3);
    assert_eq!(out["tickSeconds"], 60);
}

#[test]
fn queue_accepts_utc_now() {
    let naive = run_json(rdv().args(["queue", "-i", waiting_path(), "--now", "2026-03-16T10:00:00"]));
    let utc = run_json(rdv().args(["queue", "-i", waiting_path(), "--now", "2026-03-16T10:00:00Z"]));
    assert_eq!(naive, utc);
}

#[test]
fn queue_call_next_swaps_call_station() {
    let out = run_json(rdv().args([
        "queue", "-i", waiting_path(), "--now", "2026-03-16T10:00:00", "--call-next",
    ]));
    assert_eq!(out["stats"]["current"], 3);
    assert_eq!(out["entries"][0]["id"], 3);
    assert_eq!(out["entries"][0]["state"], "appelé");
    assert_eq!(out["entries"][1]["id"], 1);
    assert_eq!(out["entries"][1]["state"], "en-attente");
}

#[test]
fn queue_rejects_unknown_urgency() {
    rdv()
        .args(["queue", "--now", "2026-03-16T10:00:00"])
        .write_stdin(r#"[{"id":1,"arrival":"2026-03-16T09:00:00","urgency":"urgent","role":"normal"}]"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown urgency level"));
}

#[test]
fn queue_call_unknown_entry_fails() {
    rdv()
        .args(["queue", "-i", waiting_path(), "--now", "2026-03-16T10:00:00", "--call", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot call entry 42"));
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_prints_defaults() {
    let out = run_json(rdv().arg("config"));
    assert_eq!(out["tick_seconds"], 60);
    assert_eq!(out["default_duration_minutes"], 30);
    assert_eq!(out["start_times"].as_array().unwrap().len(), 16);
}

#[test]
fn invalid_environment_override_fails() {
    rdv()
        .env("RDV_TICK_SECONDS", "0")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn missing_config_file_fails() {
    rdv()
        .args(["--config", "/nonexistent/rdv.json", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}
