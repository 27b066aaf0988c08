//! Tests for engine configuration parsing and validation.

use rdv_engine::{EngineConfig, RdvError, DEFAULT_START_TIMES};

#[test]
fn empty_document_yields_defaults() {
    let config = EngineConfig::from_json("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.tick_seconds, 60);
    assert_eq!(config.default_duration_minutes, 30);
    assert_eq!(config.start_times, DEFAULT_START_TIMES.to_vec());
}

#[test]
fn fields_override_defaults() {
    let config =
        EngineConfig::from_json(r#"{"tick_seconds": 15, "start_times": ["07:30", "08:00"]}"#)
            .unwrap();
    assert_eq!(config.tick_seconds, 15);
    assert_eq!(config.default_duration_minutes, 30);
    assert_eq!(config.start_times.len(), 2);
}

#[test]
fn zero_tick_is_rejected() {
    assert!(matches!(
        EngineConfig::from_json(r#"{"tick_seconds": 0}"#),
        Err(RdvError::InvalidConfig(_))
    ));
}

#[test]
fn start_time_that_cannot_fit_default_duration_is_rejected() {
    let err = EngineConfig::from_json(r#"{"start_times": ["23:45"]}"#).unwrap_err();
    assert!(err.to_string().contains("23:45"));
}

#[test]
fn unknown_fields_and_bad_times_are_rejected() {
    assert!(EngineConfig::from_json(r#"{"tick": 60}"#).is_err());
    assert!(EngineConfig::from_json(r#"{"start_times": ["8h00"]}"#).is_err());
}
