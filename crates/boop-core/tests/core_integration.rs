#![allow(clippy::unwrap_used, clippy::expect_used)]

use boop_core::*;
use chrono::Utc;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// 1. Configuration files on disk
// ---------------------------------------------------------------------------

#[test]
fn load_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("boop.toml");
    std::fs::write(
        &path,
        r#"
        [tracker]
        application_id = "sticky-boop"
        instance_id = "ci"
        disabled = false
        send_session_flop_events = false

        [sink]
        kind = "jsonl"
        dir = "events"
        "#,
    )
    .unwrap();

    let config = BoopConfig::load(&path).unwrap();
    assert_eq!(config.tracker.namespace(), "sticky-boop-dev");
    assert!(!config.tracker.disabled);
    assert!(!config.tracker.send_session_flop_events);
    assert_eq!(
        config.sink,
        SinkConfig::Jsonl {
            dir: PathBuf::from("events")
        }
    );
}

#[test]
fn explicit_missing_path_is_config_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("absent.toml");
    let err = BoopConfig::discover(Some(&path)).unwrap_err();
    assert!(matches!(err, BoopError::ConfigNotFound(paths) if paths == vec![path]));
}

#[test]
fn malformed_file_names_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("boop.toml");
    std::fs::write(&path, "[tracker\napplication_id = 1").unwrap();
    let err = BoopConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("boop.toml"));
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("boop.toml");
    std::fs::write(
        &path,
        "[tracker]\napplication_id = \"a\"\nsession_timeout_seconds = -5\n",
    )
    .unwrap();
    assert!(matches!(BoopConfig::load(&path), Err(BoopError::Config(_))));
}

// ---------------------------------------------------------------------------
// 2. Records
// ---------------------------------------------------------------------------

#[test]
fn record_wire_shape() {
    let ts = Utc::now();
    let record = EventRecord::new("Tap", Some("home".into()), None, "ci", ts).with_session(None);
    let json = serde_json::to_value(&record).unwrap();
    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["event", "instance", "label", "sessionId", "timestamp", "value"]);

    let back: EventRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}
