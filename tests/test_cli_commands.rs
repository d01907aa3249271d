mod common;

use common::{fixture_path, spawn_command};

const TRANSITION_ERROR: i32 = 5;
const CONFIG_ERROR: i32 = 2;

#[test]
fn version_json() {
    let output = spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    assert_eq!(parsed["name"], "vtshim");
}

#[test]
fn scenario_list_json() {
    let output = spawn_command(&["scenario", "list", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output should be valid JSON");
    let names: Vec<&str> = parsed
        .as_array()
        .expect("array of scenarios")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"normal"));
    assert!(names.contains(&"double-start"));
}

#[test]
fn scenario_run_passes() {
    let output = spawn_command(&["scenario", "run", "double-start", "--format", "json"]);
    assert!(
        output.status.success(),
        "double-start should pass: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should be valid JSON");
    assert_eq!(report["passed"], true);
    assert_eq!(report["observed"], report["expected"]);
}

#[test]
fn scenario_run_unknown_suggests() {
    let output = spawn_command(&["scenario", "run", "nromal"]);
    assert_eq!(output.status.code(), Some(TRANSITION_ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("did you mean 'normal'"), "stderr: {stderr}");
}

#[test]
fn scenario_run_fails_when_order_differs() {
    let config = fixture_path("hidden.yaml");
    let output = spawn_command(&[
        "scenario",
        "run",
        "normal",
        "--config",
        config.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(TRANSITION_ERROR));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should be valid JSON");
    assert_eq!(report["passed"], false);
    assert_eq!(report["observed"][0], "readyCatch");
}

#[test]
fn scenario_run_writes_events() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = spawn_command(&[
        "scenario",
        "run",
        "normal",
        "--quiet",
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let contents = std::fs::read_to_string(&events).unwrap();
    let types: Vec<String> = contents
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["type"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    assert_eq!(types.first().map(String::as_str), Some("TransitionStarted"));
    assert_eq!(types.last().map(String::as_str), Some("ScenarioCompleted"));
    assert_eq!(types.iter().filter(|t| *t == "SignalSettled").count(), 3);
}

#[test]
fn config_validate_valid() {
    let config = fixture_path("valid.yaml");
    let output = spawn_command(&[
        "config",
        "validate",
        config.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(
        output.status.success(),
        "validate should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["frame_interval_ms"], 8);
    assert_eq!(parsed["skip_timeout_ms"], 2000);
}

#[test]
fn config_validate_unknown_field() {
    let config = fixture_path("unknown_field.yaml");
    let output = spawn_command(&["config", "validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(CONFIG_ERROR));
}

#[test]
fn config_validate_missing_file() {
    let output = spawn_command(&[
        "config",
        "validate",
        "/tmp/nonexistent_vtshim_test_file.yaml",
    ]);
    assert!(!output.status.success());
}

#[test]
fn config_validate_overflowing_duration() {
    let config = fixture_path("overflow.yaml");
    let output = spawn_command(&["config", "validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(CONFIG_ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skip_timeout"), "stderr: {stderr}");
}
