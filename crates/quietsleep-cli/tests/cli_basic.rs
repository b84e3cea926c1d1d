//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with QUIETSLEEP_CONFIG_DIR pointed at a
//! temporary directory and check stdout, which carries JSON events.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against `config_dir` and return (stdout, stderr, code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_quietsleep-cli"))
        .args(args)
        .env("QUIETSLEEP_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn events(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON event"))
        .collect()
}

fn types(events: &[serde_json::Value]) -> Vec<&str> {
    events.iter().filter_map(|e| e["type"].as_str()).collect()
}

#[test]
fn test_rhythm_list() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["rhythm", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("box"));
    assert!(stdout.contains("4-7-8"));
    assert!(stdout.contains("relax"));
}

#[test]
fn test_rhythm_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["rhythm", "list", "--json"]);
    assert_eq!(code, 0);
    let presets: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(presets.as_array().map(Vec::len), Some(3));
    assert_eq!(presets[1]["rhythm"]["hold_secs"], 7);
}

#[test]
fn test_rhythm_timers() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["rhythm", "timers"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("480:00"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "preferences.language", "zh"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "preferences.language"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "zh");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_unknown_key_and_bad_value() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "preferences.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "preferences.volume", "3"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "preferences.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "preferences.timer_minutes", "60"]);

    let (stdout, _, code) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("preferences.timer_minutes = 60"));

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "preferences.timer_minutes"]);
    assert_eq!(stdout.trim(), "30");
}

#[test]
fn test_session_simulate_prints_phase_events() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["session", "simulate", "--guide", "--rhythm", "2-2-2", "--seconds", "6"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let events = events(&stdout);
    let types = types(&events);
    assert_eq!(types.first(), Some(&"SessionStarted"));
    assert_eq!(types.last(), Some(&"SessionStopped"));

    let phases: Vec<&str> = events
        .iter()
        .filter(|e| e["type"] == "PhaseStarted")
        .filter_map(|e| e["phase"].as_str())
        .collect();
    assert_eq!(phases, vec!["inhale", "hold", "exhale", "inhale"]);
}

#[test]
fn test_session_simulate_timer_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "session", "simulate", "--noise", "pink", "--timer", "1", "--seconds", "120",
            "--seed", "1",
        ],
    );
    assert_eq!(code, 0);
    let events = events(&stdout);
    let stopped: Vec<_> = events
        .iter()
        .filter(|e| e["type"] == "SessionStopped")
        .collect();
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0]["reason"], "timer_expired");
    assert!(types(&events).contains(&"NoiseStopped"));
}

#[test]
fn test_session_simulate_rejects_bad_rhythm() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["session", "simulate", "--rhythm", "4-0-6"]);
    assert_ne!(code, 0);
}

#[test]
fn test_session_missing_assets_degrade() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "session", "simulate", "--noise", "rain", "--verify-assets", "--asset-root",
            dir.path().to_str().unwrap(), "--seconds", "5",
        ],
    );
    assert_eq!(code, 0);
    let events = events(&stdout);
    assert!(types(&events).contains(&"AudioWarning"));
    assert!(!types(&events).contains(&"NoiseStarted"));
}

#[test]
fn test_session_run_stops_after_limit() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["session", "run", "--guide", "--rhythm", "2-2-2", "--seconds", "1"],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let events = events(&stdout);
    let types = types(&events);
    assert_eq!(types.first(), Some(&"SessionStarted"));
    assert_eq!(types.last(), Some(&"SessionStopped"));
    assert!(types.contains(&"PhaseTick"));
}

#[test]
fn test_noise_render_writes_wav() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pink.wav");
    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "noise", "render", "--kind", "pink", "--seconds", "0.5", "--sample-rate", "8000",
            "--seed", "4", "--out", out.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["samples"], 4000);
    assert!(out.exists());
}

#[test]
fn test_noise_render_rejects_recorded_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("rain.wav");
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["noise", "render", "--kind", "rain", "--out", out.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("not synthesised"));
}

#[test]
fn test_meditation_play() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["meditation", "play", "en-2"]);
    assert_eq!(code, 0);
    let events = events(&stdout);
    assert_eq!(types(&events), vec!["MeditationStarted", "MeditationStopped"]);

    let (_, _, code) = run_cli(dir.path(), &["meditation", "play", "xx-9"]);
    assert_eq!(code, 1);
}
