//! Command-line tests for the mux-pricing binary

mod common;

use assert_cmd::Command;
use common::{write_file, FLAT_ENCODING_RATES, GAPPED_RATES};
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, isolated from the host's config files and overrides.
fn mux_pricing(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mux-pricing").unwrap();
    cmd.current_dir(workdir.path())
        .env("HOME", workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_OUTPUT")
        .env_remove("MUX_PRICING_RATES")
        .env_remove("MUX_PRICING_PLAN_CREDIT")
        .env_remove("MUX_PRICING_MINIMUM_CHARGE")
        .env_remove("MUX_PRICING_LOG_DIR")
        .env("LOG_LEVEL", "ERROR");
    cmd
}

fn encoding_only_usage(workdir: &TempDir, toggle: &str) -> serde_json::Value {
    let output = mux_pricing(workdir)
        .args(["estimate", "--json", toggle, "--encoding", "1000"])
        .args(["--live-encoding", "0", "--storage", "0", "--streaming", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["usage"].clone()
}

#[test]
fn test_estimate_json_with_flat_rates() {
    let temp_dir = TempDir::new().unwrap();
    let rates = write_file(temp_dir.path(), "rates.toml", FLAT_ENCODING_RATES).unwrap();

    let output = mux_pricing(&temp_dir)
        .args(["estimate", "--json", "--smart", "--encoding", "1000"])
        .args(["--live-encoding", "0", "--storage", "0", "--streaming", "0"])
        .arg("--rates")
        .arg(&rates)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let record = json["records"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["sku"] == "smart_encoding_720p")
        .unwrap();
    assert!((record["total_spend"].as_f64().unwrap() - 5.0).abs() < 1e-9);
    assert_eq!(json["bill"]["adjusted_total"], 10.0);
}

#[test]
fn test_estimate_report_with_bundled_rates() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .arg("estimate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Monthly Spend"))
        .stdout(predicate::str::contains("live_encoding_720p"));
}

#[test]
fn test_estimate_reports_mix_advisory() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--res-1080p", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolutions do not add to 100%"));
}

#[test]
fn test_estimate_from_scenario_file() {
    let temp_dir = TempDir::new().unwrap();
    let scenario = write_file(
        temp_dir.path(),
        "scenario.toml",
        r#"
baseline_encoding = false

[volumes]
encoding = 2000.0
live_encoding = 0.0
storage = 0.0
streaming = 0.0

[resolution_mix]
720p = 0.0
1080p = 100.0
"#,
    )
    .unwrap();

    let output = mux_pricing(&temp_dir)
        .args(["estimate", "--json", "--scenario"])
        .arg(&scenario)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["usage"]["smart_encoding_1080p"], 2000.0);
    assert_eq!(json["usage"]["smart_encoding_720p"], 0.0);
}

#[test]
fn test_bandwidth_estimate_rejects_zero_bitrate() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--library-gb", "100", "--bitrate", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bitrate"));
}

#[test]
fn test_gapped_rate_table_fails_with_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let rates = write_file(temp_dir.path(), "gapped.toml", GAPPED_RATES).unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--json", "--rates"])
        .arg(&rates)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\""))
        .stdout(predicate::str::contains("Gap in tiers"));
}

#[test]
fn test_convert_library_size() {
    let temp_dir = TempDir::new().unwrap();

    let output = mux_pricing(&temp_dir)
        .args(["convert", "--json", "--library-gb", "100", "--bitrate", "3.5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["storage_minutes"].as_f64().unwrap().round(), 3901.0);
    assert_eq!(json["streaming_minutes"], 0.0);
}

#[test]
fn test_tiers_for_one_sku() {
    let temp_dir = TempDir::new().unwrap();

    let output = mux_pricing(&temp_dir)
        .args(["tiers", "--json", "--sku", "streaming_720p"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tiers = json["tier"].as_array().unwrap();
    assert!(!tiers.is_empty());
    assert!(tiers.iter().all(|t| t["sku"] == "streaming_720p"));
    assert!(tiers.last().unwrap().get("end").is_none());
}

#[test]
fn test_tiers_rejects_unknown_sku() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .args(["tiers", "--sku", "8k_encoding"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown SKU"));
}

#[test]
fn test_baseline_flag_bills_baseline_encoding() {
    let temp_dir = TempDir::new().unwrap();
    let usage = encoding_only_usage(&temp_dir, "--baseline");

    assert_eq!(usage["baseline_encoding_720p"], 1000.0);
    assert_eq!(usage["smart_encoding_720p"], 0.0);
}

#[test]
fn test_smart_flag_bills_smart_encoding() {
    let temp_dir = TempDir::new().unwrap();
    let usage = encoding_only_usage(&temp_dir, "--smart");

    assert_eq!(usage["smart_encoding_720p"], 1000.0);
    assert_eq!(usage["baseline_encoding_720p"], 0.0);
}

#[test]
fn test_baseline_and_smart_conflict() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--baseline", "--smart"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_bitrate_without_bandwidth_inputs_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--bitrate", "3.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bitrate"));
}

#[test]
fn test_partial_rate_table_lists_unpriced_skus() {
    let temp_dir = TempDir::new().unwrap();
    let rates = write_file(temp_dir.path(), "partial.toml", FLAT_ENCODING_RATES).unwrap();

    mux_pricing(&temp_dir)
        .args(["estimate", "--smart", "--rates"])
        .arg(&rates)
        .assert()
        .success()
        .stdout(predicate::str::contains("smart_encoding_720p"))
        .stdout(predicate::str::contains("Could not price"))
        .stdout(predicate::str::contains("No pricing tier for streaming_720p"));
}

#[test]
fn test_all_flag_shows_zero_usage_rows() {
    let temp_dir = TempDir::new().unwrap();

    mux_pricing(&temp_dir)
        .arg("estimate")
        .assert()
        .success()
        .stdout(predicate::str::contains("streaming_2160p").not());

    mux_pricing(&temp_dir)
        .args(["estimate", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streaming_2160p"));
}

#[test]
fn test_file_logs_survive_a_failed_command() {
    let temp_dir = TempDir::new().unwrap();
    let log_dir = temp_dir.path().join("logs");
    let table = format!("{}{}", FLAT_ENCODING_RATES, GAPPED_RATES);
    let rates = write_file(temp_dir.path(), "rates.toml", &table).unwrap();

    mux_pricing(&temp_dir)
        .env("RUST_LOG", "debug")
        .env("LOG_OUTPUT", "file")
        .env("MUX_PRICING_LOG_DIR", &log_dir)
        .args(["tiers", "--rates"])
        .arg(&rates)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Gap in tiers"));

    let logs: String = std::fs::read_dir(&log_dir)
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    assert!(logs.contains("Validated tier schedule"));
    assert!(logs.contains("Gap in tiers"));
}
