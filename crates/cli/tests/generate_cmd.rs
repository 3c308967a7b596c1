//! CLI tests for the `tagforge generate` subcommand.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn tagforge_cmd() -> Command {
    Command::new(cargo::cargo_bin!("tagforge"))
}

fn write_records(json: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    fs::write(&path, json).expect("write records");
    (dir, path.to_string_lossy().to_string())
}

const TWO_RECORDS: &str = r#"[
    {"code": "PAT-001-2024", "description": "LAPTOP", "qr_payload": "abc123"},
    {"code": "PAT-002-2024", "condition": "B", "qr_payload": "def456"}
]"#;

#[test]
fn generate_emits_balanced_batch_to_stdout() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args(["generate", "--records", &records, "--output", "json"])
        .output()
        .expect("run generate");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    assert_eq!(envelope["ok"], true);
    assert_eq!(envelope["labels"], 2);

    let program = envelope["program"].as_str().expect("program text");
    assert_eq!(program.matches("^XA").count(), 2);
    assert_eq!(program.matches("^XZ").count(), 2);
    assert!(program.contains("^FDPAT-001-2024^FS"));
    assert!(program.contains("^FDQA,def456^FS"));
}

#[test]
fn generate_out_writes_file_instead_of_stdout() {
    let (dir, records) = write_records(TWO_RECORDS);
    let out = dir.path().join("batch.zpl");
    let out_path = out.to_string_lossy().to_string();

    let output = tagforge_cmd()
        .args([
            "generate", "--records", &records, "--out", &out_path, "--output", "json",
        ])
        .output()
        .expect("run generate");
    assert!(output.status.success());

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    assert_eq!(envelope["program"], serde_json::Value::Null);
    assert_eq!(envelope["out"], out_path);

    let written = fs::read_to_string(&out).expect("batch file");
    assert_eq!(written.matches("^XA").count(), 2);
}

#[test]
fn generate_with_printer_uses_catalog_preset() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args([
            "generate", "--records", &records, "--printer", "ZD411_203", "--output", "json",
        ])
        .output()
        .expect("run generate");
    assert!(
        output.status.success(),
        "generate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    let program = envelope["program"].as_str().expect("program text");
    // Compact ticket preset: no date stamp, no separator rule, 20-dot title.
    assert!(program.contains("^A0N,20,20"));
    assert!(!program.contains("^GB379,1,1"));
}

#[test]
fn generate_unknown_printer_fails() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args(["generate", "--records", &records, "--printer", "ZT410"])
        .output()
        .expect("run generate");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ZT410"), "stderr: {stderr}");
}

#[test]
fn generate_invalid_dimensions_exit_nonzero_with_issues() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args([
            "generate", "--records", &records, "--width", "100", "--height", "100",
            "--output", "json",
        ])
        .output()
        .expect("run generate");
    assert!(!output.status.success());

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    assert_eq!(envelope["ok"], false);
    let issues = envelope["issues"].as_array().expect("issues array");
    assert!(
        issues
            .iter()
            .any(|i| i.as_str().unwrap_or_default().contains("width")),
        "expected a width violation: {issues:?}"
    );
}

#[test]
fn generate_unknown_size_preset_fails() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args(["generate", "--records", &records, "--size", "gigantic"])
        .output()
        .expect("run generate");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gigantic"), "stderr: {stderr}");
}

#[test]
fn generate_fields_flag_limits_rendering() {
    let (_dir, records) = write_records(TWO_RECORDS);
    let output = tagforge_cmd()
        .args([
            "generate", "--records", &records, "--fields", "asset-code", "--no-qr",
            "--output", "json",
        ])
        .output()
        .expect("run generate");
    assert!(output.status.success());

    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    let program = envelope["program"].as_str().expect("program text");
    assert!(program.contains("^FDPAT-001-2024^FS"));
    assert!(!program.contains("LAPTOP"));
    assert!(!program.contains("^FDQA"));
}

#[test]
fn generate_malformed_records_file_fails() {
    let (_dir, records) = write_records("not json");
    let output = tagforge_cmd()
        .args(["generate", "--records", &records])
        .output()
        .expect("run generate");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot parse"), "stderr: {stderr}");
}
