//! Integration tests for the single-file command

use crate::common::{sample_data, CliTestRunner};
use celldiff::CelldiffError;
use std::fs;

#[test]
fn test_file_command_compares_one_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_new_csv("a.csv", &sample_data::updated_csv_data()).unwrap();
    fixture.create_old_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_new_csv("b.csv", &sample_data::simple_csv_data()).unwrap();
    let output = fixture.root().join("a.json");

    runner.expect_success(&[
        "file",
        "a.csv",
        fixture.new_path(),
        fixture.old_path(),
        "--format",
        "json",
        "--output",
        output.to_str().unwrap(),
    ]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let files = json["files"].as_object().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files.contains_key("a.csv"));
}

#[test]
fn test_file_missing_both_is_reported() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let output = fixture.root().join("gone.json");

    runner.expect_success(&[
        "file",
        "gone.csv",
        fixture.new_path(),
        fixture.old_path(),
        "--format",
        "json",
        "--output",
        output.to_str().unwrap(),
    ]);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["files"]["gone.csv"]["status"], "missing_both");
    assert_eq!(json["files"]["gone.csv"]["note"], "gone.csv not exists in both dir");
}

#[test]
fn test_file_missing_both_strict_fails() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();

    let error = runner.expect_failure(&["file", "gone.csv", fixture.new_path(), fixture.old_path(), "--strict"]);
    assert!(matches!(error, CelldiffError::MissingBoth { ref filename } if filename == "gone.csv"));
    assert_eq!(error.to_string(), "gone.csv not exists in both dir");
}

#[test]
fn test_file_old_only_csv_output() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture
        .create_old_csv("a.csv", &[vec!["id", "v"], vec!["r1", "1"], vec!["r2", ""]])
        .unwrap();
    let output = fixture.root().join("a.csv.out");

    runner.expect_success(&[
        "file",
        "a.csv",
        fixture.new_path(),
        fixture.old_path(),
        "--format",
        "csv",
        "--output",
        output.to_str().unwrap(),
    ]);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "a.csv,,r1,v,removed,NA,1");
}
