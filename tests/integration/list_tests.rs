//! Integration tests for the list command

use crate::common::{sample_data, CliTestRunner};

#[test]
fn test_list_pretty() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_new_csv("2021-01-01.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_old_csv("2021-01-02.csv", &sample_data::simple_csv_data()).unwrap();

    runner.expect_success(&["list", fixture.new_path(), fixture.old_path()]);
}

#[test]
fn test_list_json_with_pattern() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_raw("new/a.tsv", "id\tv\n1\t2\n").unwrap();

    runner.expect_success(&["list", fixture.new_path(), fixture.old_path(), "--pattern", "*.tsv", "--format", "json"]);
}

#[test]
fn test_list_empty_and_missing_dirs() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let missing = fixture.root().join("nowhere");

    runner.expect_success(&["list", fixture.new_path(), missing.to_str().unwrap()]);
}

#[test]
fn test_list_rejects_csv_format() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let error = runner.expect_failure(&["list", fixture.new_path(), fixture.old_path(), "--format", "csv"]);
    assert!(error.to_string().contains("pretty"));
}
