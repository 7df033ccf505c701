//! Edge case tests for filesystem-related scenarios

use crate::common::{sample_data, CliTestRunner, TestFixture};
use celldiff::diagnostics::{CollectingSink, Diagnostic, Side};
use celldiff::discovery::FilePattern;
use celldiff::loader::CsvLoader;
use celldiff::orchestrator::{Comparator, FileComparisonOutcome};
use celldiff::CelldiffError;
use std::fs;

#[test]
fn test_nonexistent_directories_compare_to_nothing() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let missing_new = fixture.root().join("missing_new");
    let missing_old = fixture.root().join("missing_old");

    runner.expect_success(&["compare", missing_new.to_str().unwrap(), missing_old.to_str().unwrap()]);
}

#[test]
fn test_file_absent_on_one_side_emits_diagnostic() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("a.csv", &sample_data::simple_csv_data()).unwrap();

    let sink = CollectingSink::new();
    let outcome = Comparator::new(CsvLoader::default(), &sink)
        .compare_file("a.csv", &fixture.new_dir, &fixture.old_dir)
        .unwrap();
    assert!(matches!(outcome, FileComparisonOutcome::NewOnly { .. }));

    let warnings = sink.warnings();
    assert_eq!(warnings.len(), 1);
    match &warnings[0] {
        Diagnostic::FileAbsent { filename, side, root } => {
            assert_eq!(filename, "a.csv");
            assert_eq!(*side, Side::Old);
            assert_eq!(root, &fixture.old_dir);
        }
        other => panic!("Expected FileAbsent, got {:?}", other),
    }
    assert!(warnings[0].to_string().contains("a.csv not exists in"));
}

#[test]
fn test_directory_named_like_a_file_is_absent() {
    let fixture = TestFixture::new().unwrap();
    fs::create_dir_all(fixture.new_dir.join("a.csv")).unwrap();
    fixture.create_old_csv("a.csv", &sample_data::simple_csv_data()).unwrap();

    let outcome = Comparator::new(CsvLoader::default(), CollectingSink::new())
        .compare_file("a.csv", &fixture.new_dir, &fixture.old_dir)
        .unwrap();
    assert!(matches!(outcome, FileComparisonOutcome::OldOnly { .. }));
}

#[test]
fn test_nested_files_are_not_discovered() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_raw("new/nested/a.csv", "id,v\n1,2\n").unwrap();
    fixture.create_raw("old/nested/a.csv", "id,v\n1,3\n").unwrap();

    let comparator = Comparator::new(CsvLoader::default(), CollectingSink::new());
    let pattern = FilePattern::new("*.csv").unwrap();
    let reports = comparator.compare_dirs(&fixture.new_dir, &fixture.old_dir, &pattern).unwrap();
    assert_eq!(reports.len(), 0);
}

#[test]
fn test_identical_malformed_files_are_load_errors() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_raw("new/a.csv", "id,v\n1,2,3\n").unwrap();
    fixture.create_raw("old/a.csv", "id,v\n1,2,3\n").unwrap();

    let error = Comparator::new(CsvLoader::default(), CollectingSink::new())
        .compare_file("a.csv", &fixture.new_dir, &fixture.old_dir)
        .unwrap_err();
    assert!(matches!(error, CelldiffError::Load { ref filename, .. } if filename == "a.csv"));
}

#[test]
fn test_identical_files_skip_the_diff() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_old_csv("a.csv", &sample_data::simple_csv_data()).unwrap();

    let sink = CollectingSink::new();
    let outcome = Comparator::new(CsvLoader::default(), &sink)
        .compare_file("a.csv", &fixture.new_dir, &fixture.old_dir)
        .unwrap();
    assert_eq!(outcome.changes().map(|c| c.len()), Some(0));
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, Diagnostic::IdenticalContent { .. })));
}

#[test]
fn test_output_into_new_directory() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_new_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    let output = fixture.root().join("deep").join("nested").join("out.csv");

    runner.expect_success(&[
        "compare",
        fixture.new_path(),
        fixture.old_path(),
        "--format",
        "csv",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(output.exists());
}

#[test]
fn test_unparsed_timestamp_is_reported_not_fatal() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("prices.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_old_csv("prices.csv", &sample_data::simple_csv_data()).unwrap();

    let sink = CollectingSink::new();
    let report = Comparator::new(CsvLoader::default(), &sink)
        .report("prices.csv", &fixture.new_dir, &fixture.old_dir)
        .unwrap();
    assert!(report.timestamp.is_none());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, Diagnostic::UnparsedTimestamp { .. })));
}
