//! Directory-level comparison: ordering, laziness and the worker pool

use crate::common::{sample_data, TestFixture};
use celldiff::diagnostics::{CallbackSink, CollectingSink, Diagnostic, NullSink};
use celldiff::discovery::FilePattern;
use celldiff::loader::CsvLoader;
use celldiff::orchestrator::{Comparator, FileReport};
use celldiff::{CelldiffError, MissingBothPolicy, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

fn csv_pattern() -> FilePattern {
    FilePattern::new("*.csv").unwrap()
}

#[test]
fn test_reports_cover_union_in_name_order() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("c.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_new_csv("a.csv", &sample_data::updated_csv_data()).unwrap();
    fixture.create_old_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_old_csv("b.csv", &sample_data::simple_csv_data()).unwrap();

    let comparator = Comparator::new(CsvLoader::default(), NullSink);
    let reports: Vec<FileReport> = comparator
        .compare_dirs(&fixture.new_dir, &fixture.old_dir, &csv_pattern())
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    let names: Vec<(&str, &str)> = reports
        .iter()
        .map(|r| (r.filename.as_str(), r.outcome.status()))
        .collect();
    assert_eq!(names, vec![("a.csv", "compared"), ("b.csv", "old_only"), ("c.csv", "new_only")]);
}

#[test]
fn test_iteration_is_lazy() {
    let fixture = TestFixture::new().unwrap();
    for name in ["a.csv", "b.csv", "c.csv"] {
        fixture.create_new_csv(name, &sample_data::simple_csv_data()).unwrap();
    }

    let compared = AtomicUsize::new(0);
    let sink = CallbackSink(|event: Diagnostic| {
        if matches!(event, Diagnostic::FileCompared { .. }) {
            compared.fetch_add(1, Ordering::SeqCst);
        }
    });
    let comparator = Comparator::new(CsvLoader::default(), sink);
    let mut iter = comparator
        .compare_dirs(&fixture.new_dir, &fixture.old_dir, &csv_pattern())
        .unwrap();

    assert_eq!(compared.load(Ordering::SeqCst), 0);
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.filename, "a.csv");
    assert_eq!(compared.load(Ordering::SeqCst), 1);
    assert_eq!(iter.len(), 2);
}

#[test]
fn test_rerunning_yields_the_same_reports() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("a.csv", &sample_data::updated_csv_data()).unwrap();
    fixture.create_old_csv("a.csv", &sample_data::simple_csv_data()).unwrap();

    let comparator = Comparator::new(CsvLoader::default(), NullSink);
    let run = || -> Vec<FileReport> {
        comparator
            .compare_dirs(&fixture.new_dir, &fixture.old_dir, &csv_pattern())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_parallel_pool_matches_sequential() {
    let fixture = TestFixture::new().unwrap();
    for i in 0..12 {
        let name = format!("file_{:02}.csv", i);
        fixture.create_large_pair(&name, 40, 5, i).unwrap();
    }

    let sink = CollectingSink::new();
    let comparator = Comparator::new(CsvLoader::default(), &sink);
    let sequential: Vec<FileReport> = comparator
        .compare_dirs(&fixture.new_dir, &fixture.old_dir, &csv_pattern())
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    let parallel = comparator
        .compare_dirs_parallel(&fixture.new_dir, &fixture.old_dir, &csv_pattern(), 4)
        .unwrap();

    assert_eq!(sequential, parallel);
    for (i, report) in parallel.iter().enumerate() {
        assert_eq!(report.outcome.summary().changed, i);
    }

    let compared = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, Diagnostic::FileCompared { total: 12, .. }))
        .count();
    assert_eq!(compared, 24);
}

#[test]
fn test_strict_policy_stops_directory_run() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("a.csv", &sample_data::simple_csv_data()).unwrap();

    let comparator = Comparator::new(CsvLoader::default(), NullSink).with_policy(MissingBothPolicy::Error);
    // Discovered files always exist on at least one side
    let reports: Result<Vec<FileReport>> = comparator
        .compare_dirs(&fixture.new_dir, &fixture.old_dir, &csv_pattern())
        .unwrap()
        .collect();
    assert_eq!(reports.unwrap().len(), 1);

    assert!(matches!(
        comparator.compare_file("zzz.csv", &fixture.new_dir, &fixture.old_dir),
        Err(CelldiffError::MissingBoth { .. })
    ));
}

#[test]
fn test_parallel_surfaces_load_errors() {
    let fixture = TestFixture::new().unwrap();
    fixture.create_new_csv("a.csv", &sample_data::simple_csv_data()).unwrap();
    fixture.create_raw("new/b.csv", "id,v\n1,2,3\n").unwrap();

    let comparator = Comparator::new(CsvLoader::default(), NullSink);
    let error = comparator
        .compare_dirs_parallel(&fixture.new_dir, &fixture.old_dir, &csv_pattern(), 2)
        .unwrap_err();
    assert!(matches!(error, CelldiffError::Load { ref filename, .. } if filename == "b.csv"));
}
