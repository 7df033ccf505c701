//! File-level comparison across a new and an old directory tree

use crate::config::MissingBothPolicy;
use crate::dataset::Dataset;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink, Side};
use crate::diff::{diff, ChangeSummary, Changeset};
use crate::discovery::{self, FilePattern};
use crate::error::{CelldiffError, Result};
use crate::hash::ContentHasher;
use crate::loader::{CsvLoader, DatasetLoader};
use crate::normalize::{normalize, LabelWarning, LongForm};
use crate::timestamp;
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::btree_set;
use std::path::{Path, PathBuf};

/// Result of looking a file up in one tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Existence {
    Present(PathBuf),
    Absent { note: String },
}

impl Existence {
    /// Look up `filename` under `root`; never fails
    pub fn probe(root: &Path, filename: &str) -> Self {
        let path = root.join(filename);
        if discovery::exists(&path) {
            Self::Present(path)
        } else {
            Self::Absent {
                note: format!("{} not exists in {}", filename, root.display()),
            }
        }
    }
}

/// What happened when one file was compared
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileComparisonOutcome {
    Compared { changes: Changeset },
    NewOnly { changes: Changeset },
    OldOnly { changes: Changeset },
    MissingBoth { note: String },
}

impl FileComparisonOutcome {
    pub fn changes(&self) -> Option<&Changeset> {
        match self {
            Self::Compared { changes } | Self::NewOnly { changes } | Self::OldOnly { changes } => Some(changes),
            Self::MissingBoth { .. } => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Compared { .. } => "compared",
            Self::NewOnly { .. } => "new_only",
            Self::OldOnly { .. } => "old_only",
            Self::MissingBoth { .. } => "missing_both",
        }
    }

    pub fn summary(&self) -> ChangeSummary {
        self.changes().map(Changeset::summary).unwrap_or_default()
    }
}

/// One compared file with the timestamp its name carries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub timestamp: Option<NaiveDateTime>,
    pub outcome: FileComparisonOutcome,
}

impl FileReport {
    pub fn has_changes(&self) -> bool {
        self.outcome.changes().is_some_and(Changeset::has_changes)
    }
}

/// Compares files by name between two directory trees
pub struct Comparator<L = CsvLoader, S = LogSink> {
    loader: L,
    sink: S,
    policy: MissingBothPolicy,
    hasher: ContentHasher,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CsvLoader::default(), LogSink)
    }
}

impl<L: DatasetLoader, S: DiagnosticSink> Comparator<L, S> {
    pub fn new(loader: L, sink: S) -> Self {
        Self {
            loader,
            sink,
            policy: MissingBothPolicy::default(),
            hasher: ContentHasher::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingBothPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MissingBothPolicy {
        self.policy
    }

    /// Compare `filename` as found under `new_root` against `old_root`
    pub fn compare_file(&self, filename: &str, new_root: &Path, old_root: &Path) -> Result<FileComparisonOutcome> {
        let new = Existence::probe(new_root, filename);
        let old = Existence::probe(old_root, filename);

        match (new, old) {
            (Existence::Present(new_path), Existence::Present(old_path)) => {
                let identical = self
                    .hasher
                    .same_content(&new_path, &old_path)
                    .map_err(|e| CelldiffError::load(filename, e))?;
                if identical {
                    // One parse still validates the file and surfaces label warnings for both sides
                    let dataset = self.load(filename, &new_path)?;
                    self.long_form(filename, Side::New, &dataset)?;
                    self.long_form(filename, Side::Old, &dataset)?;
                    self.sink.emit(Diagnostic::IdenticalContent {
                        filename: filename.to_string(),
                    });
                    return Ok(FileComparisonOutcome::Compared {
                        changes: Changeset::default(),
                    });
                }

                let new_long = self.long_form(filename, Side::New, &self.load(filename, &new_path)?)?;
                let old_long = self.long_form(filename, Side::Old, &self.load(filename, &old_path)?)?;
                Ok(FileComparisonOutcome::Compared {
                    changes: diff(&new_long, &old_long),
                })
            }
            (Existence::Present(new_path), Existence::Absent { .. }) => {
                self.emit_absent(filename, Side::Old, old_root);
                let dataset = self.load(filename, &new_path)?;
                let new_long = self.long_form(filename, Side::New, &dataset)?;
                let old_long = normalize(&dataset.all_missing_like())?;
                Ok(FileComparisonOutcome::NewOnly {
                    changes: diff(&new_long, &old_long),
                })
            }
            (Existence::Absent { .. }, Existence::Present(old_path)) => {
                self.emit_absent(filename, Side::New, new_root);
                let dataset = self.load(filename, &old_path)?;
                let old_long = self.long_form(filename, Side::Old, &dataset)?;
                let new_long = normalize(&dataset.all_missing_like())?;
                Ok(FileComparisonOutcome::OldOnly {
                    changes: diff(&new_long, &old_long),
                })
            }
            (Existence::Absent { .. }, Existence::Absent { .. }) => {
                if self.policy == MissingBothPolicy::Error {
                    return Err(CelldiffError::missing_both(filename));
                }
                let note = format!("{} not exists in both dir", filename);
                self.sink.emit(Diagnostic::MissingBoth {
                    filename: filename.to_string(),
                    note: note.clone(),
                });
                Ok(FileComparisonOutcome::MissingBoth { note })
            }
        }
    }

    /// `compare_file` plus the filename timestamp
    pub fn report(&self, filename: &str, new_root: &Path, old_root: &Path) -> Result<FileReport> {
        let timestamp = timestamp::extract(filename);
        if timestamp.is_none() {
            self.sink.emit(Diagnostic::UnparsedTimestamp {
                filename: filename.to_string(),
            });
        }
        let outcome = self.compare_file(filename, new_root, old_root)?;
        Ok(FileReport {
            filename: filename.to_string(),
            timestamp,
            outcome,
        })
    }

    fn report_indexed(&self, filename: &str, new_root: &Path, old_root: &Path, index: usize, total: usize) -> Result<FileReport> {
        let report = self.report(filename, new_root, old_root)?;
        self.sink.emit(Diagnostic::FileCompared {
            filename: filename.to_string(),
            index,
            total,
            records: report.outcome.changes().map_or(0, Changeset::len),
        });
        Ok(report)
    }

    /// Lazily compare every file matching `pattern` in either tree, in name order
    pub fn compare_dirs(&self, new_root: &Path, old_root: &Path, pattern: &FilePattern) -> Result<DirectoryComparison<'_, L, S>> {
        let names = discovery::union_matching(new_root, old_root, pattern)?;
        log::debug!(
            "Found {} file(s) matching {} under {} and {}",
            names.len(),
            pattern.as_str(),
            new_root.display(),
            old_root.display()
        );
        Ok(DirectoryComparison {
            comparator: self,
            new_root: new_root.to_path_buf(),
            old_root: old_root.to_path_buf(),
            total: names.len(),
            names: names.into_iter(),
            index: 0,
        })
    }

    /// Compare every matching file on a pool of `jobs` threads.
    ///
    /// Reports come back sorted by filename. The first failing file, in
    /// filename order, fails the whole run.
    pub fn compare_dirs_parallel(
        &self,
        new_root: &Path,
        old_root: &Path,
        pattern: &FilePattern,
        jobs: usize,
    ) -> Result<Vec<FileReport>> {
        if jobs == 0 {
            return Err(CelldiffError::config("jobs must be greater than 0"));
        }
        let names: Vec<String> = discovery::union_matching(new_root, old_root, pattern)?.into_iter().collect();
        let total = names.len();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

        let results: Vec<Result<FileReport>> = pool.install(|| {
            names
                .par_iter()
                .enumerate()
                .map(|(i, name)| self.report_indexed(name, new_root, old_root, i + 1, total))
                .collect()
        });

        results.into_iter().collect()
    }

    fn load(&self, filename: &str, path: &Path) -> Result<Dataset> {
        log::debug!("Loading {}", path.display());
        self.loader.load(path).map_err(|e| CelldiffError::load(filename, e))
    }

    fn long_form(&self, filename: &str, side: Side, dataset: &Dataset) -> Result<LongForm> {
        let long = normalize(dataset)?;
        for warning in long.warnings() {
            let event = match warning {
                LabelWarning::Lossy { axis, key } => Diagnostic::LossyLabel {
                    filename: filename.to_string(),
                    side,
                    axis: *axis,
                    key: key.to_string(),
                },
                LabelWarning::Duplicate { axis, key } => Diagnostic::DuplicateLabel {
                    filename: filename.to_string(),
                    side,
                    axis: *axis,
                    key: key.to_string(),
                },
            };
            self.sink.emit(event);
        }
        Ok(long)
    }

    fn emit_absent(&self, filename: &str, side: Side, root: &Path) {
        self.sink.emit(Diagnostic::FileAbsent {
            filename: filename.to_string(),
            side,
            root: root.to_path_buf(),
        });
    }
}

/// Single-pass iterator over the file reports of a directory comparison
pub struct DirectoryComparison<'a, L, S> {
    comparator: &'a Comparator<L, S>,
    new_root: PathBuf,
    old_root: PathBuf,
    names: btree_set::IntoIter<String>,
    index: usize,
    total: usize,
}

impl<L, S> DirectoryComparison<'_, L, S> {
    /// Number of files discovered
    pub fn total(&self) -> usize {
        self.total
    }
}

impl<L: DatasetLoader, S: DiagnosticSink> Iterator for DirectoryComparison<'_, L, S> {
    type Item = Result<FileReport>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        self.index += 1;
        Some(
            self.comparator
                .report_indexed(&name, &self.new_root, &self.old_root, self.index, self.total),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl<L: DatasetLoader, S: DiagnosticSink> ExactSizeIterator for DirectoryComparison<'_, L, S> {}
