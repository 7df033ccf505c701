//! Output formatting utilities

use crate::diff::{ChangeKind, ChangeSummary, DiffRecord};
use crate::discovery::FileListing;
use crate::error::{CelldiffError, Result};
use crate::orchestrator::{FileComparisonOutcome, FileReport};
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::Write as _;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Records shown per file before eliding
pub const DEFAULT_RECORD_LIMIT: usize = 20;

fn format_timestamp(ts: Option<&NaiveDateTime>) -> String {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string()).unwrap_or_default()
}

/// Totals over a set of file reports
pub fn summarize(reports: &[FileReport]) -> ChangeSummary {
    let mut total = ChangeSummary::default();
    for report in reports {
        total.merge(&report.outcome.summary());
    }
    total
}

/// Pretty printer for celldiff output
pub struct PrettyPrinter {
    record_limit: usize,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self {
            record_limit: DEFAULT_RECORD_LIMIT,
        }
    }
}

impl PrettyPrinter {
    pub fn new(record_limit: usize) -> Self {
        Self { record_limit }
    }

    /// Render directory comparison results as a tree
    pub fn format_reports(&self, new_label: &str, old_label: &str, reports: &[FileReport]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "🔍 celldiff: {} → {}", new_label, old_label);

        if reports.is_empty() {
            let _ = writeln!(out, "└─ No matching files found.");
            return out;
        }

        for (i, report) in reports.iter().enumerate() {
            let last = i == reports.len() - 1;
            let (prefix, child) = if last { ("└─", "   ") } else { ("├─", "│  ") };
            self.write_report(&mut out, report, prefix, child);
        }

        let total = summarize(reports);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "📊 {} file(s): {} added, {} removed, {} changed",
            reports.len(),
            total.added,
            total.removed,
            total.changed
        );
        out
    }

    fn write_report(&self, out: &mut String, report: &FileReport, prefix: &str, child: &str) {
        let stamp = report
            .timestamp
            .as_ref()
            .map(|t| format!(" [{}]", t.format(TIMESTAMP_FORMAT)))
            .unwrap_or_default();

        let changes = match &report.outcome {
            FileComparisonOutcome::MissingBoth { note } => {
                let _ = writeln!(out, "{} ⚠️  {}{}: {}", prefix, report.filename, stamp, note);
                return;
            }
            outcome => match outcome.changes() {
                Some(changes) => changes,
                None => return,
            },
        };

        let status = match &report.outcome {
            FileComparisonOutcome::NewOnly { .. } => " (new only)",
            FileComparisonOutcome::OldOnly { .. } => " (old only)",
            _ => "",
        };

        if !changes.has_changes() {
            let _ = writeln!(out, "{} ✅ {}{}{}: unchanged", prefix, report.filename, stamp, status);
            return;
        }

        let summary = changes.summary();
        let _ = writeln!(
            out,
            "{} ❌ {}{}{}: {} added, {} removed, {} changed",
            prefix, report.filename, stamp, status, summary.added, summary.removed, summary.changed
        );

        let shown = changes.len().min(self.record_limit);
        let elided = changes.len() - shown;
        for (j, record) in changes.iter().take(shown).enumerate() {
            let marker = if j == shown - 1 && elided == 0 { "└─" } else { "├─" };
            let _ = writeln!(out, "{}{} {}", child, marker, describe_record(record));
        }
        if elided > 0 {
            let _ = writeln!(out, "{}└─ ... and {} more", child, elided);
        }
    }

    /// Render a file listing
    pub fn format_listing(listing: &[FileListing]) -> String {
        let mut out = String::new();
        if listing.is_empty() {
            let _ = writeln!(out, "No matching files found.");
            return out;
        }

        let _ = writeln!(out, "📁 Matching files:");
        for (i, entry) in listing.iter().enumerate() {
            let prefix = if i == listing.len() - 1 { "└─" } else { "├─" };
            let sides = match (entry.in_new, entry.in_old) {
                (true, true) => "new+old",
                (true, false) => "new only",
                (false, true) => "old only",
                (false, false) => "absent",
            };
            let stamp = entry
                .timestamp
                .as_ref()
                .map(|t| format!(" [{}]", t.format(TIMESTAMP_FORMAT)))
                .unwrap_or_default();
            let _ = writeln!(out, "{} {} ({}){}", prefix, entry.filename, sides, stamp);
        }
        out
    }

    /// Machine-readable one-line-per-fact summary
    pub fn format_quiet(reports: &[FileReport]) -> String {
        let total = summarize(reports);
        let changed_files = reports.iter().filter(|r| r.has_changes()).count();
        format!(
            "files={}\nfiles_changed={}\nadded={}\nremoved={}\nchanged={}\n",
            reports.len(),
            changed_files,
            total.added,
            total.removed,
            total.changed
        )
    }
}

fn describe_record(record: &DiffRecord) -> String {
    let symbol = match record.kind {
        ChangeKind::Added => "+",
        ChangeKind::Removed => "-",
        ChangeKind::Changed => "~",
    };
    match record.kind {
        ChangeKind::Added => format!("{} {} / {}: {}", symbol, record.row_key, record.col_key, record.new_value.display_or("∅")),
        ChangeKind::Removed => format!("{} {} / {}: {}", symbol, record.row_key, record.col_key, record.old_value.display_or("∅")),
        ChangeKind::Changed => format!(
            "{} {} / {}: {} → {}",
            symbol,
            record.row_key,
            record.col_key,
            record.old_value.display_or("∅"),
            record.new_value.display_or("∅")
        ),
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    summary: ChangeSummary,
    files: IndexMap<&'a str, JsonFileReport<'a>>,
}

#[derive(Serialize)]
struct JsonFileReport<'a> {
    timestamp: Option<&'a NaiveDateTime>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    summary: ChangeSummary,
    changes: &'a [DiffRecord],
}

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Reports keyed by filename, in comparison order
    pub fn format_reports(reports: &[FileReport]) -> Result<String> {
        let files: IndexMap<&str, JsonFileReport<'_>> = reports
            .iter()
            .map(|report| {
                let note = match &report.outcome {
                    FileComparisonOutcome::MissingBoth { note } => Some(note.as_str()),
                    _ => None,
                };
                let entry = JsonFileReport {
                    timestamp: report.timestamp.as_ref(),
                    status: report.outcome.status(),
                    note,
                    summary: report.outcome.summary(),
                    changes: report.outcome.changes().map_or(&[][..], |c| c.records()),
                };
                (report.filename.as_str(), entry)
            })
            .collect();

        Self::format(&JsonOutput {
            summary: summarize(reports),
            files,
        })
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    file: &'a str,
    timestamp: String,
    row_key: &'a str,
    col_key: &'a str,
    kind: &'static str,
    new_value: Cow<'a, str>,
    old_value: Cow<'a, str>,
}

/// Written for Missing cells; empty text stays an empty field
pub const CSV_MISSING_TOKEN: &str = "NA";

const CSV_HEADER: [&str; 7] = ["file", "timestamp", "row_key", "col_key", "kind", "new_value", "old_value"];

/// Flat CSV rows, one per diff record
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn format_reports(reports: &[FileReport]) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for report in reports {
            let Some(changes) = report.outcome.changes() else {
                continue;
            };
            let timestamp = format_timestamp(report.timestamp.as_ref());
            for record in changes {
                writer.serialize(CsvRow {
                    file: &report.filename,
                    timestamp: timestamp.clone(),
                    row_key: record.row_key.as_str(),
                    col_key: record.col_key.as_str(),
                    kind: record.kind.as_str(),
                    new_value: record.new_value.display_or(CSV_MISSING_TOKEN),
                    old_value: record.old_value.display_or(CSV_MISSING_TOKEN),
                })?;
            }
        }

        let bytes = writer.into_inner().map_err(|e| CelldiffError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| CelldiffError::invalid_input(e.to_string()))
    }
}
