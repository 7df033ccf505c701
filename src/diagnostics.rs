//! Structured diagnostic events emitted while comparing files

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Which axis of a dataset a label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Row,
    Column,
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Column => f.write_str("column"),
        }
    }
}

/// Which tree a file was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    New,
    Old,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Old => f.write_str("old"),
        }
    }
}

/// A diagnostic event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The file is absent from one tree
    FileAbsent { filename: String, side: Side, root: PathBuf },
    /// The file is absent from both trees
    MissingBoth { filename: String, note: String },
    /// A label key cannot be decoded back to the original label
    LossyLabel { filename: String, side: Side, axis: AxisKind, key: String },
    /// The same key appears more than once on an axis
    DuplicateLabel { filename: String, side: Side, axis: AxisKind, key: String },
    /// Both files are byte-identical, the diff was skipped
    IdenticalContent { filename: String },
    /// No timestamp could be derived from the filename
    UnparsedTimestamp { filename: String },
    /// A file finished comparing
    FileCompared { filename: String, index: usize, total: usize, records: usize },
}

impl Diagnostic {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::FileAbsent { .. } | Self::MissingBoth { .. } | Self::LossyLabel { .. } | Self::DuplicateLabel { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileAbsent { filename, side, root } => {
                write!(f, "{} not exists in {} ({} side)", filename, root.display(), side)
            }
            Self::MissingBoth { note, .. } => f.write_str(note),
            Self::LossyLabel { filename, side, axis, key } => write!(
                f,
                "{}: {} label {} on {} side may not be reversible",
                filename, axis, key, side
            ),
            Self::DuplicateLabel { filename, side, axis, key } => write!(
                f,
                "{}: duplicate {} label {} on {} side, pairing by occurrence",
                filename, axis, key, side
            ),
            Self::IdenticalContent { filename } => write!(f, "{}: identical content", filename),
            Self::UnparsedTimestamp { filename } => write!(f, "{}: no timestamp in filename", filename),
            Self::FileCompared { filename, index, total, records } => write!(
                f,
                "Compared {}/{} files, current is {:?} ({} records)",
                index, total, filename, records
            ),
        }
    }
}

/// Receiver of diagnostic events
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: Diagnostic);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, event: Diagnostic) {
        match &event {
            Diagnostic::FileCompared { .. } => log::info!("{}", event),
            Diagnostic::IdenticalContent { .. } | Diagnostic::UnparsedTimestamp { .. } => log::debug!("{}", event),
            _ => log::warn!("{}", event),
        }
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _event: Diagnostic) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.events().into_iter().filter(Diagnostic::is_warning).collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Calls a closure for every event
pub struct CallbackSink<F>(pub F);

impl<F> DiagnosticSink for CallbackSink<F>
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn emit(&self, event: Diagnostic) {
        (self.0)(event)
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn emit(&self, event: Diagnostic) {
        (**self).emit(event)
    }
}
