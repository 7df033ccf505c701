//! # celldiff
//!
//! Cell-level comparison of tabular files kept as two directory trees, a
//! "new" one and an "old" one. Files are matched by name, loaded into
//! labeled datasets, flattened into long form keyed by canonical row and
//! column labels, and joined to report every added, removed and changed
//! cell.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod hash;
pub mod label;
pub mod loader;
pub mod logging;
pub mod normalize;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod timestamp;
pub mod value;

pub use config::{CompareConfig, MissingBothPolicy};
pub use dataset::{Axis, Dataset};
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use diff::{diff, ChangeKind, Changeset, DiffRecord};
pub use error::{CelldiffError, Result};
pub use label::{canonicalize, decode, CanonicalKey, Label, LabelElement};
pub use loader::{CsvLoader, DatasetLoader, LoadOptions};
pub use normalize::{normalize, LongForm};
pub use orchestrator::{Comparator, Existence, FileComparisonOutcome, FileReport};
pub use value::{Scalar, Value};
