//! Flattening datasets into long form

use crate::dataset::{Axis, Dataset};
use crate::diagnostics::AxisKind;
use crate::error::{CelldiffError, Result};
use crate::label::{canonicalize, CanonicalKey};
use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;

/// Column key given to the single value column of a Series-shaped dataset
pub const SERIES_COLUMN_KEY: &str = "value";

/// One cell of a dataset addressed by canonical keys
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongFormEntry {
    pub row_key: CanonicalKey,
    pub col_key: CanonicalKey,
    pub value: Value,
}

impl LongFormEntry {
    pub fn new(row_key: impl Into<CanonicalKey>, col_key: impl Into<CanonicalKey>, value: impl Into<Value>) -> Self {
        Self {
            row_key: row_key.into(),
            col_key: col_key.into(),
            value: value.into(),
        }
    }
}

/// Problems found with labels while normalizing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelWarning {
    /// Key cannot be decoded back to the original label
    Lossy { axis: AxisKind, key: CanonicalKey },
    /// Key occurs more than once on its axis
    Duplicate { axis: AxisKind, key: CanonicalKey },
}

/// Ordered `(row_key, col_key, value)` triples, row-major
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongForm {
    entries: Vec<LongFormEntry>,
    warnings: Vec<LabelWarning>,
}

impl LongForm {
    pub fn from_entries(entries: Vec<LongFormEntry>) -> Self {
        Self {
            entries,
            warnings: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[LongFormEntry] {
        &self.entries
    }

    pub fn warnings(&self) -> &[LabelWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LongFormEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a LongForm {
    type Item = &'a LongFormEntry;
    type IntoIter = std::slice::Iter<'a, LongFormEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Flatten a dataset into long form.
///
/// Produces exactly `rows × max(1, columns)` entries, Missing cells included.
pub fn normalize(dataset: &Dataset) -> Result<LongForm> {
    let mut warnings = Vec::new();
    let row_keys = canonicalize_axis(dataset.rows(), AxisKind::Row, &mut warnings);
    let col_keys = match dataset.columns() {
        Some(columns) => canonicalize_axis(columns, AxisKind::Column, &mut warnings),
        None => vec![CanonicalKey::new(SERIES_COLUMN_KEY)],
    };

    let mut entries = Vec::with_capacity(dataset.cell_count());
    for (row_key, values) in row_keys.iter().zip(dataset.row_values()) {
        for (col_key, value) in col_keys.iter().zip(values) {
            entries.push(LongFormEntry {
                row_key: row_key.clone(),
                col_key: col_key.clone(),
                value: value.clone(),
            });
        }
    }

    if entries.len() != dataset.cell_count() {
        return Err(CelldiffError::ShapeInvariant {
            expected: dataset.cell_count(),
            actual: entries.len(),
        });
    }

    Ok(LongForm { entries, warnings })
}

fn canonicalize_axis(axis: &Axis, kind: AxisKind, warnings: &mut Vec<LabelWarning>) -> Vec<CanonicalKey> {
    let mut seen = HashSet::with_capacity(axis.len());
    let mut reported = HashSet::new();
    let mut keys = Vec::with_capacity(axis.len());

    for label in axis.labels() {
        let canonical = canonicalize(label);
        if canonical.is_lossy {
            warnings.push(LabelWarning::Lossy {
                axis: kind,
                key: canonical.key.clone(),
            });
        }
        if !seen.insert(canonical.key.clone()) && reported.insert(canonical.key.clone()) {
            warnings.push(LabelWarning::Duplicate {
                axis: kind,
                key: canonical.key.clone(),
            });
        }
        keys.push(canonical.key);
    }

    keys
}
