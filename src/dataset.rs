//! Labeled 2-D datasets

use crate::error::{CelldiffError, Result};
use crate::label::Label;
use crate::value::Value;

/// An ordered sequence of labels with a fixed number of levels
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    labels: Vec<Label>,
    levels: usize,
}

impl Axis {
    /// Create an axis, checking every label spans exactly `levels` levels
    pub fn new(labels: Vec<Label>, levels: usize) -> Result<Self> {
        if levels == 0 {
            return Err(CelldiffError::invalid_dataset("axis must have at least one level"));
        }
        if let Some((pos, label)) = labels.iter().enumerate().find(|(_, l)| l.arity() != levels) {
            return Err(CelldiffError::invalid_dataset(format!(
                "label {} has {} levels, axis has {}",
                pos,
                label.arity(),
                levels
            )));
        }
        Ok(Self { labels, levels })
    }

    /// Single-level axis
    pub fn flat<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Result<Self> {
        Self::new(labels.into_iter().map(Into::into).collect(), 1)
    }

    /// `0..len` positional labels, like a default range index
    pub fn range(len: usize) -> Self {
        Self {
            labels: (0..len as i64).map(Label::from).collect(),
            levels: 1,
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Rows × columns grid of cell values.
///
/// A dataset without column labels is Series-shaped and has exactly one
/// value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    rows: Axis,
    columns: Option<Axis>,
    cells: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(rows: Axis, columns: Option<Axis>, cells: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(cols) = &columns {
            if cols.is_empty() {
                return Err(CelldiffError::invalid_dataset("dataset has no value columns"));
            }
        }
        if cells.len() != rows.len() {
            return Err(CelldiffError::invalid_dataset(format!(
                "{} row labels but {} rows of values",
                rows.len(),
                cells.len()
            )));
        }
        let width = columns.as_ref().map_or(1, Axis::len);
        if let Some((pos, row)) = cells.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CelldiffError::invalid_dataset(format!(
                "row {} has {} values, expected {}",
                pos,
                row.len(),
                width
            )));
        }
        Ok(Self { rows, columns, cells })
    }

    /// Single-level frame from plain labels
    pub fn frame<R, C>(
        row_labels: impl IntoIterator<Item = R>,
        column_labels: impl IntoIterator<Item = C>,
        cells: Vec<Vec<Value>>,
    ) -> Result<Self>
    where
        R: Into<Label>,
        C: Into<Label>,
    {
        Self::new(Axis::flat(row_labels)?, Some(Axis::flat(column_labels)?), cells)
    }

    /// Series-shaped dataset
    pub fn series<R: Into<Label>>(row_labels: impl IntoIterator<Item = R>, values: Vec<Value>) -> Result<Self> {
        Self::new(Axis::flat(row_labels)?, None, values.into_iter().map(|v| vec![v]).collect())
    }

    /// Same labels, every cell `Missing`
    pub fn all_missing_like(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            cells: vec![vec![Value::Missing; self.width()]; self.rows.len()],
        }
    }

    pub fn rows(&self) -> &Axis {
        &self.rows
    }

    pub fn columns(&self) -> Option<&Axis> {
        self.columns.as_ref()
    }

    pub fn is_series(&self) -> bool {
        self.columns.is_none()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of values per row, `max(1, columns)`
    pub fn width(&self) -> usize {
        self.columns.as_ref().map_or(1, Axis::len)
    }

    /// Number of cells, which is also the long form length
    pub fn cell_count(&self) -> usize {
        self.n_rows() * self.width()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.cells.get(row).and_then(|r| r.get(column))
    }

    pub fn row_values(&self) -> impl Iterator<Item = &[Value]> {
        self.cells.iter().map(Vec::as_slice)
    }
}
