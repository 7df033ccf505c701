//! Loading delimited text files into datasets

use crate::dataset::{Axis, Dataset};
use crate::error::{CelldiffError, Result};
use crate::label::{Label, LabelElement};
use crate::value::Value;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tokens read as missing values by default
pub const DEFAULT_NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A"];

/// How a delimited file maps onto a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Record holding the (first) header row; `None` means no header
    pub header_row: Option<usize>,
    /// Number of consecutive header rows, more than one gives tuple column labels
    pub header_depth: usize,
    /// Columns forming the row labels; empty gives positional row labels
    pub index_cols: Vec<usize>,
    pub delimiter: char,
    pub na_values: Vec<String>,
    /// Load a file with a single value column as a Series
    pub squeeze: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_row: Some(0),
            header_depth: 1,
            index_cols: vec![0],
            delimiter: ',',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            squeeze: false,
        }
    }
}

impl LoadOptions {
    /// Check option consistency before reading any file
    pub fn validate(&self) -> Result<()> {
        if self.header_depth == 0 {
            return Err(CelldiffError::config("header depth must be at least 1"));
        }
        if !self.delimiter.is_ascii() {
            return Err(CelldiffError::config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        let mut seen = self.index_cols.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.index_cols.len() {
            return Err(CelldiffError::config("index columns must be distinct"));
        }
        Ok(())
    }
}

/// Anything that can turn a path into a dataset
pub trait DatasetLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Dataset>;
}

/// CSV/TSV loader
#[derive(Debug, Clone, Default)]
pub struct CsvLoader {
    options: LoadOptions,
}

impl CsvLoader {
    pub fn new(options: LoadOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// `.tsv` files are tab separated unless another delimiter was asked for
    fn delimiter_for(&self, path: &Path) -> u8 {
        let is_tsv = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        if is_tsv && self.options.delimiter == ',' {
            b'\t'
        } else {
            self.options.delimiter as u8
        }
    }

    /// Parse delimited text from any reader
    pub fn load_reader<R: Read>(&self, reader: R, delimiter: u8) -> Result<Dataset> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let records = csv_reader.records().collect::<std::result::Result<Vec<StringRecord>, _>>()?;
        self.build_dataset(records)
    }

    fn build_dataset(&self, records: Vec<StringRecord>) -> Result<Dataset> {
        let opts = &self.options;
        let (headers, body) = match opts.header_row {
            Some(row) => {
                let end = row + opts.header_depth;
                if records.len() < end {
                    return Err(CelldiffError::invalid_input(format!(
                        "expected {} header row(s) starting at row {}, file has {} rows",
                        opts.header_depth,
                        row,
                        records.len()
                    )));
                }
                (&records[row..end], &records[end..])
            }
            None => (&records[..0], &records[..]),
        };

        let width = match headers.first() {
            Some(header) => header.len(),
            None => body.iter().map(StringRecord::len).max().unwrap_or(0),
        };

        if let Some(&col) = opts.index_cols.iter().find(|&&c| c >= width) {
            return Err(CelldiffError::invalid_input(format!(
                "index column {} out of range, file has {} columns",
                col, width
            )));
        }

        let value_cols: Vec<usize> = (0..width).filter(|c| !opts.index_cols.contains(c)).collect();
        if value_cols.is_empty() {
            return Err(CelldiffError::invalid_input("file has no value columns"));
        }

        let mut row_labels = Vec::with_capacity(body.len());
        let mut cells = Vec::with_capacity(body.len());
        for (line, record) in body.iter().enumerate() {
            if record.len() > width {
                return Err(CelldiffError::invalid_input(format!(
                    "row {} has {} fields, expected {}",
                    line,
                    record.len(),
                    width
                )));
            }
            if !opts.index_cols.is_empty() {
                row_labels.push(self.row_label(record));
            }
            cells.push(
                value_cols
                    .iter()
                    .map(|&c| record.get(c).map_or(Value::Missing, |raw| Value::parse(raw, &opts.na_values)))
                    .collect::<Vec<_>>(),
            );
        }

        let rows = if opts.index_cols.is_empty() {
            Axis::range(body.len())
        } else {
            Axis::new(row_labels, opts.index_cols.len())?
        };

        if opts.squeeze && value_cols.len() == 1 {
            return Dataset::new(rows, None, cells);
        }

        let columns = if headers.is_empty() {
            Axis::flat(value_cols.iter().map(|&c| c as i64))?
        } else {
            let labels = value_cols
                .iter()
                .map(|&c| {
                    let parts: Vec<LabelElement> = headers.iter().map(|h| header_element(h.get(c))).collect();
                    if parts.len() == 1 {
                        Label::Single(parts.into_iter().next().unwrap_or(LabelElement::Missing))
                    } else {
                        Label::Tuple(parts)
                    }
                })
                .collect();
            Axis::new(labels, opts.header_depth)?
        };

        Dataset::new(rows, Some(columns), cells)
    }

    fn row_label(&self, record: &StringRecord) -> Label {
        let parts: Vec<LabelElement> = self
            .options
            .index_cols
            .iter()
            .map(|&c| match record.get(c).map(|raw| Value::parse(raw, &self.options.na_values)) {
                Some(Value::Scalar(s)) => LabelElement::Scalar(s),
                _ => LabelElement::Missing,
            })
            .collect();
        if parts.len() == 1 {
            Label::Single(parts.into_iter().next().unwrap_or(LabelElement::Missing))
        } else {
            Label::Tuple(parts)
        }
    }
}

/// Header cells stay text; blanks become missing
fn header_element(raw: Option<&str>) -> LabelElement {
    match raw {
        Some(s) if !s.trim().is_empty() => LabelElement::text(s),
        _ => LabelElement::Missing,
    }
}

impl DatasetLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<Dataset> {
        if !path.is_file() {
            return Err(CelldiffError::invalid_input(format!(
                "File not found: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        self.load_reader(file, self.delimiter_for(path))
    }
}
