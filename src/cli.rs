//! Command-line interface for celldiff

use crate::config::{CompareConfig, MissingBothPolicy, OutputFormat};
use crate::error::{CelldiffError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "celldiff")]
#[command(about = "Cell-level diff of tabular files across two directory trees")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diff every matching file between two directories
    Compare {
        /// Directory holding the new version of the files
        new_dir: PathBuf,

        /// Directory holding the old version of the files
        old_dir: PathBuf,

        /// Shell glob selecting files to compare (default "*.csv")
        #[arg(long)]
        pattern: Option<String>,

        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        report: ReportArgs,

        /// Worker threads for comparing files (must be > 0)
        #[arg(long, value_parser = validate_jobs)]
        jobs: Option<usize>,

        /// JSON config file with defaults for these options
        #[arg(long)]
        config: Option<PathBuf>,

        /// Quiet output (machine-readable summary)
        #[arg(long)]
        quiet: bool,
    },

    /// Diff a single file between two directories
    File {
        /// File name, looked up in both directories
        filename: String,

        /// Directory holding the new version of the file
        new_dir: PathBuf,

        /// Directory holding the old version of the file
        old_dir: PathBuf,

        #[command(flatten)]
        load: LoadArgs,

        #[command(flatten)]
        report: ReportArgs,

        /// JSON config file with defaults for these options
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List matching files and which directory holds them
    List {
        new_dir: PathBuf,

        old_dir: PathBuf,

        /// Shell glob selecting files (default "*.csv")
        #[arg(long)]
        pattern: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// How files are parsed
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Row holding the header (0-based)
    #[arg(long, conflicts_with = "no_header")]
    pub header_row: Option<usize>,

    /// Files have no header row; columns are labeled by position
    #[arg(long)]
    pub no_header: bool,

    /// Number of header rows; more than one gives multi-level column labels
    #[arg(long, value_parser = validate_positive)]
    pub header_depth: Option<usize>,

    /// Column holding row labels (0-based, repeatable for multi-level labels)
    #[arg(long = "index-col", conflicts_with = "no_index")]
    pub index_cols: Vec<usize>,

    /// Rows are labeled by position
    #[arg(long)]
    pub no_index: bool,

    /// Field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Treat files with a single value column as a series
    #[arg(long)]
    pub squeeze: bool,
}

/// Where and how results are written
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Fail when a file is absent from both directories
    #[arg(long)]
    pub strict: bool,

    /// Output format: "pretty", "json", "csv"
    #[arg(long)]
    pub format: Option<String>,

    /// Write results to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl LoadArgs {
    /// Apply the flags that were given on top of `config`
    pub fn apply(&self, config: &mut CompareConfig) {
        let load = &mut config.load;
        if self.no_header {
            load.header_row = None;
        } else if let Some(row) = self.header_row {
            load.header_row = Some(row);
        }
        if let Some(depth) = self.header_depth {
            load.header_depth = depth;
        }
        if self.no_index {
            load.index_cols.clear();
        } else if !self.index_cols.is_empty() {
            load.index_cols = self.index_cols.clone();
        }
        if let Some(delimiter) = self.delimiter {
            load.delimiter = delimiter;
        }
        if self.squeeze {
            load.squeeze = true;
        }
    }
}

impl ReportArgs {
    pub fn apply(&self, config: &mut CompareConfig) -> Result<()> {
        if self.strict {
            config.missing_both = MissingBothPolicy::Error;
        }
        if let Some(format) = &self.format {
            config.format = OutputFormat::parse(format).map_err(CelldiffError::invalid_input)?;
        }
        Ok(())
    }
}

/// Validate that the job count is greater than 0
fn validate_jobs(s: &str) -> std::result::Result<usize, String> {
    let jobs: usize = s
        .parse()
        .map_err(|_| format!("Invalid job count: '{}'. Must be a positive integer.", s))?;

    if jobs == 0 {
        return Err("Job count must be greater than 0".to_string());
    }

    Ok(jobs)
}

fn validate_positive(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid value: '{}'. Must be a positive integer.", s)),
    }
}
