//! Error types for celldiff operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CelldiffError>;

#[derive(Error, Debug)]
pub enum CelldiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to load '{filename}': {source}")]
    Load {
        filename: String,
        #[source]
        source: Box<CelldiffError>,
    },

    #[error("{filename} not exists in both dir")]
    MissingBoth { filename: String },

    #[error("Long form has {actual} entries, expected {expected}")]
    ShapeInvariant { expected: usize, actual: usize },

    #[error("Invalid dataset: {message}")]
    InvalidDataset { message: String },

    #[error("Cannot decode key '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl CelldiffError {
    /// Tag a loader failure with the file it came from
    pub fn load(filename: impl Into<String>, source: CelldiffError) -> Self {
        Self::Load {
            filename: filename.into(),
            source: Box::new(source),
        }
    }

    pub fn missing_both(filename: impl Into<String>) -> Self {
        Self::MissingBoth {
            filename: filename.into(),
        }
    }

    pub fn invalid_dataset(msg: impl Into<String>) -> Self {
        Self::InvalidDataset {
            message: msg.into(),
        }
    }

    pub fn decode(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether this error is an internal defect rather than a bad input
    pub fn is_internal_defect(&self) -> bool {
        matches!(self, Self::ShapeInvariant { .. })
    }
}
