//! Timestamps carried in file names

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d_%H-%M-%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse the file stem as a timestamp; dates map to midnight
pub fn extract(filename: &str) -> Option<NaiveDateTime> {
    let stem = Path::new(filename).file_stem()?.to_str()?;

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stem, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(stem, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
