//! Logger setup for the binary

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Where log lines go: stderr, or appended to `log_file` (parent
/// directories are created)
pub fn log_target(log_file: Option<&Path>) -> Result<env_logger::Target> {
    let Some(path) = log_file else {
        return Ok(env_logger::Target::Stderr);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(env_logger::Target::Pipe(Box::new(file)))
}

/// Install the global logger at `Info`, or `Debug` when verbose
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .target(log_target(log_file)?)
        .init();
    Ok(())
}
