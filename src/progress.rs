//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter for directory comparisons
#[derive(Debug)]
pub struct ProgressReporter {
    pub discovery_pb: Option<ProgressBar>,
    pub files_pb: Option<ProgressBar>,
    show_progress: bool,
}

impl ProgressReporter {
    /// Create progress reporter for a directory comparison
    pub fn new_for_compare() -> Self {
        Self {
            discovery_pb: Some(create_spinner("Discovering files...")),
            files_pb: None,
            show_progress: true,
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self {
            discovery_pb: None,
            files_pb: None,
            show_progress: false,
        }
    }

    /// Finish discovery and start the per-file bar
    pub fn start_files(&mut self, total: u64) {
        if let Some(pb) = self.discovery_pb.take() {
            pb.finish_and_clear();
        }
        if self.show_progress && self.files_pb.is_none() {
            self.files_pb = Some(create_progress_bar(total, "Comparing files"));
        }
    }

    /// Advance by one compared file out of `total`
    pub fn file_done(&self, filename: &str, total: u64) {
        if let Some(pb) = &self.files_pb {
            if pb.length() != Some(total) {
                pb.set_length(total);
            }
            pb.set_message(filename.to_string());
            pb.inc(1);
        }
    }

    /// Finish all progress bars
    pub fn finish(&mut self, message: &str) {
        if let Some(pb) = self.discovery_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.files_pb.take() {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        // Ensure all progress bars are cleaned up silently
        if let Some(pb) = self.discovery_pb.take() {
            pb.finish_and_clear();
        }
        if let Some(pb) = self.files_pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len:5} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}
