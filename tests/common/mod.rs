//! Common test utilities and helpers

use celldiff::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager with a "new" and an "old" directory tree
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub new_dir: PathBuf,
    pub old_dir: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with empty new/ and old/ directories
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let new_dir = temp_dir.path().join("new");
        let old_dir = temp_dir.path().join("old");
        fs::create_dir_all(&new_dir)?;
        fs::create_dir_all(&old_dir)?;

        Ok(Self {
            temp_dir,
            new_dir,
            old_dir,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn new_path(&self) -> &str {
        self.new_dir.to_str().expect("temp path is UTF-8")
    }

    pub fn old_path(&self) -> &str {
        self.old_dir.to_str().expect("temp path is UTF-8")
    }

    /// Create a CSV file in the new tree
    pub fn create_new_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        write_rows(&self.new_dir.join(name), data)
    }

    /// Create a CSV file in the old tree
    pub fn create_old_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        write_rows(&self.old_dir.join(name), data)
    }

    /// Create a file with raw content relative to the fixture root
    pub fn create_raw(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a CSV with `rows` labeled rows and `cols` value columns in both trees,
    /// with `changed` cells of the new tree altered
    pub fn create_large_pair(&self, name: &str, rows: usize, cols: usize, changed: usize) -> Result<()> {
        let mut old = String::from("id");
        for c in 0..cols {
            old.push_str(&format!(",col_{}", c));
        }
        old.push('\n');
        let mut new = old.clone();

        let mut remaining = changed;
        for r in 0..rows {
            old.push_str(&format!("row_{}", r));
            new.push_str(&format!("row_{}", r));
            for c in 0..cols {
                old.push_str(&format!(",{}", r * cols + c));
                if remaining > 0 && c == 0 {
                    new.push_str(&format!(",{}", r * cols + c + 1));
                    remaining -= 1;
                } else {
                    new.push_str(&format!(",{}", r * cols + c));
                }
            }
            old.push('\n');
            new.push('\n');
        }

        fs::write(self.old_dir.join(name), old)?;
        fs::write(self.new_dir.join(name), new)?;
        Ok(())
    }

    /// Create a corrupted file for testing error handling
    pub fn create_corrupted_file(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        fs::write(&path, b"id,v\n1,\"unterminated\xff\xfe\n2,3,4,5\n")?;
        Ok(path)
    }
}

fn write_rows(path: &Path, data: &[Vec<&str>]) -> Result<PathBuf> {
    let mut content = String::new();
    for row in data {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a celldiff command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use celldiff::cli::Cli;
        use celldiff::commands::execute_command;
        use clap::Parser;

        let mut cmd_args = vec!["celldiff"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args).map_err(|e| celldiff::CelldiffError::invalid_input(e.to_string()))?;

        execute_command(cli.command)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> celldiff::CelldiffError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample data generators for testing
pub mod sample_data {
    pub fn simple_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.50"],
            vec!["2", "Banana", "0.75"],
            vec!["3", "Cherry", "2.00"],
        ]
    }

    pub fn updated_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price"],
            vec!["1", "Apple", "1.60"], // Price changed
            vec!["2", "Banana", "0.75"],
            vec!["4", "Date", "3.00"], // New row, Cherry removed
        ]
    }

    pub fn schema_changed_csv_data() -> Vec<Vec<&'static str>> {
        vec![
            vec!["id", "name", "price", "category"], // New column
            vec!["1", "Apple", "1.50", "Fruit"],
            vec!["2", "Banana", "0.75", "Fruit"],
            vec!["3", "Cherry", "2.00", "Fruit"],
        ]
    }

    pub fn multi_level_csv() -> &'static str {
        "region,year,sales,sales,costs\n,,q1,q2,q1\nnorth,2020,10,11,5\nnorth,2021,12,13,6\nsouth,2020,7,8,3\n"
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use celldiff::{ChangeKind, Changeset, Result};
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Assert that a JSON file contains expected keys
    pub fn assert_json_contains_keys(path: &Path, keys: &[&str]) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;

        for key in keys {
            assert!(json.get(key).is_some(), "JSON should contain key '{}': {}", key, path.display());
        }

        Ok(())
    }

    /// Assert the number of records per kind
    pub fn assert_counts(changes: &Changeset, added: usize, removed: usize, changed: usize) {
        assert_eq!(changes.count(ChangeKind::Added), added, "added records");
        assert_eq!(changes.count(ChangeKind::Removed), removed, "removed records");
        assert_eq!(changes.count(ChangeKind::Changed), changed, "changed records");
    }
}
