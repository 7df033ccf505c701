//! Hashing utilities for celldiff operations

use crate::error::Result;
use blake3::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A hash value represented as a hex string
pub type HashValue = String;

/// BLAKE3 hex digest of a byte slice
pub fn fingerprint(bytes: &[u8]) -> HashValue {
    blake3::hash(bytes).to_hex().to_string()
}

/// Hash computer for file contents
pub struct ContentHasher {
    buffer_size: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

impl ContentHasher {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Stream a file through BLAKE3
    pub fn hash_file(&self, path: &Path) -> Result<HashValue> {
        let mut file = File::open(path)?;
        let mut hasher = Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Whether two files have byte-identical content
    pub fn same_content(&self, a: &Path, b: &Path) -> Result<bool> {
        if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
            return Ok(false);
        }
        Ok(self.hash_file(a)? == self.hash_file(b)?)
    }
}
