//! File discovery inside the compared directory trees

use crate::error::Result;
use crate::timestamp;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Shell-style filename pattern supporting `*`, `?` and `[...]` classes
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(glob: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(glob))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.regex.is_match(filename)
    }
}

/// Translate a shell glob into an anchored regular expression
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');
    let mut chars = glob.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                // Collect the class body; an unterminated class is a literal '['
                let mut body = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == ']' && !body.is_empty() && body != "!" {
                        closed = true;
                        break;
                    }
                    body.push(next);
                }
                if closed {
                    out.push('[');
                    let mut rest = body.as_str();
                    if let Some(negated) = rest.strip_prefix('!') {
                        out.push('^');
                        rest = negated;
                    }
                    for ch in rest.chars() {
                        if matches!(ch, '\\' | '[' | ']' | '^' | '&' | '~') {
                            out.push('\\');
                        }
                        out.push(ch);
                    }
                    out.push(']');
                } else {
                    out.push_str(&regex::escape("["));
                    out.push_str(&regex::escape(&body));
                }
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out.push('$');
    out
}

/// Names of regular files directly inside `dir` matching `pattern`.
///
/// A directory that does not exist yields an empty set.
pub fn list_matching(dir: &Path, pattern: &FilePattern) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    if !dir.is_dir() {
        return Ok(names);
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if pattern.matches(name) {
                names.insert(name.to_string());
            }
        }
    }

    Ok(names)
}

/// Sorted union of matching names from both trees
pub fn union_matching(new_root: &Path, old_root: &Path, pattern: &FilePattern) -> Result<BTreeSet<String>> {
    let mut names = list_matching(new_root, pattern)?;
    names.extend(list_matching(old_root, pattern)?);
    Ok(names)
}

/// Whether `path` names an existing regular file
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Where a discovered file lives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileListing {
    pub filename: String,
    pub in_new: bool,
    pub in_old: bool,
    pub timestamp: Option<NaiveDateTime>,
}

/// Presence of every matching file on both sides, in name order
pub fn survey(new_root: &Path, old_root: &Path, pattern: &FilePattern) -> Result<Vec<FileListing>> {
    let new_names = list_matching(new_root, pattern)?;
    let old_names = list_matching(old_root, pattern)?;
    Ok(new_names
        .union(&old_names)
        .map(|name| FileListing {
            filename: name.clone(),
            in_new: new_names.contains(name),
            in_old: old_names.contains(name),
            timestamp: timestamp::extract(name),
        })
        .collect())
}
