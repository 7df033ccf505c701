//! Cell-level diff of two long-form tables

use crate::label::CanonicalKey;
use crate::normalize::{LongForm, LongFormEntry};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Outcome of comparing one `(row_key, col_key)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    /// Kind seen from the other direction
    pub fn inverted(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            Self::Changed => Self::Changed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cell difference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub row_key: CanonicalKey,
    pub col_key: CanonicalKey,
    pub kind: ChangeKind,
    pub new_value: Value,
    pub old_value: Value,
}

impl DiffRecord {
    pub fn inverted(&self) -> Self {
        Self {
            row_key: self.row_key.clone(),
            col_key: self.col_key.clone(),
            kind: self.kind.inverted(),
            new_value: self.old_value.clone(),
            old_value: self.new_value.clone(),
        }
    }
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl ChangeSummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.changed
    }

    pub fn merge(&mut self, other: &ChangeSummary) {
        self.added += other.added;
        self.removed += other.removed;
        self.changed += other.changed;
    }
}

/// All differences between two datasets.
///
/// Records come in new-side order, followed by old-only cells in old-side
/// order. Unchanged cells are not recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Changeset {
    records: Vec<DiffRecord>,
}

impl Changeset {
    pub fn from_records(records: Vec<DiffRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for record in &self.records {
            match record.kind {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Changed => summary.changed += 1,
            }
        }
        summary
    }

    /// The changeset of the reverse comparison
    pub fn inverted(&self) -> Self {
        Self {
            records: self.records.iter().map(DiffRecord::inverted).collect(),
        }
    }

    /// Records ordered by `(row_key, col_key, kind)`
    pub fn sorted(mut self) -> Self {
        self.records.sort_by(|a, b| {
            (&a.row_key, &a.col_key, a.kind).cmp(&(&b.row_key, &b.col_key, b.kind))
        });
        self
    }
}

impl<'a> IntoIterator for &'a Changeset {
    type Item = &'a DiffRecord;
    type IntoIter = std::slice::Iter<'a, DiffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

type JoinKey<'a> = (&'a str, &'a str);

fn join_key(entry: &LongFormEntry) -> JoinKey<'_> {
    (entry.row_key.as_str(), entry.col_key.as_str())
}

/// Full outer join of `new` and `old` on `(row_key, col_key)`.
///
/// The old side is indexed once, the new side streamed against it, so the
/// cost is linear in `new.len() + old.len()`. A key repeated on one side is
/// paired with the repeats on the other side by order of occurrence.
pub fn diff(new: &LongForm, old: &LongForm) -> Changeset {
    let old_entries = old.entries();

    // heads[key] is the next unmatched old position for key; next_same
    // chains later occurrences of the same key.
    let mut heads: HashMap<JoinKey<'_>, usize> = HashMap::with_capacity(old_entries.len());
    let mut next_same: Vec<Option<usize>> = vec![None; old_entries.len()];
    for (pos, entry) in old_entries.iter().enumerate().rev() {
        next_same[pos] = heads.insert(join_key(entry), pos);
    }

    let mut matched = vec![false; old_entries.len()];
    let mut records = Vec::new();

    for entry in new.entries() {
        let old_pos = match heads.entry(join_key(entry)) {
            Entry::Occupied(mut slot) => {
                let pos = *slot.get();
                match next_same[pos] {
                    Some(next) => {
                        slot.insert(next);
                    }
                    None => {
                        slot.remove();
                    }
                }
                Some(pos)
            }
            Entry::Vacant(_) => None,
        };

        match old_pos {
            Some(pos) => {
                matched[pos] = true;
                if let Some(record) = classify(entry, &old_entries[pos]) {
                    records.push(record);
                }
            }
            None => records.push(DiffRecord {
                row_key: entry.row_key.clone(),
                col_key: entry.col_key.clone(),
                kind: ChangeKind::Added,
                new_value: entry.value.clone(),
                old_value: Value::Missing,
            }),
        }
    }

    for (entry, _) in old_entries.iter().zip(&matched).filter(|(_, m)| !**m) {
        records.push(DiffRecord {
            row_key: entry.row_key.clone(),
            col_key: entry.col_key.clone(),
            kind: ChangeKind::Removed,
            new_value: Value::Missing,
            old_value: entry.value.clone(),
        });
    }

    Changeset { records }
}

/// Compare a pair present on both sides
fn classify(new: &LongFormEntry, old: &LongFormEntry) -> Option<DiffRecord> {
    if new.value == old.value {
        return None;
    }
    let kind = match (new.value.is_missing(), old.value.is_missing()) {
        (false, true) => ChangeKind::Added,
        (true, false) => ChangeKind::Removed,
        _ => ChangeKind::Changed,
    };
    Some(DiffRecord {
        row_key: new.row_key.clone(),
        col_key: new.col_key.clone(),
        kind,
        new_value: new.value.clone(),
        old_value: old.value.clone(),
    })
}
