use std::collections::BTreeMap;

use anyhow::Result;

use crate::store::schema::{ProgressData, ProgressRecord};

/// Persisted best score and completion per word set.
pub trait ProgressStore {
    /// Absent and unreadable records both come back as `None`.
    fn load(&self, key: &str) -> Option<ProgressRecord>;

    /// Merge `candidate` into the stored record and return what was stored.
    fn upsert(&mut self, candidate: ProgressRecord) -> Result<ProgressRecord>;

    fn records(&self) -> Vec<ProgressRecord>;
}

/// Best score is kept, completion is sticky, the timestamp always moves to
/// the candidate's.
pub fn merge(existing: Option<&ProgressRecord>, candidate: ProgressRecord) -> ProgressRecord {
    match existing {
        Some(prev) => ProgressRecord {
            score: prev.score.max(candidate.score),
            completed: prev.completed || candidate.completed,
            ..candidate
        },
        None => candidate,
    }
}

#[derive(Default)]
pub struct MemoryProgressStore {
    data: ProgressData,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: ProgressData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ProgressData {
        &self.data
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, key: &str) -> Option<ProgressRecord> {
        self.data.records.get(key).cloned()
    }

    fn upsert(&mut self, candidate: ProgressRecord) -> Result<ProgressRecord> {
        let key = candidate.key();
        let merged = merge(self.data.records.get(&key), candidate);
        self.data.records.insert(key, merged.clone());
        Ok(merged)
    }

    fn records(&self) -> Vec<ProgressRecord> {
        self.data.records.values().cloned().collect()
    }
}

/// Completion overview for one category's set list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryProgress {
    pub completed: usize,
    pub total: usize,
    pub best_scores: BTreeMap<String, u32>,
    pub completed_sets: Vec<String>,
}

impl CategoryProgress {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    pub fn is_completed(&self, set_name: &str) -> bool {
        self.completed_sets.iter().any(|s| s == set_name)
    }

    pub fn best_score(&self, set_name: &str) -> u32 {
        self.best_scores.get(set_name).copied().unwrap_or(0)
    }
}

/// A set counts when a record exists for exactly this category and set
/// name, and that record is marked completed.
pub fn category_progress(
    store: &dyn ProgressStore,
    category_id: &str,
    set_names: &[&str],
) -> CategoryProgress {
    let mut progress = CategoryProgress {
        total: set_names.len(),
        ..CategoryProgress::default()
    };

    for record in store.records() {
        if record.category_id != category_id || !set_names.contains(&record.set_name.as_str()) {
            continue;
        }
        if record.score > 0 {
            progress
                .best_scores
                .insert(record.set_name.clone(), record.score);
        }
        if record.completed && !progress.is_completed(&record.set_name) {
            progress.completed_sets.push(record.set_name.clone());
            progress.completed += 1;
        }
    }

    progress
}
