use serde::{Deserialize, Serialize};

/// One translation pair. `native` is what falls; `target` is what the
/// learner must type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    #[serde(alias = "vi", alias = "nativeTerm")]
    pub native: String,
    #[serde(alias = "en", alias = "targetTerm")]
    pub target: String,
}

impl WordPair {
    pub fn new(native: &str, target: &str) -> Self {
        Self {
            native: native.to_string(),
            target: target.to_string(),
        }
    }
}

/// Identifies a word set within a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SetRef {
    pub category_id: String,
    pub set_name: String,
}

impl SetRef {
    pub fn new(category_id: &str, set_name: &str) -> Self {
        Self {
            category_id: category_id.to_string(),
            set_name: set_name.to_string(),
        }
    }

    pub fn progress_key(&self) -> String {
        progress_key(&self.category_id, &self.set_name)
    }
}

pub fn progress_key(category_id: &str, set_name: &str) -> String {
    format!("{category_id}_{set_name}")
}
