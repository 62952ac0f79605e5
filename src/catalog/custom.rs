use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::catalog::CatalogError;
use crate::session::word::WordPair;
use crate::store::schema::{CustomSetData, CustomSetsData};

/// Category id that designates a user-authored set.
pub const CUSTOM_CATEGORY: &str = "custom";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomSetReference {
    pub set_name: String,
    pub words: Vec<WordPair>,
}

impl From<&CustomSetData> for CustomSetReference {
    fn from(data: &CustomSetData) -> Self {
        Self {
            set_name: data.set_name.clone(),
            words: usable_words(&data.words),
        }
    }
}

/// The one custom set staged for the current run of the app. Lives in
/// memory only, like a browser session.
#[derive(Clone, Debug, Default)]
pub struct CustomSetSlot {
    current: Option<CustomSetReference>,
}

impl CustomSetSlot {
    pub fn stage(&mut self, reference: CustomSetReference) {
        self.current = Some(reference);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&CustomSetReference> {
        self.current.as_ref()
    }

    /// Words of the staged set if its name matches exactly, else empty.
    pub fn words_for(&self, set_name: &str) -> Vec<WordPair> {
        match &self.current {
            Some(r) if r.set_name == set_name => r.words.clone(),
            _ => Vec::new(),
        }
    }
}

/// Read-only view of the user's saved custom sets, in name order.
#[derive(Clone, Debug, Default)]
pub struct CustomSetLibrary {
    sets: Vec<CustomSetData>,
}

impl CustomSetLibrary {
    pub fn new(data: CustomSetsData) -> Self {
        Self {
            sets: data.sets.into_values().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn sets(&self) -> &[CustomSetData] {
        &self.sets
    }

    pub fn get(&self, set_name: &str) -> Option<CustomSetReference> {
        self.sets
            .iter()
            .find(|s| s.set_name == set_name)
            .map(CustomSetReference::from)
    }

    /// Add a set loaded from elsewhere, replacing one with the same name.
    pub fn insert(&mut self, reference: &CustomSetReference) {
        self.sets.retain(|s| s.set_name != reference.set_name);
        self.sets.push(CustomSetData {
            set_name: reference.set_name.clone(),
            words: reference.words.clone(),
            created_at: None,
        });
        self.sets.sort_by(|a, b| a.set_name.cmp(&b.set_name));
    }
}

/// Parse the custom sets file. Accepts the wrapped layout as well as a bare
/// `name -> set` map; entries that fail to parse are skipped.
pub fn parse_custom_sets(content: &str) -> CustomSetsData {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "custom sets file is not valid JSON");
            return CustomSetsData::default();
        }
    };
    let Value::Object(mut map) = value else {
        warn!("custom sets file is not a JSON object");
        return CustomSetsData::default();
    };
    let entries = match map.remove("sets") {
        Some(Value::Object(sets)) => sets,
        _ => {
            map.remove("schema_version");
            map
        }
    };

    let mut sets = BTreeMap::new();
    for (name, entry) in entries {
        match serde_json::from_value::<CustomSetData>(entry) {
            Ok(set) => {
                sets.insert(name, set);
            }
            Err(e) => warn!(set = %name, error = %e, "skipping malformed custom set"),
        }
    }
    CustomSetsData {
        sets,
        ..CustomSetsData::default()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CustomSetFile {
    Named(CustomSetData),
    Bare(Vec<WordPair>),
}

/// Load a single set from a JSON file: either `{"set_name", "words"}` or a
/// bare array of pairs, in which case the file stem names the set.
pub fn load_custom_file(path: &Path) -> Result<CustomSetReference, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: CustomSetFile =
        serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let reference = match parsed {
        CustomSetFile::Named(data) => CustomSetReference::from(&data),
        CustomSetFile::Bare(words) => CustomSetReference {
            set_name: path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Custom".to_string()),
            words: usable_words(&words),
        },
    };

    if reference.words.is_empty() {
        return Err(CatalogError::Empty(reference.set_name));
    }
    Ok(reference)
}

/// Pairs with both sides non-blank, trimmed.
fn usable_words(words: &[WordPair]) -> Vec<WordPair> {
    words
        .iter()
        .filter(|w| !w.native.trim().is_empty() && !w.target.trim().is_empty())
        .map(|w| WordPair::new(w.native.trim(), w.target.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> CustomSetReference {
        CustomSetReference {
            set_name: name.to_string(),
            words: vec![WordPair::new("Xe hơi", "car"), WordPair::new("Nhà", "house")],
        }
    }

    #[test]
    fn test_slot_matches_exact_name_only() {
        let mut slot = CustomSetSlot::default();
        assert!(slot.words_for("Travel").is_empty());
        slot.stage(reference("Travel"));
        assert_eq!(slot.words_for("Travel").len(), 2);
        assert!(slot.words_for("Travel ").is_empty());
        assert!(slot.words_for("travel").is_empty());
        slot.clear();
        assert!(slot.words_for("Travel").is_empty());
    }

    #[test]
    fn test_staging_replaces_previous_set() {
        let mut slot = CustomSetSlot::default();
        slot.stage(reference("A"));
        slot.stage(reference("B"));
        assert!(slot.words_for("A").is_empty());
        assert_eq!(slot.current().unwrap().set_name, "B");
    }

    #[test]
    fn test_parse_camel_case_layout() {
        let content = r#"{
            "Bộ từ của tôi": {
                "setName": "Bộ từ của tôi",
                "words": [{"vi": "Mèo", "en": "cat", "id": 1}],
                "createdAt": "2026-02-01T09:00:00.000Z",
                "wordCount": 1
            },
            "Broken": {"words": 5}
        }"#;
        let data = parse_custom_sets(content);
        assert_eq!(data.sets.len(), 1);
        let library = CustomSetLibrary::new(data);
        let set = library.get("Bộ từ của tôi").unwrap();
        assert_eq!(set.words, vec![WordPair::new("Mèo", "cat")]);
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_custom_sets("nope").sets.is_empty());
        assert!(parse_custom_sets("[]").sets.is_empty());
    }

    #[test]
    fn test_blank_pairs_are_dropped() {
        let data = CustomSetData {
            set_name: "x".to_string(),
            words: vec![WordPair::new("  ", "car"), WordPair::new(" Nhà ", " house ")],
            created_at: None,
        };
        let r = CustomSetReference::from(&data);
        assert_eq!(r.words, vec![WordPair::new("Nhà", "house")]);
    }

    #[test]
    fn test_load_custom_file_named_and_bare() {
        let dir = tempfile::tempdir().unwrap();
        let named = dir.path().join("named.json");
        fs::write(&named, r#"{"set_name": "Food", "words": [{"native": "Cơm", "target": "rice"}]}"#)
            .unwrap();
        assert_eq!(load_custom_file(&named).unwrap().set_name, "Food");

        let bare = dir.path().join("animals.json");
        fs::write(&bare, r#"[{"vi": "Chó", "en": "dog"}]"#).unwrap();
        let r = load_custom_file(&bare).unwrap();
        assert_eq!(r.set_name, "animals");
        assert_eq!(r.words.len(), 1);
    }

    #[test]
    fn test_load_custom_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(load_custom_file(&missing), Err(CatalogError::Io { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{{").unwrap();
        assert!(matches!(load_custom_file(&bad), Err(CatalogError::Parse { .. })));

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        assert!(matches!(load_custom_file(&empty), Err(CatalogError::Empty(_))));
    }

    #[test]
    fn test_library_insert_replaces_by_name() {
        let mut library = CustomSetLibrary::default();
        library.insert(&reference("Travel"));
        library.insert(&reference("Travel"));
        library.insert(&reference("Animals"));
        assert_eq!(library.len(), 2);
        assert_eq!(library.sets()[0].set_name, "Animals");
    }
}
