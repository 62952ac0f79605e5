use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::session::word::{WordPair, progress_key};

pub const SCHEMA_VERSION: u32 = 1;

/// Best result for one word set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(alias = "categoryId")]
    pub category_id: String,
    #[serde(alias = "setName")]
    pub set_name: String,
    pub score: u32,
    pub completed: bool,
    #[serde(alias = "lastPlayed", alias = "lastPlayedAt")]
    pub last_played_at: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn key(&self) -> String {
        progress_key(&self.category_id, &self.set_name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    #[serde(default)]
    pub records: BTreeMap<String, ProgressRecord>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            records: BTreeMap::new(),
        }
    }
}

impl ProgressData {
    /// Parse progress, keeping every entry that deserializes and dropping
    /// the rest. Unparseable input yields empty progress.
    ///
    /// Accepts both the wrapped layout (`{"schema_version", "records"}`) and
    /// a bare `key -> record` map.
    pub fn from_json_lenient(content: &str) -> Self {
        let value: Value = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "progress data is not valid JSON; starting fresh");
                return Self::default();
            }
        };

        let entries = match value {
            Value::Object(mut map) => match map.remove("records") {
                Some(Value::Object(records)) => records,
                Some(_) => {
                    warn!("progress records field has the wrong shape; starting fresh");
                    return Self::default();
                }
                None => {
                    map.remove("schema_version");
                    map
                }
            },
            _ => {
                warn!("progress data is not a JSON object; starting fresh");
                return Self::default();
            }
        };

        let mut data = Self::default();
        for (key, entry) in entries {
            match serde_json::from_value::<ProgressRecord>(entry) {
                Ok(record) => {
                    data.records.insert(key, record);
                }
                Err(e) => warn!(key = %key, error = %e, "dropping corrupt progress record"),
            }
        }
        data
    }
}

/// A user-authored word list as stored in the custom sets file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomSetData {
    #[serde(alias = "setName")]
    pub set_name: String,
    pub words: Vec<WordPair>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomSetsData {
    pub schema_version: u32,
    #[serde(default)]
    pub sets: BTreeMap<String, CustomSetData>,
}

impl Default for CustomSetsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sets: BTreeMap::new(),
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub wordfall_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub progress: ProgressData,
    pub custom_sets: CustomSetsData,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "schema_version": 1,
        "records": {
            "TOEIC_Set 1": {
                "category_id": "TOEIC",
                "set_name": "Set 1",
                "score": 40,
                "completed": true,
                "last_played_at": "2026-03-01T10:00:00Z"
            }
        }
    }"#;

    #[test]
    fn test_lenient_parse_valid() {
        let data = ProgressData::from_json_lenient(VALID);
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records["TOEIC_Set 1"].score, 40);
    }

    #[test]
    fn test_lenient_parse_garbage_is_empty() {
        assert!(ProgressData::from_json_lenient("{not json").records.is_empty());
        assert!(ProgressData::from_json_lenient("[1, 2, 3]").records.is_empty());
        assert!(ProgressData::from_json_lenient("").records.is_empty());
    }

    #[test]
    fn test_lenient_parse_drops_only_bad_entries() {
        let content = r#"{
            "records": {
                "TOEIC_Set 1": {"category_id": "TOEIC", "set_name": "Set 1", "score": 30,
                                "completed": true, "last_played_at": "2026-03-01T10:00:00Z"},
                "TOEIC_Set 2": {"category_id": "TOEIC", "score": "lots"}
            }
        }"#;
        let data = ProgressData::from_json_lenient(content);
        assert_eq!(data.records.len(), 1);
        assert!(data.records.contains_key("TOEIC_Set 1"));
    }

    #[test]
    fn test_lenient_parse_bare_map_with_camel_case_fields() {
        let content = r#"{
            "IELTS_Nature": {"categoryId": "IELTS", "setName": "Nature", "score": 20,
                             "completed": true, "lastPlayed": "2025-12-24T08:30:00.000Z"}
        }"#;
        let data = ProgressData::from_json_lenient(content);
        let record = &data.records["IELTS_Nature"];
        assert_eq!(record.category_id, "IELTS");
        assert_eq!(record.key(), "IELTS_Nature");
    }
}
