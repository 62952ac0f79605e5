use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::custom::parse_custom_sets;
use crate::config::Config;
use crate::store::progress::{ProgressStore, merge};
use crate::store::schema::{
    CustomSetsData, EXPORT_VERSION, ExportData, ProgressData, ProgressRecord,
};

const PROGRESS_FILE: &str = "progress.json";
const CUSTOM_SETS_FILE: &str = "custom_sets.json";
const DATA_FILES: [&str; 2] = [PROGRESS_FILE, CUSTOM_SETS_FILE];

/// Progress is read from disk once when the store is opened and served from
/// memory afterwards. Writes go through to disk.
pub struct JsonStore {
    base_dir: PathBuf,
    progress: ProgressData,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordfall");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let mut store = Self {
            base_dir,
            progress: ProgressData::default(),
        };
        store.progress = store.read_progress();
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn read(&self, name: &str) -> Option<String> {
        let path = self.file_path(name);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable data file");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Missing or corrupt progress loads as empty.
    fn read_progress(&self) -> ProgressData {
        self.read(PROGRESS_FILE)
            .map(|content| ProgressData::from_json_lenient(&content))
            .unwrap_or_default()
    }

    pub fn load_progress(&self) -> &ProgressData {
        &self.progress
    }

    pub fn save_progress(&mut self, data: &ProgressData) -> Result<()> {
        self.save(PROGRESS_FILE, data)?;
        self.progress = data.clone();
        Ok(())
    }

    pub fn load_custom_sets(&self) -> CustomSetsData {
        self.read(CUSTOM_SETS_FILE)
            .map(|content| parse_custom_sets(&content))
            .unwrap_or_default()
    }

    /// Custom sets from an explicit file instead of the data directory.
    pub fn load_custom_sets_from(path: &Path) -> CustomSetsData {
        match fs::read_to_string(path) {
            Ok(content) => parse_custom_sets(&content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "custom sets file unreadable");
                CustomSetsData::default()
            }
        }
    }

    pub fn save_custom_sets(&self, data: &CustomSetsData) -> Result<()> {
        self.save(CUSTOM_SETS_FILE, data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            wordfall_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            progress: self.progress.clone(),
            custom_sets: self.load_custom_sets(),
        }
    }

    /// Replace all data files from an export. Every file is staged as
    /// `.tmp` first; originals are moved to `.bak` during commit and put
    /// back if any rename fails.
    pub fn import_all(&mut self, data: &ExportData) -> Result<()> {
        if data.wordfall_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.wordfall_export_version,
                EXPORT_VERSION
            );
        }

        let payloads = [
            serde_json::to_string_pretty(&data.progress)?,
            serde_json::to_string_pretty(&data.custom_sets)?,
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in DATA_FILES.iter().zip(&payloads) {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            let written = fs::File::create(&tmp_path).and_then(|mut file| {
                file.write_all(json.as_bytes())?;
                file.sync_all()
            });
            if let Err(e) = written {
                remove_all(&staged);
                let _ = fs::remove_file(&tmp_path);
                bail!("Import failed during staging: {e}");
            }
            staged.push(tmp_path);
        }

        let mut committed: Vec<Commit> = Vec::new();
        for (i, name) in DATA_FILES.iter().enumerate() {
            let commit = Commit {
                final_path: self.file_path(name),
                bak_path: self.file_path(name).with_extension("json.bak"),
                had_original: self.file_path(name).exists(),
            };

            if commit.had_original {
                if let Err(e) = fs::rename(&commit.final_path, &commit.bak_path) {
                    rollback(&committed);
                    remove_all(&staged);
                    bail!("Import failed during commit (backup): {e}");
                }
            }

            if let Err(e) = fs::rename(&staged[i], &commit.final_path) {
                commit.undo();
                rollback(&committed);
                remove_all(&staged[i..]);
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push(commit);
        }

        for commit in &committed {
            if commit.had_original {
                let _ = fs::remove_file(&commit.bak_path);
            }
        }
        self.progress = data.progress.clone();
        info!(dir = %self.base_dir.display(), "import complete");
        Ok(())
    }

    /// Remove `.bak` files left behind by an interrupted import. Returns true
    /// if any were found.
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in DATA_FILES {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

struct Commit {
    final_path: PathBuf,
    bak_path: PathBuf,
    had_original: bool,
}

impl Commit {
    fn undo(&self) {
        if self.had_original {
            let _ = fs::rename(&self.bak_path, &self.final_path);
        } else {
            let _ = fs::remove_file(&self.final_path);
        }
    }
}

fn rollback(committed: &[Commit]) {
    for commit in committed.iter().rev() {
        commit.undo();
    }
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

impl ProgressStore for JsonStore {
    fn load(&self, key: &str) -> Option<ProgressRecord> {
        self.progress.records.get(key).cloned()
    }

    /// The cache only changes once the file write succeeds.
    fn upsert(&mut self, candidate: ProgressRecord) -> Result<ProgressRecord> {
        let key = candidate.key();
        let merged = merge(self.progress.records.get(&key), candidate);
        let mut data = self.progress.clone();
        data.records.insert(key, merged.clone());
        self.save_progress(&data)?;
        Ok(merged)
    }

    fn records(&self) -> Vec<ProgressRecord> {
        self.progress.records.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::word::WordPair;
    use crate::store::schema::CustomSetData;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn record(score: u32) -> ProgressRecord {
        ProgressRecord {
            category_id: "TOEIC".to_string(),
            set_name: "Office".to_string(),
            score,
            completed: true,
            last_played_at: Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap(),
        }
    }

    fn make_test_export(config: &Config) -> ExportData {
        let mut progress = ProgressData::default();
        progress.records.insert(record(30).key(), record(30));
        let mut custom_sets = CustomSetsData::default();
        custom_sets.sets.insert(
            "Kitchen".to_string(),
            CustomSetData {
                set_name: "Kitchen".to_string(),
                words: vec![WordPair::new("Bếp", "stove")],
                created_at: None,
            },
        );
        ExportData {
            wordfall_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            progress,
            custom_sets,
        }
    }

    #[test]
    fn test_upsert_persists_to_disk() {
        let (dir, mut store) = make_test_store();
        store.upsert(record(40)).unwrap();

        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load("TOEIC_Office").unwrap().score, 40);
    }

    #[test]
    fn test_upsert_keeps_best_score_on_disk() {
        let (_dir, mut store) = make_test_store();
        store.upsert(record(40)).unwrap();
        let stored = store.upsert(record(10)).unwrap();
        assert_eq!(stored.score, 40);
        assert_eq!(store.load("TOEIC_Office").unwrap().score, 40);
    }

    #[test]
    fn test_corrupt_progress_file_is_treated_as_empty() {
        let (dir, _) = make_test_store();
        fs::write(dir.path().join(PROGRESS_FILE), "{\"records\": oops").unwrap();
        let mut store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load("TOEIC_Office").is_none());
        assert!(store.records().is_empty());

        // Writing over the corrupt file recovers it.
        store.upsert(record(20)).unwrap();
        assert_eq!(store.load("TOEIC_Office").unwrap().score, 20);
        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load("TOEIC_Office").unwrap().score, 20);
    }

    #[test]
    fn test_reads_are_served_from_memory() {
        let (dir, mut store) = make_test_store();
        store.upsert(record(40)).unwrap();

        fs::remove_file(dir.path().join(PROGRESS_FILE)).unwrap();
        assert_eq!(store.load("TOEIC_Office").unwrap().score, 40);
        assert_eq!(store.records().len(), 1);

        // The next write restores the file from memory.
        store.upsert(record(10)).unwrap();
        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load("TOEIC_Office").unwrap().score, 40);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let (dir, mut store) = make_test_store();
        store.upsert(record(40)).unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(dir.path().join("progress.tmp")).unwrap();
        assert!(store.upsert(record(90)).is_err());
        assert_eq!(store.load("TOEIC_Office").unwrap().score, 40);
    }

    #[test]
    fn test_missing_files_load_defaults() {
        let (_dir, store) = make_test_store();
        assert!(store.load_progress().records.is_empty());
        assert!(store.load_custom_sets().sets.is_empty());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (dir, mut store) = make_test_store();
        store.save_progress(&ProgressData::default()).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty());
    }

    #[test]
    fn test_round_trip_export_import() {
        let (_dir, store) = make_test_store();
        let config = Config::default();
        let export = make_test_export(&config);

        let (_dir2, mut store2) = make_test_store();
        store2.import_all(&export).unwrap();
        let re_export = store2.export_all(&config);
        assert_eq!(re_export.progress, export.progress);
        assert_eq!(re_export.custom_sets, export.custom_sets);

        // Source store untouched.
        assert!(store.load_progress().records.is_empty());
    }

    #[test]
    fn test_version_rejection() {
        let (_dir, mut store) = make_test_store();
        let mut export = make_test_export(&Config::default());
        export.wordfall_export_version = 99;

        let err = store.import_all(&export).unwrap_err().to_string();
        assert!(err.contains("Unsupported export version"));
        assert!(err.contains("99"));
    }

    #[test]
    fn test_import_staging_failure_preserves_originals() {
        let (dir, mut store) = make_test_store();
        store.save_progress(&make_test_export(&Config::default()).progress).unwrap();
        let original = fs::read_to_string(store.file_path(PROGRESS_FILE)).unwrap();

        let bad_dir = dir.path().join("nonexistent_subdir");
        let mut bad_store = JsonStore {
            base_dir: bad_dir.clone(),
            progress: ProgressData::default(),
        };
        let result = bad_store.import_all(&make_test_export(&Config::default()));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Import failed during staging")
        );
        assert!(!bad_dir.exists());
        assert_eq!(original, fs::read_to_string(store.file_path(PROGRESS_FILE)).unwrap());
    }

    #[test]
    fn test_import_replaces_existing_files() {
        let (_dir, mut store) = make_test_store();
        store.upsert(record(90)).unwrap();

        let export = make_test_export(&Config::default());
        store.import_all(&export).unwrap();

        assert_eq!(store.load("TOEIC_Office").unwrap().score, 30);
        let reopened = JsonStore::with_base_dir(store.base_dir().to_path_buf()).unwrap();
        assert_eq!(reopened.load("TOEIC_Office").unwrap().score, 30);
        assert!(store.load_custom_sets().sets.contains_key("Kitchen"));
        assert!(!store.check_interrupted_import(), "no .bak files after success");
    }

    #[test]
    fn test_check_interrupted_import_detects_bak_files() {
        let (_dir, store) = make_test_store();
        assert!(!store.check_interrupted_import());

        fs::write(store.file_path("progress.json.bak"), "{}").unwrap();
        assert!(store.check_interrupted_import());
        assert!(!store.file_path("progress.json.bak").exists());
    }
}
