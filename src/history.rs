//! Persistent translation history.
//!
//! Records are kept newest first. Every mutation rewrites the whole JSON file;
//! write failures are logged and never undo the in-memory change.

use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TolmachError};
use crate::extract::SourceKind;
use crate::translate::TranslationResult;

/// File name shown for text typed in by hand
pub const MANUAL_ENTRY_LABEL: &str = "Manual text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub id: u64,
    pub file_name: String,
    pub source_text: String,
    pub translations: TranslationResult,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
}

impl TranslationRecord {
    pub fn is_manual(&self) -> bool {
        self.file_name == MANUAL_ENTRY_LABEL
    }
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Vec<TranslationRecord>,
}

impl HistoryStore {
    /// Empty store persisting to `path`; nothing is read.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            records: Vec::new(),
        }
    }

    /// Load the history stored at `path`. A missing or unreadable file yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let mut store = Self::new(path);
        store.reload();
        store
    }

    /// Replace the in-memory records with what is on disk
    pub fn reload(&mut self) {
        self.records = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<TranslationRecord>>(&content) {
                Ok(records) => {
                    info!("Loaded {} history records from {}", records.len(), self.path.display());
                    records
                }
                Err(e) => {
                    warn!("Failed to parse history file {}: {}", self.path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file at {}", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to read history file {}: {}", self.path.display(), e);
                Vec::new()
            }
        };
    }

    pub fn records(&self) -> &[TranslationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TranslationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Id for a record created at `now`: its millisecond timestamp, bumped past every existing id.
    pub fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        // An id of u64::MAX cannot be bumped past, so it is left out
        let newest = self.records.iter().map(|r| r.id).filter(|id| *id < u64::MAX).max();
        match newest {
            Some(newest) if newest >= candidate => newest + 1,
            _ => candidate,
        }
    }

    /// Build a record stamped `now` with a fresh id
    pub fn new_record(
        &self,
        file_name: impl Into<String>,
        source_text: impl Into<String>,
        translations: TranslationResult,
        source: Option<SourceKind>,
    ) -> TranslationRecord {
        let now = Utc::now();
        TranslationRecord {
            id: self.next_id(now),
            file_name: file_name.into(),
            source_text: source_text.into(),
            translations,
            timestamp: now,
            source,
        }
    }

    pub fn append(&mut self, record: TranslationRecord) {
        debug!("Appending history record {} ({})", record.id, record.file_name);
        self.records.insert(0, record);
        self.persist();
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.persist();
        } else {
            debug!("History record {} not present", id);
        }
        removed
    }

    pub fn clear(&mut self) {
        let count = self.records.len();
        self.records.clear();
        self.persist();
        info!("Cleared {} history records", count);
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to save history to {}: {}", self.path.display(), e);
        }
    }

    /// Serialize every record and atomically replace the history file
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| TolmachError::History(format!("Failed to replace history file: {}", e)))?;

        debug!("Saved {} history records to {}", self.records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Language;
    use chrono::TimeZone;

    fn record(id: u64, file_name: &str) -> TranslationRecord {
        let mut translations = TranslationResult::empty();
        translations.set(Language::En, format!("english {}", id));
        TranslationRecord {
            id,
            file_name: file_name.to_string(),
            source_text: format!("source {}", id),
            translations,
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000 + id as i64).unwrap(),
            source: None,
        }
    }

    fn ids(store: &HistoryStore) -> Vec<u64> {
        store.records().iter().map(|r| r.id).collect()
    }

    #[test]
    fn append_puts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(dir.path().join("history.json"));

        store.append(record(1, "a.mp3"));
        store.append(record(2, "b.png"));
        store.append(record(3, "c.txt"));

        assert_eq!(ids(&store), vec![3, 2, 1]);
    }

    #[test]
    fn remove_keeps_other_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(dir.path().join("history.json"));
        for id in 1..=4 {
            store.append(record(id, "f.txt"));
        }

        assert!(store.remove(3));
        assert_eq!(ids(&store), vec![4, 2, 1]);

        assert!(!store.remove(99));
        assert_eq!(ids(&store), vec![4, 2, 1]);
    }

    #[test]
    fn clear_empties_store_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::new(&path);
        store.append(record(1, "a.mp3"));
        store.append(record(2, "b.mp3"));

        store.clear();

        assert!(store.is_empty());
        assert!(HistoryStore::load(&path).is_empty());
    }

    #[test]
    fn reload_reproduces_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let mut store = HistoryStore::new(&path);
        store.append(record(1, "a.mp3"));
        let mut tagged = record(2, "scan");
        tagged.source = Some(SourceKind::Image);
        store.append(tagged);

        let reloaded = HistoryStore::load(&path);

        assert_eq!(reloaded.records(), store.records());
        assert_eq!(reloaded.records()[0].translations.iter().count(), Language::ALL.len());
    }

    #[test]
    fn timestamps_are_stored_as_rfc3339() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = HistoryStore::new(&path);
        store.append(record(5, "a.mp3"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let stamp = raw[0]["timestamp"].as_str().unwrap();

        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(raw[0]["fileName"], "a.mp3");
        assert_eq!(raw[0]["sourceText"], "source 5");
    }

    #[test]
    fn corrupt_or_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        assert!(HistoryStore::load(&path).is_empty());

        std::fs::write(&path, "{not json").unwrap();
        assert!(HistoryStore::load(&path).is_empty());
    }

    #[test]
    fn failed_write_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every save fail
        let path = dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();
        let mut store = HistoryStore::new(&path);

        store.append(record(1, "a.mp3"));

        assert_eq!(store.len(), 1);
        assert!(store.save().is_err());
    }

    #[test]
    fn next_id_is_strictly_increasing() {
        let mut store = HistoryStore::new("unused.json");
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        assert_eq!(store.next_id(now), 1_000);

        store.records.push(record(1_000, "a"));
        assert_eq!(store.next_id(now), 1_001);

        let later = Utc.timestamp_millis_opt(5_000).unwrap();
        assert_eq!(store.next_id(later), 5_000);
    }

    #[test]
    fn next_id_tolerates_maximal_ids() {
        let mut store = HistoryStore::new("unused.json");
        store.records.push(record(u64::MAX, "a"));
        store.records.push(record(1_000, "b"));

        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        assert_eq!(store.next_id(now), 1_001);
    }
}
