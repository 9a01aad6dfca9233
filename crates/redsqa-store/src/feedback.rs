//! Durable reviewer-feedback document.
//!
//! One JSON object keyed by record id. The store is write-once per key:
//! `record` rejects a second submission for the same id instead of
//! overwriting. The write path takes an advisory file lock on a sibling
//! `.lock` file and replaces the document atomically (temp file + rename),
//! so two writers can never both succeed for one id and a crashed write
//! never leaves a half-written document behind.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use redsqa_core::FeedbackEntry;

use crate::StoreError;

pub struct FeedbackStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all accumulated feedback. An absent store is an empty map; an
    /// unparseable store is a loud [`StoreError::Corrupt`], never silently
    /// discarded data.
    pub fn load(&self) -> Result<BTreeMap<String, FeedbackEntry>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Record one feedback entry. Write-once per record id: a duplicate is
    /// rejected with [`StoreError::Duplicate`] and the stored entry is left
    /// untouched.
    pub fn record(&self, entry: FeedbackEntry) -> Result<(), StoreError> {
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        let mut lock = fd_lock::RwLock::new(lock_file);
        let _guard = lock.write()?;

        // Check-then-write is safe under the held lock.
        let mut entries = self.load()?;
        if entries.contains_key(&entry.record_id) {
            return Err(StoreError::Duplicate(entry.record_id));
        }

        let record_id = entry.record_id.clone();
        entries.insert(record_id.clone(), entry);
        self.replace(&entries)?;

        info!(record_id = %record_id, total = entries.len(), "feedback recorded");
        Ok(())
    }

    /// Atomically replace the document.
    fn replace(&self, entries: &BTreeMap<String, FeedbackEntry>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(entries).map_err(std::io::Error::other)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redsqa_core::ReviewerJudgment;

    fn entry(id: &str, judgment: ReviewerJudgment) -> FeedbackEntry {
        FeedbackEntry {
            record_id: id.into(),
            narrative: "subtraiu sem violência".into(),
            declared_code: "C01155".into(),
            verdict: "compatível com FURTO: sem violencia".into(),
            judgment,
            submitted_at: "2025-01-01T12:00:00+00:00".into(),
        }
    }

    #[test]
    fn absent_store_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn recorded_entry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        FeedbackStore::new(&path)
            .record(entry("R1", ReviewerJudgment::Correct))
            .unwrap();

        let loaded = FeedbackStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["R1"].judgment, ReviewerJudgment::Correct);
    }

    #[test]
    fn second_submission_is_rejected_and_entry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.json"));

        store.record(entry("R1", ReviewerJudgment::Correct)).unwrap();
        let err = store
            .record(entry("R1", ReviewerJudgment::Incorrect))
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(ref id) if id == "R1"));

        // First submission wins; the stored entry is untouched.
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["R1"].judgment, ReviewerJudgment::Correct);
    }

    #[test]
    fn distinct_ids_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedbackStore::new(dir.path().join("feedback.json"));

        store.record(entry("R1", ReviewerJudgment::Correct)).unwrap();
        store.record(entry("R2", ReviewerJudgment::Incorrect)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn corrupt_store_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let store = FeedbackStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        // And the write path surfaces it too instead of clobbering data.
        assert!(matches!(
            store.record(entry("R1", ReviewerJudgment::Correct)),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
