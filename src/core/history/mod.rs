use crate::domain::models::FinishedRecording;
use std::sync::Mutex;

/// In-memory list of completed recordings, insertion order preserved. Owned
/// by the runtime state and handed to whoever needs it rather than living as
/// a module global. Ids are not deduplicated; callers supply unique ones.
#[derive(Debug, Default)]
pub struct HistoryStore {
    recordings: Mutex<Vec<FinishedRecording>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, recording: FinishedRecording) {
        if let Ok(mut recordings) = self.recordings.lock() {
            recordings.push(recording);
        }
    }

    /// Removes the first entry with the given id, returning it so the caller
    /// can revoke the backing artifact. No-op when the id is absent.
    pub fn remove(&self, id: &str) -> Option<FinishedRecording> {
        let mut recordings = self.recordings.lock().ok()?;
        let index = recordings.iter().position(|entry| entry.id == id)?;
        Some(recordings.remove(index))
    }

    /// Drains every entry, returning them for artifact cleanup.
    pub fn clear(&self) -> Vec<FinishedRecording> {
        self.recordings
            .lock()
            .map(|mut recordings| recordings.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn list(&self) -> Vec<FinishedRecording> {
        self.recordings
            .lock()
            .map(|recordings| recordings.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.recordings
            .lock()
            .map(|recordings| recordings.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStore;
    use crate::domain::models::{FinishedRecording, Quality};

    fn recording(id: &str) -> FinishedRecording {
        FinishedRecording {
            id: id.to_string(),
            path: format!("/tmp/{id}.webm"),
            timestamp_ms: 0,
            duration_secs: 5,
            file_size_bytes: 1024,
            quality: Quality::High,
            format: "webm".to_string(),
        }
    }

    #[test]
    fn add_then_remove_returns_to_empty() {
        let store = HistoryStore::new();
        store.add(recording("a"));
        assert_eq!(store.len(), 1);
        let removed = store.remove("a").unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.is_empty());
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let store = HistoryStore::new();
        store.add(recording("a"));
        assert!(store.remove("b").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = HistoryStore::new();
        store.add(recording("first"));
        store.add(recording("second"));
        store.add(recording("third"));
        let ids = store
            .list()
            .into_iter()
            .map(|entry| entry.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn clear_drains_everything() {
        let store = HistoryStore::new();
        store.add(recording("a"));
        store.add(recording("b"));
        let drained = store.clear();
        assert_eq!(drained.len(), 2);
        assert!(store.is_empty());
    }
}
