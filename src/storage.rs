//! Persistence collaborator seam.
//!
//! Backends talk to storage only through the [`Storage`] trait; the core
//! discovery and parsing subsystems never touch it. [`MemoryStorage`] is the
//! in-process reference implementation used by backends and tests.

use crate::error::{RastroError, Result};
use crate::types::{Issue, Tracker};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A tracker once the store has assigned it an identifier.
#[derive(Debug, Clone)]
pub struct StoredTracker {
    pub id: i64,
    pub tracker: Tracker,
}

pub trait Storage: Send + Sync {
    /// Record a tracker, returning it with its storage identifier.
    fn insert_tracker(&mut self, tracker: Tracker) -> Result<StoredTracker>;

    fn insert_issue(&mut self, issue: Issue, tracker_id: i64) -> Result<()>;

    /// Most recent submission date among the tracker's stored issues,
    /// or `None` when nothing is stored yet.
    fn get_last_modification_date(&self, tracker_id: i64) -> Result<Option<DateTime<Utc>>>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    trackers: Vec<StoredTracker>,
    issues: HashMap<i64, Vec<Issue>>,
    next_id: i64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_count(&self, tracker_id: i64) -> usize {
        self.issues.get(&tracker_id).map_or(0, Vec::len)
    }

    pub fn issues(&self, tracker_id: i64) -> &[Issue] {
        self.issues.get(&tracker_id).map_or(&[], Vec::as_slice)
    }
}

impl Storage for MemoryStorage {
    fn insert_tracker(&mut self, tracker: Tracker) -> Result<StoredTracker> {
        // Same URL means same tracker; re-inserting returns the existing row.
        if let Some(stored) = self.trackers.iter().find(|t| t.tracker.url == tracker.url) {
            return Ok(stored.clone());
        }

        self.next_id += 1;
        let stored = StoredTracker {
            id: self.next_id,
            tracker,
        };
        self.trackers.push(stored.clone());
        Ok(stored)
    }

    fn insert_issue(&mut self, issue: Issue, tracker_id: i64) -> Result<()> {
        if !self.trackers.iter().any(|t| t.id == tracker_id) {
            return Err(RastroError::StorageError(format!(
                "unknown tracker id {tracker_id}"
            )));
        }

        self.issues.entry(tracker_id).or_default().push(issue);
        Ok(())
    }

    fn get_last_modification_date(&self, tracker_id: i64) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .issues
            .get(&tracker_id)
            .and_then(|issues| issues.iter().map(|i| i.submitted_on).max()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Identity;
    use chrono::TimeZone;

    fn issue(id: &str, day: u32) -> Issue {
        Issue::new(
            id,
            "bug",
            "summary",
            "description",
            Identity::new("sduenas"),
            Utc.with_ymd_and_hms(2013, 1, day, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn tracker_insert_is_idempotent_by_url() {
        let mut store = MemoryStorage::new();
        let a = store
            .insert_tracker(Tracker::new("http://bugs.example.com", "taiga", "beta"))
            .unwrap();
        let b = store
            .insert_tracker(Tracker::new("http://bugs.example.com", "taiga", "beta"))
            .unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn last_modification_tracks_newest_issue() {
        let mut store = MemoryStorage::new();
        let trk = store
            .insert_tracker(Tracker::new("http://bugs.example.com", "taiga", "beta"))
            .unwrap();

        assert_eq!(None, store.get_last_modification_date(trk.id).unwrap());

        store.insert_issue(issue("1", 5), trk.id).unwrap();
        store.insert_issue(issue("2", 12), trk.id).unwrap();
        store.insert_issue(issue("3", 9), trk.id).unwrap();

        let last = store.get_last_modification_date(trk.id).unwrap().unwrap();
        assert_eq!(12, chrono::Datelike::day(&last));
        assert_eq!(3, store.issue_count(trk.id));
    }

    #[test]
    fn insert_issue_rejects_unknown_tracker() {
        let mut store = MemoryStorage::new();
        let err = store.insert_issue(issue("1", 1), 99).unwrap_err();
        assert!(matches!(err, RastroError::StorageError(_)));
    }
}
