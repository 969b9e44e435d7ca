//! Progress and bookmark tracking over the key-value store.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use tracing::debug;

use crate::catalog;
use crate::models::{Grade, LessonStats, LessonStatus, ProgressRecord, Snapshot};

use super::KvStore;

const PROGRESS_KEY: &str = "progress";
const BOOKMARKS_KEY: &str = "bookmarks";

/// In-memory view of progress and bookmarks, persisted on every mutation.
///
/// Last-write-wins with no locking: the store is single-user and
/// single-process. Corrupt persisted data loads as empty.
pub struct ProgressStore {
    kv: KvStore,
    progress: BTreeMap<String, ProgressRecord>,
    bookmarks: Vec<String>,
}

impl ProgressStore {
    pub fn new(kv: KvStore) -> Self {
        let progress = kv.load_json(PROGRESS_KEY);
        let bookmarks = kv.load_json(BOOKMARKS_KEY);
        Self {
            kv,
            progress,
            bookmarks,
        }
    }

    /// Look up a lesson's record, defaulting to not-started.
    pub fn get(&self, lesson_id: &str) -> ProgressRecord {
        self.progress.get(lesson_id).cloned().unwrap_or_default()
    }

    /// Record a status for a lesson, stamped with the current time and the
    /// grade it was recorded under.
    pub fn set(&mut self, lesson_id: &str, status: LessonStatus, grade: Grade) {
        self.progress
            .insert(lesson_id.to_string(), ProgressRecord::new(status, grade.key()));
        self.save_progress();
    }

    /// Toggle a bookmark; returns whether the lesson is now bookmarked.
    pub fn toggle_bookmark(&mut self, lesson_id: &str) -> bool {
        let now_bookmarked = match self.bookmarks.iter().position(|b| b == lesson_id) {
            Some(i) => {
                self.bookmarks.remove(i);
                false
            }
            None => {
                self.bookmarks.push(lesson_id.to_string());
                true
            }
        };
        self.save_bookmarks();
        now_bookmarked
    }

    pub fn is_bookmarked(&self, lesson_id: &str) -> bool {
        self.bookmarks.iter().any(|b| b == lesson_id)
    }

    /// Clear every progress record at once. Irreversible; the UI confirms
    /// with the user before calling this. Bookmarks are untouched.
    pub fn reset(&mut self) {
        self.progress.clear();
        self.save_progress();
    }

    /// Snapshot of the current state for export.
    pub fn snapshot(&self, grade: Grade) -> Snapshot {
        Snapshot {
            grade: grade.key().to_string(),
            progress: self.progress.clone(),
            bookmarks: self.bookmarks.clone(),
            export_date: Utc::now(),
        }
    }

    /// Serialize the snapshot the way the export file is written.
    pub fn export_snapshot(&self, grade: Grade) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot(grade))?)
    }

    /// Counts for the stats panel, scoped to one grade. Completed and
    /// in-progress counts only include records written under that grade;
    /// bookmarks are matched by identifier prefix.
    pub fn stats(&self, grade: Grade) -> LessonStats {
        let mut stats = LessonStats {
            total: catalog::total_lessons(grade),
            ..Default::default()
        };

        for record in self.progress.values() {
            if record.grade == grade.key() {
                match record.status {
                    LessonStatus::Completed => stats.completed += 1,
                    LessonStatus::InProgress => stats.in_progress += 1,
                    LessonStatus::NotStarted => {}
                }
            }
        }

        stats.bookmarked = self
            .bookmarks
            .iter()
            .filter(|id| id.starts_with(grade.folder()))
            .count();

        stats
    }

    fn save_progress(&self) {
        if let Err(e) = self.kv.save_json(PROGRESS_KEY, &self.progress) {
            debug!(error = %e, "Failed to persist progress");
        }
    }

    fn save_bookmarks(&self) {
        if let Err(e) = self.kv.save_json(BOOKMARKS_KEY, &self.bookmarks) {
            debug!(error = %e, "Failed to persist bookmarks");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (tempfile::TempDir, ProgressStore) {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        (dir, ProgressStore::new(kv))
    }

    fn reopen(dir: &tempfile::TempDir) -> ProgressStore {
        ProgressStore::new(KvStore::new(dir.path().to_path_buf()).unwrap())
    }

    #[test]
    fn test_get_after_set_returns_status_and_fresh_timestamp() {
        let (_dir, mut store) = fresh();
        let before = Utc::now().timestamp_millis();
        store.set("grade7-lesson-2", LessonStatus::InProgress, Grade::Seven);

        let record = store.get("grade7-lesson-2");
        assert_eq!(record.status, LessonStatus::InProgress);
        assert!(record.timestamp >= before);
        assert_eq!(record.grade, "7");
    }

    #[test]
    fn test_missing_lesson_defaults_to_not_started() {
        let (_dir, store) = fresh();
        assert_eq!(store.get("grade8-lesson-99").status, LessonStatus::NotStarted);
    }

    #[test]
    fn test_bookmark_toggle_is_involution() {
        let (_dir, mut store) = fresh();
        assert!(!store.is_bookmarked("grade7-lesson-4"));
        assert!(store.toggle_bookmark("grade7-lesson-4"));
        assert!(store.is_bookmarked("grade7-lesson-4"));
        assert!(!store.toggle_bookmark("grade7-lesson-4"));
        assert!(!store.is_bookmarked("grade7-lesson-4"));
    }

    #[test]
    fn test_state_survives_reload() {
        let (dir, mut store) = fresh();
        store.set("grade7-lesson-5", LessonStatus::Completed, Grade::Seven);
        store.toggle_bookmark("grade7-lesson-5");

        let store = reopen(&dir);
        assert_eq!(store.get("grade7-lesson-5").status, LessonStatus::Completed);
        assert!(store.is_bookmarked("grade7-lesson-5"));
    }

    #[test]
    fn test_completed_count_rises_by_one_after_mark_and_reload() {
        let (dir, mut store) = fresh();
        let before = store.stats(Grade::Seven).completed;

        store.set("grade7-lesson-5", LessonStatus::Completed, Grade::Seven);
        let store = reopen(&dir);

        assert_eq!(store.stats(Grade::Seven).completed, before + 1);
    }

    #[test]
    fn test_stats_are_grade_scoped() {
        let (_dir, mut store) = fresh();
        store.set("grade7-lesson-2", LessonStatus::Completed, Grade::Seven);
        store.set("grade8-lesson-2", LessonStatus::InProgress, Grade::Eight);
        store.toggle_bookmark("grade7-lesson-3");
        store.toggle_bookmark("grade8-lesson-3");

        let g7 = store.stats(Grade::Seven);
        assert_eq!(g7.completed, 1);
        assert_eq!(g7.in_progress, 0);
        assert_eq!(g7.bookmarked, 1);
        assert_eq!(g7.total, catalog::total_lessons(Grade::Seven));

        let g8 = store.stats(Grade::Eight);
        assert_eq!(g8.completed, 0);
        assert_eq!(g8.in_progress, 1);
        assert_eq!(g8.bookmarked, 1);
    }

    #[test]
    fn test_reset_clears_progress_but_not_bookmarks() {
        let (_dir, mut store) = fresh();
        store.set("grade7-lesson-2", LessonStatus::Completed, Grade::Seven);
        store.toggle_bookmark("grade7-lesson-2");

        store.reset();
        assert_eq!(store.get("grade7-lesson-2").status, LessonStatus::NotStarted);
        assert!(store.is_bookmarked("grade7-lesson-2"));
    }

    #[test]
    fn test_corrupt_progress_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        kv.set("progress", "][ not json").unwrap();
        kv.set("bookmarks", "{\"wrong\": \"shape\"}").unwrap();

        let store = ProgressStore::new(kv);
        assert_eq!(store.get("grade7-lesson-2").status, LessonStatus::NotStarted);
        assert_eq!(store.stats(Grade::Seven).bookmarked, 0);
    }

    #[test]
    fn test_snapshot_matches_in_memory_state() {
        let (_dir, mut store) = fresh();
        store.set("grade7-lesson-2", LessonStatus::Completed, Grade::Seven);
        store.toggle_bookmark("grade7-lesson-3");

        let snap = store.snapshot(Grade::Seven);
        assert_eq!(snap.grade, "7");
        assert_eq!(
            snap.progress.get("grade7-lesson-2").unwrap().status,
            LessonStatus::Completed
        );
        assert_eq!(snap.bookmarks, vec!["grade7-lesson-3".to_string()]);

        // Round-trips through the exported JSON form
        let json = store.export_snapshot(Grade::Seven).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grade, snap.grade);
        assert_eq!(back.bookmarks, snap.bookmarks);
        assert_eq!(back.progress.len(), snap.progress.len());
    }
}
