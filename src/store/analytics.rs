//! Capped, best-effort telemetry log.
//!
//! Events are appended to the `analytics` key and never read back by the
//! app; the log keeps only the most recent entries. Every failure here is
//! swallowed - analytics loss has no user-visible consequence.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::models::{AnalyticsEvent, Grade};

use super::KvStore;

const ANALYTICS_KEY: &str = "analytics";

/// Keep the last 100 events, oldest dropped first.
const MAX_EVENTS: usize = 100;

pub struct AnalyticsLog {
    kv: KvStore,
    session_id: String,
    events: Vec<AnalyticsEvent>,
    enabled: bool,
}

impl AnalyticsLog {
    pub fn new(kv: KvStore) -> Self {
        let events = kv.load_json(ANALYTICS_KEY);
        Self {
            kv,
            session_id: generate_session_id(),
            events,
            enabled: true,
        }
    }

    #[cfg(test)]
    pub fn disabled(kv: KvStore) -> Self {
        let mut log = Self::new(kv);
        log.enabled = false;
        log
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Append an event with optional event-specific fields.
    pub fn track(&mut self, name: &str, grade: Grade, fields: &[(&str, String)]) {
        if !self.enabled {
            return;
        }

        let event = AnalyticsEvent {
            name: name.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            session_id: self.session_id.clone(),
            grade: grade.key().to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        };

        debug!(event = name, grade = %grade, "analytics");
        self.events.push(event);
        if self.events.len() > MAX_EVENTS {
            let excess = self.events.len() - MAX_EVENTS;
            self.events.drain(..excess);
        }

        if let Err(e) = self.kv.save_json(ANALYTICS_KEY, &self.events) {
            debug!(error = %e, "Failed to persist analytics log");
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Session identifiers combine the startup time with a short random suffix.
fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> (tempfile::TempDir, AnalyticsLog) {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        (dir, AnalyticsLog::new(kv))
    }

    #[test]
    fn test_log_caps_at_one_hundred_events() {
        let (_dir, mut log) = log();
        for i in 0..130 {
            log.track("page_view", Grade::Seven, &[("page", format!("p{}", i))]);
        }
        assert_eq!(log.len(), 100);
        // Oldest events were dropped; the newest survives
        assert_eq!(log.events.last().unwrap().fields["page"], "p129");
        assert_eq!(log.events.first().unwrap().fields["page"], "p30");
    }

    #[test]
    fn test_events_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let kv = KvStore::new(dir.path().to_path_buf()).unwrap();
        let mut log = AnalyticsLog::new(kv.clone());
        log.track("grade_switch", Grade::Eight, &[]);
        drop(log);

        let log = AnalyticsLog::new(kv);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }
}
