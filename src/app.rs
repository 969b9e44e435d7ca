//! Application state management for the portal.
//!
//! This module contains the core `App` struct that owns all application
//! state: the active grade, progress and bookmark store, search index,
//! lesson availability, the offline caching worker, and background task
//! coordination. The UI layer renders from this state and translates key
//! events into the command methods here, so every behavior can be exercised
//! without a terminal.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::api::PortalClient;
use crate::cache::worker::ControlMessage;
use crate::cache::{CacheStore, CacheWorker, Request};
use crate::catalog::{self, CatalogLesson};
use crate::config::Config;
use crate::models::{Availability, Grade, LessonStats, LessonStatus};
use crate::search::{SearchEntry, SearchIndex};
use crate::store::{AnalyticsLog, KvStore, ProgressStore};
use crate::utils::days_since_ms;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Covers a full grade's probe results (~44) with headroom.
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Live search waits this long after the last keystroke before running.
const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Maximum concurrent lesson-existence probes.
const MAX_CONCURRENT_PROBES: usize = 8;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Default toast lifetime.
const TOAST_DURATION_MS: u64 = 3000;

/// Returning-user threshold in days for the welcome-back message.
const WELCOME_BACK_DAYS: i64 = 7;

/// Key-value store keys for page-level state.
const GRADE_KEY: &str = "grade";
const LAST_VISIT_KEY: &str = "last_visit";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingReset,
    Quitting,
}

/// Which lessons the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    Bookmarked,
}

/// Toast message severity, controls styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A transient status message with an expiry.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    pub expires_at: Instant,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from background tasks back to the main application.
enum BackgroundEvent {
    /// A lesson-existence probe resolved.
    Probe { lesson_id: String, available: bool },
    /// A lesson page was fetched (and cached) after an open request.
    LessonFetched {
        lesson_id: String,
        result: Result<(), String>,
    },
    /// The caching worker finished install + activation.
    WorkerReady { deleted_partitions: usize },
    /// The caching worker could not complete its install.
    WorkerInstallFailed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    kv: KvStore,
    pub store: ProgressStore,
    pub analytics: AnalyticsLog,
    client: PortalClient,
    worker: Arc<Mutex<CacheWorker>>,

    // Catalog state for the active grade
    pub grade: Grade,
    pub lessons: Vec<CatalogLesson>,
    pub index: SearchIndex,
    pub availability: HashMap<String, Availability>,

    // UI state
    pub state: AppState,
    pub filter_mode: FilterMode,
    pub selection: usize,
    pub search_query: String,
    pub search_results: Vec<SearchEntry>,
    pub search_selection: usize,
    search_pending_since: Option<Instant>,
    pub toast: Option<Toast>,

    // Background task channel
    events_rx: mpsc::Receiver<BackgroundEvent>,
    events_tx: mpsc::Sender<BackgroundEvent>,

    // Offline mode - no probes, cache-only lesson opens
    pub offline_mode: bool,
}

impl App {
    /// Create the application, loading persisted learner state.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let store_dir = config
            .store_dir()
            .unwrap_or_else(|_| PathBuf::from("./store"));
        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));

        let kv = KvStore::new(store_dir)?;
        let store = ProgressStore::new(kv.clone());
        let analytics = AnalyticsLog::new(kv.clone());

        let client = PortalClient::new(config.base_url())?;
        let cache_store = CacheStore::new(cache_dir)?;
        let worker = Arc::new(Mutex::new(CacheWorker::new(
            cache_store,
            Arc::new(client.clone()),
        )));

        let grade = kv
            .get(GRADE_KEY)
            .map(|g| Grade::from_key(&g))
            .unwrap_or(Grade::Seven);
        let lessons = catalog::flatten(grade);
        let index = SearchIndex::build(grade);

        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let offline_mode = config.offline_mode;

        let mut app = Self {
            config,
            kv,
            store,
            analytics,
            client,
            worker,

            grade,
            lessons,
            index,
            availability: HashMap::new(),

            state: AppState::Normal,
            filter_mode: FilterMode::All,
            selection: 0,
            search_query: String::new(),
            search_results: Vec::new(),
            search_selection: 0,
            search_pending_since: None,
            toast: None,

            events_rx,
            events_tx,

            offline_mode,
        };

        app.reset_availability();
        app.record_visit();
        app.analytics
            .track("page_view", app.grade, &[("page", "portal".to_string())]);

        Ok(app)
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Note the visit and greet a returning learner.
    fn record_visit(&mut self) {
        if let Some(last) = self
            .kv
            .get(LAST_VISIT_KEY)
            .and_then(|v| v.trim().parse::<i64>().ok())
        {
            let days = days_since_ms(last);
            if days > WELCOME_BACK_DAYS {
                self.show_toast_for(
                    format!("Welcome back! It's been {} days.", days),
                    ToastKind::Info,
                    Duration::from_millis(5000),
                );
            }
        }

        let now = Utc::now().timestamp_millis().to_string();
        if let Err(e) = self.kv.set(LAST_VISIT_KEY, &now) {
            debug!(error = %e, "Failed to record visit timestamp");
        }
    }

    /// Install and activate the caching worker in the background, then
    /// start availability probes.
    pub fn start_background_tasks(&self) {
        let worker = Arc::clone(&self.worker);
        let tx = self.events_tx.clone();
        let offline = self.offline_mode;

        tokio::spawn(async move {
            let mut worker = worker.lock().await;
            if !offline {
                if let Err(e) = worker.install().await {
                    let _ = tx.send(BackgroundEvent::WorkerInstallFailed(e.to_string())).await;
                }
            }
            match worker.activate() {
                Ok(deleted) => {
                    let _ = tx
                        .send(BackgroundEvent::WorkerReady {
                            deleted_partitions: deleted.len(),
                        })
                        .await;
                }
                Err(e) => {
                    warn!(error = %e, "Worker activation failed");
                }
            }
        });

        self.start_probes();
    }

    /// Probe every lesson of the active grade concurrently.
    fn start_probes(&self) {
        if self.offline_mode {
            return;
        }

        let targets: Vec<(String, String)> = self
            .lessons
            .iter()
            .map(|l| (l.id.clone(), l.href.clone()))
            .collect();
        let client = self.client.clone();
        let tx = self.events_tx.clone();

        tokio::spawn(async move {
            stream::iter(targets)
                .map(|(lesson_id, href)| {
                    let client = client.clone();
                    async move {
                        let available = client.lesson_exists(&href).await;
                        (lesson_id, available)
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_PROBES)
                .for_each(|(lesson_id, available)| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx
                            .send(BackgroundEvent::Probe {
                                lesson_id,
                                available,
                            })
                            .await;
                    }
                })
                .await;
        });
    }

    /// Availability baseline for the active grade. In offline mode every
    /// lesson is treated as open so cached content stays reachable.
    fn reset_availability(&mut self) {
        let default = if self.offline_mode {
            Availability::Open
        } else {
            Availability::Checking
        };
        self.availability = self
            .lessons
            .iter()
            .map(|l| (l.id.clone(), default))
            .collect();
    }

    // =========================================================================
    // Periodic upkeep
    // =========================================================================

    /// Called once per event-loop iteration: expire toasts, run debounced
    /// search, and drain background events.
    pub fn tick(&mut self) {
        if let Some(ref toast) = self.toast {
            if Instant::now() >= toast.expires_at {
                self.toast = None;
            }
        }

        if let Some(since) = self.search_pending_since {
            if since.elapsed() >= Duration::from_millis(SEARCH_DEBOUNCE_MS) {
                self.run_search();
            }
        }

        self.drain_background_events();
    }

    fn drain_background_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                BackgroundEvent::Probe {
                    lesson_id,
                    available,
                } => {
                    let status = if available {
                        Availability::Open
                    } else {
                        Availability::ComingSoon
                    };
                    // A probe from a previous grade can land after a switch;
                    // only lessons of the active grade are tracked.
                    if let Some(entry) = self.availability.get_mut(&lesson_id) {
                        *entry = status;
                    }
                }
                BackgroundEvent::LessonFetched { lesson_id, result } => match result {
                    Ok(()) => {
                        self.show_toast(
                            format!("{} ready (cached for offline)", lesson_id),
                            ToastKind::Success,
                        );
                    }
                    Err(e) => {
                        debug!(lesson = %lesson_id, error = %e, "Lesson fetch failed");
                        self.show_toast(
                            format!("{} is not available right now", lesson_id),
                            ToastKind::Error,
                        );
                    }
                },
                BackgroundEvent::WorkerReady { deleted_partitions } => {
                    info!(deleted_partitions, "Caching worker active");
                }
                BackgroundEvent::WorkerInstallFailed(e) => {
                    warn!(error = %e, "Caching worker install failed");
                    self.show_toast("Offline cache unavailable".to_string(), ToastKind::Error);
                }
            }
        }
    }

    // =========================================================================
    // Grade switching
    // =========================================================================

    /// Activate a grade: persist the selection, rebuild the catalog view and
    /// search index, restart probes.
    pub fn activate_grade(&mut self, grade: Grade) {
        self.grade = grade;
        if let Err(e) = self.kv.set(GRADE_KEY, grade.key()) {
            debug!(error = %e, "Failed to persist grade selection");
        }

        self.lessons = catalog::flatten(grade);
        self.index = SearchIndex::build(grade);
        self.reset_availability();
        self.selection = 0;
        self.clear_search();

        self.analytics
            .track("grade_switch", grade, &[("grade", grade.key().to_string())]);
        self.start_probes();
    }

    pub fn toggle_grade(&mut self) {
        self.activate_grade(self.grade.toggled());
    }

    // =========================================================================
    // Lesson list
    // =========================================================================

    /// Lessons visible under the current filter, in catalog order.
    pub fn visible_lessons(&self) -> Vec<&CatalogLesson> {
        self.lessons
            .iter()
            .filter(|l| match self.filter_mode {
                FilterMode::All => true,
                FilterMode::Bookmarked => self.store.is_bookmarked(&l.id),
            })
            .collect()
    }

    pub fn selected_lesson(&self) -> Option<&CatalogLesson> {
        self.visible_lessons().get(self.selection).copied()
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_lessons().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        let current = self.selection as isize;
        self.selection = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn availability_of(&self, lesson_id: &str) -> Availability {
        self.availability
            .get(lesson_id)
            .copied()
            .unwrap_or_default()
    }

    /// Open the selected lesson: mark it in-progress and fetch the page
    /// through the caching worker in the background.
    pub fn open_selected(&mut self) {
        let (id, href) = match self.selected_lesson() {
            Some(l) => (l.id.clone(), l.href.clone()),
            None => return,
        };

        if self.availability_of(&id) == Availability::ComingSoon {
            self.show_toast(format!("{} is coming soon", id), ToastKind::Info);
            return;
        }

        self.store.set(&id, LessonStatus::InProgress, self.grade);
        self.analytics.track(
            "lesson_open",
            self.grade,
            &[("lessonId", id.clone()), ("href", href.clone())],
        );

        let worker = Arc::clone(&self.worker);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = {
                let worker = worker.lock().await;
                worker
                    .handle_request(&Request::navigation(href))
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            };
            let _ = tx
                .send(BackgroundEvent::LessonFetched {
                    lesson_id: id,
                    result,
                })
                .await;
        });
    }

    /// Cycle the selected lesson's status (not-started -> in-progress ->
    /// completed -> not-started).
    pub fn cycle_selected_status(&mut self) {
        let id = match self.selected_lesson() {
            Some(l) => l.id.clone(),
            None => return,
        };

        let next = self.store.get(&id).status.cycled();
        self.store.set(&id, next, self.grade);
        self.analytics.track(
            "lesson_progress",
            self.grade,
            &[
                ("lessonId", id.clone()),
                ("status", next.label().to_string()),
            ],
        );
        self.show_toast(format!("{}: {}", id, next.label()), ToastKind::Success);
    }

    pub fn toggle_selected_bookmark(&mut self) {
        let id = match self.selected_lesson() {
            Some(l) => l.id.clone(),
            None => return,
        };

        let now_bookmarked = self.store.toggle_bookmark(&id);
        let event = if now_bookmarked {
            "bookmark_add"
        } else {
            "bookmark_remove"
        };
        self.analytics
            .track(event, self.grade, &[("lessonId", id)]);
        self.show_toast(
            if now_bookmarked {
                "Bookmark added".to_string()
            } else {
                "Bookmark removed".to_string()
            },
            ToastKind::Success,
        );

        // The bookmark filter may have just hidden the selected row
        self.move_selection(0);
    }

    pub fn toggle_filter_mode(&mut self) {
        self.filter_mode = match self.filter_mode {
            FilterMode::All => FilterMode::Bookmarked,
            FilterMode::Bookmarked => FilterMode::All,
        };
        self.selection = 0;
        self.show_toast(
            match self.filter_mode {
                FilterMode::Bookmarked => "Showing bookmarks only".to_string(),
                FilterMode::All => "Showing all lessons".to_string(),
            },
            ToastKind::Info,
        );
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Called on every keystroke in search mode; the query runs after the
    /// debounce window closes.
    pub fn request_search(&mut self) {
        if self.search_query.trim().is_empty() {
            self.search_results.clear();
            self.search_pending_since = None;
            return;
        }
        self.search_pending_since = Some(Instant::now());
    }

    fn run_search(&mut self) {
        self.search_pending_since = None;
        self.search_results = self
            .index
            .search(&self.search_query)
            .into_iter()
            .cloned()
            .collect();
        self.search_selection = 0;
        self.analytics.track(
            "search",
            self.grade,
            &[
                ("query", self.search_query.clone()),
                ("resultCount", self.search_results.len().to_string()),
            ],
        );
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.search_results.clear();
        self.search_selection = 0;
        self.search_pending_since = None;
    }

    /// Jump the main list to a search result and leave search mode.
    pub fn select_search_result(&mut self) {
        let id = match self.search_results.get(self.search_selection) {
            Some(r) => r.id.clone(),
            None => return,
        };

        // Search covers the whole grade, so drop the bookmark filter if it
        // would hide the target.
        if self.filter_mode == FilterMode::Bookmarked && !self.store.is_bookmarked(&id) {
            self.filter_mode = FilterMode::All;
        }
        if let Some(pos) = self.visible_lessons().iter().position(|l| l.id == id) {
            self.selection = pos;
        }

        self.clear_search();
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Destructive and export actions
    // =========================================================================

    /// Reset all progress after the confirmation overlay. Irreversible.
    pub fn reset_progress(&mut self) {
        self.store.reset();
        self.analytics.track("progress_reset", self.grade, &[]);
        self.show_toast("Progress reset successfully".to_string(), ToastKind::Success);
        self.state = AppState::Normal;
    }

    /// Drop every offline cache partition. The static partition refills on
    /// the next install.
    pub fn clear_offline_cache(&mut self) {
        let worker = Arc::clone(&self.worker);
        tokio::spawn(async move {
            worker.lock().await.handle_message(ControlMessage::ClearCache);
        });
        self.analytics.track("cache_clear", self.grade, &[]);
        self.show_toast("Offline cache cleared".to_string(), ToastKind::Success);
    }

    /// Write the data snapshot to a timestamped file in the working
    /// directory.
    pub fn export_data(&mut self) {
        match self.write_export() {
            Ok(path) => {
                self.analytics.track("data_export", self.grade, &[]);
                self.show_toast(
                    format!("Data exported to {}", path.display()),
                    ToastKind::Success,
                );
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.show_toast("Export failed".to_string(), ToastKind::Error);
            }
        }
    }

    fn write_export(&self) -> Result<PathBuf> {
        let json = self.store.export_snapshot(self.grade)?;
        let path = PathBuf::from(format!(
            "mathportal-data-{}.json",
            Utc::now().timestamp_millis()
        ));
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write export file {}", path.display()))?;
        Ok(path)
    }

    // =========================================================================
    // Stats and toasts
    // =========================================================================

    pub fn stats(&self) -> LessonStats {
        self.store.stats(self.grade)
    }

    pub fn show_toast(&mut self, text: String, kind: ToastKind) {
        self.show_toast_for(text, kind, Duration::from_millis(TOAST_DURATION_MS));
    }

    fn show_toast_for(&mut self, text: String, kind: ToastKind, duration: Duration) {
        self.toast = Some(Toast {
            text,
            kind,
            expires_at: Instant::now() + duration,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
