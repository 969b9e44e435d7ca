//! The caching worker: install, activate, and per-request strategy dispatch.
//!
//! Lifecycle is install/activate/serve. `install` fills the static partition
//! from a fixed manifest (all-or-nothing). `activate` rotates out partitions
//! left over from older cache versions. After that, `handle_request` serves
//! every classified request through the route table's strategy, falling back
//! to a synthesized offline page when a navigation misses both network and
//! cache.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::FetchError;

use super::fetch::{Fetch, FetchedResponse, Request};
use super::routes::{self, RouteDecision, Strategy};
use super::store::CacheStore;

/// Cache version; bumping this retires every existing partition on the next
/// activation.
pub const CACHE_VERSION: &str = "mathportal-v1.0.0";

/// The three partitions of the current version. All share the version prefix.
pub const CACHE_STATIC: &str = "mathportal-v1.0.0-static";
pub const CACHE_DYNAMIC: &str = "mathportal-v1.0.0-dynamic";
pub const CACHE_IMAGES: &str = "mathportal-v1.0.0-images";

/// Critical assets cached on install. If any of these fails to fetch, the
/// install fails as a whole and nothing is written.
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/assets/logo.png",
    "/assets/logo.svg",
    "/assets/banner.png",
    "https://cdn.tailwindcss.com",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;600;800&family=Poppins:wght@600;800&display=swap",
];

/// Worker lifecycle phase. The platform contract is that activation
/// completes before any request is handled; `handle_request` does not
/// re-check this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    New,
    Installed,
    Active,
}

/// Control commands accepted over the message channel. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Promote this worker to active immediately.
    SkipWaiting,
    /// Delete every cache partition unconditionally.
    ClearCache,
}

/// Fixed-shape notification rendered for push events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Opens the portal root page.
    Explore,
    /// Dismisses the notification.
    Close,
}

impl NotificationAction {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationAction::Explore => "View Lesson",
            NotificationAction::Close => "Close",
        }
    }
}

/// A response served by the worker, plus the background revalidation task
/// when the cache-first strategy kicked one off.
pub struct Served {
    pub response: FetchedResponse,
    pub revalidation: Option<JoinHandle<()>>,
}

/// Background sync tag for the analytics flush.
const SYNC_ANALYTICS_TAG: &str = "sync-analytics";

pub struct CacheWorker {
    store: CacheStore,
    fetcher: Arc<dyn Fetch>,
    phase: WorkerPhase,
}

impl CacheWorker {
    pub fn new(store: CacheStore, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            store,
            fetcher,
            phase: WorkerPhase::New,
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Current version's partition names.
    pub fn current_partitions() -> [&'static str; 3] {
        [CACHE_STATIC, CACHE_DYNAMIC, CACHE_IMAGES]
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Fill the static partition from the manifest. All-or-nothing: every
    /// asset is fetched before anything is written, and a single failure
    /// aborts the install.
    pub async fn install(&mut self) -> Result<(), FetchError> {
        info!(version = CACHE_VERSION, "Installing caching worker");

        let mut fetched = Vec::with_capacity(STATIC_ASSETS.len());
        for url in STATIC_ASSETS {
            match self.fetcher.fetch(url).await {
                Ok(response) if response.is_ok() => fetched.push(response),
                Ok(response) => {
                    warn!(url, status = response.status, "Install manifest fetch failed");
                    return Err(FetchError::from_status(response.status, url));
                }
                Err(e) => {
                    warn!(url, error = %e, "Install manifest fetch failed");
                    return Err(e);
                }
            }
        }

        for response in &fetched {
            if let Err(e) = self.store.put(CACHE_STATIC, response) {
                warn!(url = %response.url, error = %e, "Failed to write static asset");
                return Err(FetchError::InvalidResponse(e.to_string()));
            }
        }

        self.phase = WorkerPhase::Installed;
        info!(assets = fetched.len(), "Static assets cached");
        Ok(())
    }

    /// Delete every partition not belonging to the current version, then
    /// become active. Returns the deleted partition names.
    pub fn activate(&mut self) -> anyhow::Result<Vec<String>> {
        info!(version = CACHE_VERSION, "Activating caching worker");

        let current = Self::current_partitions();
        let mut deleted = Vec::new();

        for partition in self.store.list_partitions()? {
            if !current.contains(&partition.as_str()) {
                debug!(partition = %partition, "Deleting stale cache partition");
                self.store.delete_partition(&partition)?;
                deleted.push(partition);
            }
        }

        self.phase = WorkerPhase::Active;
        Ok(deleted)
    }

    // =========================================================================
    // Request handling
    // =========================================================================

    /// Serve one request. `Ok(None)` means the request is out of scope
    /// (non-HTTP scheme) and should be left to its default handling.
    pub async fn handle_request(&self, request: &Request) -> Result<Option<Served>, FetchError> {
        match routes::classify(&request.url) {
            RouteDecision::Passthrough => Ok(None),
            RouteDecision::Apply(Strategy::NetworkFirst) => {
                self.network_first(request).await.map(|response| {
                    Some(Served {
                        response,
                        revalidation: None,
                    })
                })
            }
            RouteDecision::Apply(Strategy::CacheFirst) => {
                self.cache_first(request).await.map(Some)
            }
        }
    }

    /// Network-first: live fetch, writing a copy into the dynamic partition;
    /// cache fallback on failure; offline page as a last resort for
    /// navigations.
    async fn network_first(&self, request: &Request) -> Result<FetchedResponse, FetchError> {
        match self.fetcher.fetch(&request.url).await {
            Ok(response) => {
                if response.is_ok() {
                    if let Err(e) = self.store.put(CACHE_DYNAMIC, &response) {
                        debug!(url = %request.url, error = %e, "Failed to cache network response");
                    }
                }
                Ok(response)
            }
            Err(e) => {
                if let Some(cached) = self.store.match_url(&request.url) {
                    debug!(url = %request.url, "Serving from cache (offline)");
                    return Ok(cached);
                }

                if request.navigation {
                    debug!(url = %request.url, "Serving offline page");
                    return Ok(offline_page());
                }

                Err(e)
            }
        }
    }

    /// Cache-first: cached copy returns immediately with a background
    /// revalidation; a miss fetches and stores by content class.
    async fn cache_first(&self, request: &Request) -> Result<Served, FetchError> {
        if let Some(cached) = self.store.match_url(&request.url) {
            let revalidation = self.spawn_revalidation(request.url.clone());
            return Ok(Served {
                response: cached,
                revalidation: Some(revalidation),
            });
        }

        let response = self.fetcher.fetch(&request.url).await?;
        if response.is_ok() {
            let partition = if routes::is_image_url(&request.url) {
                CACHE_IMAGES
            } else {
                CACHE_DYNAMIC
            };
            if let Err(e) = self.store.put(partition, &response) {
                debug!(url = %request.url, error = %e, "Failed to cache response");
            }
        }

        Ok(Served {
            response,
            revalidation: None,
        })
    }

    /// Stale-while-revalidate refresh. Runs to completion or fails silently;
    /// there is no cancellation path.
    fn spawn_revalidation(&self, url: String) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let store = self.store.clone();

        tokio::spawn(async move {
            match fetcher.fetch(&url).await {
                Ok(response) if response.is_ok() => {
                    if let Err(e) = store.put(CACHE_DYNAMIC, &response) {
                        debug!(url = %url, error = %e, "Background refresh write failed");
                    }
                }
                Ok(_) | Err(_) => {
                    // Background refresh failures are silent by design
                }
            }
        })
    }

    // =========================================================================
    // Messaging surface
    // =========================================================================

    /// Handle a control command. No acknowledgment payload.
    pub fn handle_message(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SkipWaiting => {
                info!("Skip-waiting requested, activating immediately");
                self.phase = WorkerPhase::Active;
            }
            ControlMessage::ClearCache => {
                info!("Clearing all cache partitions");
                if let Err(e) = self.store.clear_all() {
                    warn!(error = %e, "Failed to clear cache partitions");
                }
            }
        }
    }

    /// Render the fixed-shape notification for a push payload.
    pub fn handle_push(&self, payload: Option<&str>) -> Notification {
        Notification {
            title: "QLA Mathematics".to_string(),
            body: payload.unwrap_or("New lesson available!").to_string(),
            actions: vec![NotificationAction::Explore, NotificationAction::Close],
        }
    }

    /// Resolve a notification click: explore opens the root page, close
    /// opens nothing.
    pub fn handle_notification_click(&self, action: NotificationAction) -> Option<String> {
        match action {
            NotificationAction::Explore => Some("/".to_string()),
            NotificationAction::Close => None,
        }
    }

    /// Background sync entry point. Only the analytics tag is recognized;
    /// the flush itself is best-effort.
    pub fn handle_sync(&self, tag: &str) {
        if tag == SYNC_ANALYTICS_TAG {
            info!("Syncing analytics data");
        } else {
            debug!(tag, "Ignoring unknown sync tag");
        }
    }
}

/// The synthesized offline fallback for navigations that miss both network
/// and cache.
fn offline_page() -> FetchedResponse {
    FetchedResponse::synthesized("offline", "text/html", OFFLINE_PAGE.as_bytes().to_vec())
}

const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width,initial-scale=1"/>
  <title>Offline - QLA Mathematics</title>
  <style>
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
      background: linear-gradient(135deg, #6C1D45 0%, #8B2450 100%);
      color: #fff;
      display: flex;
      align-items: center;
      justify-content: center;
      min-height: 100vh;
      padding: 20px;
      text-align: center;
    }
    .container {
      max-width: 500px;
      background: rgba(255,255,255,0.1);
      border-radius: 20px;
      padding: 40px;
      border: 1px solid rgba(255,255,255,0.2);
    }
    h1 { font-size: 2.5rem; margin-bottom: 1rem; }
    p { font-size: 1.1rem; line-height: 1.6; opacity: 0.9; }
  </style>
</head>
<body>
  <div class="container">
    <h1>You're Offline</h1>
    <p>It looks like you don't have an internet connection right now.
       You can still open lessons you've visited before.</p>
  </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Scripted fetcher: URL -> response, everything else unreachable.
    /// Records every fetch in call order.
    struct FakeFetch {
        responses: Mutex<HashMap<String, FetchedResponse>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetch {
        fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn serve(&self, url: &str, body: &[u8]) {
            let content_type = if url.ends_with(".png") {
                "image/png"
            } else {
                "text/html"
            };
            self.responses.lock().unwrap().insert(
                url.to_string(),
                FetchedResponse {
                    url: url.to_string(),
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    body: body.to_vec(),
                },
            );
        }

        fn serve_manifest(&self) {
            for url in STATIC_ASSETS {
                self.serve(url, b"asset");
            }
        }

        fn drop_url(&self, url: &str) {
            self.responses.lock().unwrap().remove(url);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for FakeFetch {
        async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::ServerError(format!("unreachable: {}", url)))
        }
    }

    fn worker_with(fetch: FakeFetch) -> (tempfile::TempDir, Arc<FakeFetch>, CacheWorker) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        let fetch = Arc::new(fetch);
        let worker = CacheWorker::new(store.clone(), fetch.clone());
        (dir, fetch, worker)
    }

    fn store_of(dir: &tempfile::TempDir) -> CacheStore {
        CacheStore::new(dir.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_install_caches_the_full_manifest() {
        let fetch = FakeFetch::new();
        fetch.serve_manifest();
        let (dir, _fetch, mut worker) = worker_with(fetch);

        worker.install().await.unwrap();
        assert_eq!(worker.phase(), WorkerPhase::Installed);

        let store = store_of(&dir);
        for url in STATIC_ASSETS {
            assert!(store.has(CACHE_STATIC, url), "missing {}", url);
        }
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let fetch = FakeFetch::new();
        fetch.serve_manifest();
        fetch.drop_url("/manifest.json");
        let (dir, _fetch, mut worker) = worker_with(fetch);

        assert!(worker.install().await.is_err());
        assert_eq!(worker.phase(), WorkerPhase::New);

        // Nothing was written: the static partition does not exist
        let store = store_of(&dir);
        assert!(store.list_partitions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activate_retains_exactly_the_current_partitions() {
        let (dir, _fetch, mut worker) = worker_with(FakeFetch::new());
        let store = store_of(&dir);

        let page = FetchedResponse::synthesized("/x", "text/html", b"x".to_vec());
        store.put(CACHE_STATIC, &page).unwrap();
        store.put(CACHE_DYNAMIC, &page).unwrap();
        store.put(CACHE_IMAGES, &page).unwrap();
        store.put("mathportal-v0.9.0-static", &page).unwrap();
        store.put("mathportal-v0.9.0-dynamic", &page).unwrap();

        let mut deleted = worker.activate().unwrap();
        deleted.sort();
        assert_eq!(
            deleted,
            vec!["mathportal-v0.9.0-dynamic", "mathportal-v0.9.0-static"]
        );
        assert_eq!(worker.phase(), WorkerPhase::Active);

        let mut remaining = store.list_partitions().unwrap();
        remaining.sort();
        let mut expected: Vec<String> = CacheWorker::current_partitions()
            .iter()
            .map(|s| s.to_string())
            .collect();
        expected.sort();
        assert_eq!(remaining, expected);
    }

    #[tokio::test]
    async fn test_network_first_serves_network_and_fills_dynamic() {
        let fetch = FakeFetch::new();
        fetch.serve("/grade7/lesson-2.html", b"<html>lesson 2</html>");
        let (dir, _fetch, worker) = worker_with(fetch);

        let served = worker
            .handle_request(&Request::navigation("/grade7/lesson-2.html"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(served.response.body, b"<html>lesson 2</html>");
        assert!(served.revalidation.is_none());

        let cached = store_of(&dir)
            .get(CACHE_DYNAMIC, "/grade7/lesson-2.html")
            .unwrap();
        assert_eq!(cached.body, b"<html>lesson 2</html>");
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache_when_offline() {
        let (dir, _fetch, worker) = worker_with(FakeFetch::new());
        let store = store_of(&dir);
        store
            .put(
                CACHE_DYNAMIC,
                &FetchedResponse::synthesized(
                    "/grade7/lesson-3.html",
                    "text/html",
                    b"cached copy".to_vec(),
                ),
            )
            .unwrap();

        let served = worker
            .handle_request(&Request::navigation("/grade7/lesson-3.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(served.response.body, b"cached copy");
    }

    #[tokio::test]
    async fn test_offline_navigation_with_no_cache_gets_offline_page() {
        let (_dir, _fetch, worker) = worker_with(FakeFetch::new());

        let served = worker
            .handle_request(&Request::navigation("/grade8/lesson-9.html"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(served.response.content_type.as_deref(), Some("text/html"));
        assert!(!served.response.body.is_empty());
        let html = String::from_utf8(served.response.body).unwrap();
        assert!(html.contains("Offline"));
    }

    #[tokio::test]
    async fn test_offline_subresource_with_no_cache_propagates_error() {
        let (_dir, _fetch, worker) = worker_with(FakeFetch::new());

        let result = worker
            .handle_request(&Request::new("/grade7/lesson-4.html"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cache_first_hit_returns_cached_and_revalidates() {
        let fetch = FakeFetch::new();
        fetch.serve("/assets/banner.png", b"fresh bytes");
        let (dir, fetch, worker) = worker_with(fetch);

        let store = store_of(&dir);
        store
            .put(
                CACHE_IMAGES,
                &FetchedResponse::synthesized("/assets/banner.png", "image/png", b"stale bytes".to_vec()),
            )
            .unwrap();

        let served = worker
            .handle_request(&Request::new("/assets/banner.png"))
            .await
            .unwrap()
            .unwrap();

        // Cached copy returned without waiting on the network
        assert_eq!(served.response.body, b"stale bytes");

        // Background refresh ran and wrote the fresh copy
        served.revalidation.unwrap().await.unwrap();
        assert_eq!(fetch.calls(), vec!["/assets/banner.png"]);
        let refreshed = store.get(CACHE_DYNAMIC, "/assets/banner.png").unwrap();
        assert_eq!(refreshed.body, b"fresh bytes");
    }

    #[tokio::test]
    async fn test_cache_first_miss_fetches_and_stores_by_content_class() {
        let fetch = FakeFetch::new();
        fetch.serve("/assets/logo.png", b"png bytes");
        fetch.serve("/about.html", b"about page");
        let (dir, _fetch, worker) = worker_with(fetch);
        let store = store_of(&dir);

        let served = worker
            .handle_request(&Request::new("/assets/logo.png"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(served.response.body, b"png bytes");
        assert!(store.has(CACHE_IMAGES, "/assets/logo.png"));

        // Unmatched URL defaults to cache-first and stores into dynamic
        worker
            .handle_request(&Request::new("/about.html"))
            .await
            .unwrap()
            .unwrap();
        assert!(store.has(CACHE_DYNAMIC, "/about.html"));
    }

    #[tokio::test]
    async fn test_cache_first_miss_offline_propagates_error() {
        let (_dir, _fetch, worker) = worker_with(FakeFetch::new());
        let result = worker.handle_request(&Request::new("/assets/logo.png")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_non_http_request_passes_through() {
        let (_dir, fetch, worker) = worker_with(FakeFetch::new());
        let served = worker
            .handle_request(&Request::new("chrome-extension://abc/page.html"))
            .await
            .unwrap();
        assert!(served.is_none());
        assert!(fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_message_deletes_every_partition() {
        let (dir, _fetch, mut worker) = worker_with(FakeFetch::new());
        let store = store_of(&dir);
        store
            .put(CACHE_STATIC, &FetchedResponse::synthesized("/a", "text/html", b"a".to_vec()))
            .unwrap();
        store
            .put(CACHE_IMAGES, &FetchedResponse::synthesized("/b", "image/png", b"b".to_vec()))
            .unwrap();

        worker.handle_message(ControlMessage::ClearCache);
        assert!(store.list_partitions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates_immediately() {
        let (_dir, _fetch, mut worker) = worker_with(FakeFetch::new());
        assert_eq!(worker.phase(), WorkerPhase::New);
        worker.handle_message(ControlMessage::SkipWaiting);
        assert_eq!(worker.phase(), WorkerPhase::Active);
    }

    #[tokio::test]
    async fn test_push_notification_shape_and_click_targets() {
        let (_dir, _fetch, worker) = worker_with(FakeFetch::new());

        let note = worker.handle_push(None);
        assert_eq!(note.body, "New lesson available!");
        assert_eq!(
            note.actions,
            vec![NotificationAction::Explore, NotificationAction::Close]
        );

        let note = worker.handle_push(Some("Unit 5 is live"));
        assert_eq!(note.body, "Unit 5 is live");

        assert_eq!(
            worker.handle_notification_click(NotificationAction::Explore),
            Some("/".to_string())
        );
        assert_eq!(worker.handle_notification_click(NotificationAction::Close), None);
    }
}
