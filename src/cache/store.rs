//! On-disk blob store with named partitions.
//!
//! Each partition is a directory under the cache root; each cached response
//! is a metadata JSON file plus a body file, keyed by a digest of the URL.
//! Writes are keyed per URL, so concurrent in-flight requests never touch
//! the same entry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::fetch::FetchedResponse;

/// Entry metadata stored alongside the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedMeta {
    url: String,
    status: u16,
    content_type: Option<String>,
    cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root {}", root.display()))?;
        Ok(Self { root })
    }

    fn partition_path(&self, partition: &str) -> PathBuf {
        self.root.join(partition)
    }

    /// Filename key for a URL: a short readable slug plus a stable digest.
    fn entry_key(url: &str) -> String {
        let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
        let slug: String = url
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .take(40)
            .collect();
        format!("{}-{}", slug, &digest[..16])
    }

    fn meta_path(&self, partition: &str, url: &str) -> PathBuf {
        self.partition_path(partition)
            .join(format!("{}.json", Self::entry_key(url)))
    }

    fn body_path(&self, partition: &str, url: &str) -> PathBuf {
        self.partition_path(partition)
            .join(format!("{}.bin", Self::entry_key(url)))
    }

    /// Store a response in a partition, replacing any previous entry for
    /// the same URL.
    pub fn put(&self, partition: &str, response: &FetchedResponse) -> Result<()> {
        std::fs::create_dir_all(self.partition_path(partition))
            .with_context(|| format!("Failed to create partition {}", partition))?;

        let meta = CachedMeta {
            url: response.url.clone(),
            status: response.status,
            content_type: response.content_type.clone(),
            cached_at: Utc::now(),
        };

        std::fs::write(self.body_path(partition, &response.url), &response.body)
            .with_context(|| format!("Failed to write cache body for {}", response.url))?;
        std::fs::write(
            self.meta_path(partition, &response.url),
            serde_json::to_string(&meta)?,
        )
        .with_context(|| format!("Failed to write cache meta for {}", response.url))?;

        Ok(())
    }

    /// Look up a URL in one partition. Unreadable entries read as a miss.
    pub fn get(&self, partition: &str, url: &str) -> Option<FetchedResponse> {
        let meta_path = self.meta_path(partition, url);
        if !meta_path.exists() {
            return None;
        }

        let meta: CachedMeta = match std::fs::read_to_string(&meta_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
        {
            Some(m) => m,
            None => {
                debug!(partition, url, "Corrupt cache metadata, treating as miss");
                return None;
            }
        };

        let body = match std::fs::read(self.body_path(partition, url)) {
            Ok(b) => b,
            Err(e) => {
                debug!(partition, url, error = %e, "Missing cache body, treating as miss");
                return None;
            }
        };

        Some(FetchedResponse {
            url: meta.url,
            status: meta.status,
            content_type: meta.content_type,
            body,
        })
    }

    /// Look up a URL across every existing partition, in directory order.
    pub fn match_url(&self, url: &str) -> Option<FetchedResponse> {
        for partition in self.list_partitions().ok()? {
            if let Some(response) = self.get(&partition, url) {
                return Some(response);
            }
        }
        None
    }

    pub fn has(&self, partition: &str, url: &str) -> bool {
        self.meta_path(partition, url).exists()
    }

    /// Names of every partition directory currently on disk.
    pub fn list_partitions(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read cache root {}", self.root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete_partition(&self, partition: &str) -> Result<()> {
        let path = self.partition_path(partition);
        if path.exists() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to delete partition {}", partition))?;
        }
        Ok(())
    }

    /// Delete every partition unconditionally.
    pub fn clear_all(&self) -> Result<()> {
        for partition in self.list_partitions()? {
            self.delete_partition(&partition)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    fn response(url: &str, body: &[u8]) -> FetchedResponse {
        FetchedResponse {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_put_get_roundtrip() {
        let (_dir, store) = store();
        let resp = response("https://portal.example.org/index.html", b"<html>hi</html>");
        store.put("v1-static", &resp).unwrap();

        let back = store.get("v1-static", "https://portal.example.org/index.html").unwrap();
        assert_eq!(back, resp);
        assert!(store.get("v1-static", "https://portal.example.org/other.html").is_none());
    }

    #[test]
    fn test_match_url_searches_all_partitions() {
        let (_dir, store) = store();
        store.put("v1-dynamic", &response("/a", b"a")).unwrap();
        store.put("v1-images", &response("/b", b"b")).unwrap();

        assert_eq!(store.match_url("/a").unwrap().body, b"a");
        assert_eq!(store.match_url("/b").unwrap().body, b"b");
        assert!(store.match_url("/c").is_none());
    }

    #[test]
    fn test_entry_keys_distinguish_similar_urls() {
        let long_a = format!("/assets/{}/a.png", "x".repeat(60));
        let long_b = format!("/assets/{}/b.png", "x".repeat(60));
        assert_ne!(CacheStore::entry_key(&long_a), CacheStore::entry_key(&long_b));
        // Stable across calls
        assert_eq!(CacheStore::entry_key(&long_a), CacheStore::entry_key(&long_a));
    }

    #[test]
    fn test_partition_listing_and_deletion() {
        let (_dir, store) = store();
        store.put("v1-static", &response("/a", b"a")).unwrap();
        store.put("v1-dynamic", &response("/b", b"b")).unwrap();
        assert_eq!(store.list_partitions().unwrap(), vec!["v1-dynamic", "v1-static"]);

        store.delete_partition("v1-static").unwrap();
        assert_eq!(store.list_partitions().unwrap(), vec!["v1-dynamic"]);

        store.clear_all().unwrap();
        assert!(store.list_partitions().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_meta_reads_as_miss() {
        let (_dir, store) = store();
        let resp = response("/page.html", b"body");
        store.put("v1-dynamic", &resp).unwrap();
        std::fs::write(store.meta_path("v1-dynamic", "/page.html"), "garbage").unwrap();
        assert!(store.get("v1-dynamic", "/page.html").is_none());
    }
}
