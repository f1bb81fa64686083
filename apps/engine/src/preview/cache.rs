//! Time-boxed memo of structure-preview responses.
//!
//! Keyed by SHA-256 of `job text :: first 12 000 chars of CV text`. Expired entries are
//! dropped lazily on read and swept on insert. Uses `tokio::time::Instant` so tests can
//! drive expiry with a paused clock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::time::Instant;
use tracing::debug;

use crate::preview::builder::StructurePreview;

pub const DEFAULT_PREVIEW_TTL: Duration = Duration::from_secs(15 * 60);
const KEY_CV_CHARS: usize = 12_000;

pub struct PreviewCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, StructurePreview)>>,
}

pub fn preview_cache_key(cv_text: &str, job_text: &str) -> String {
    let cv_prefix: String = cv_text.chars().take(KEY_CV_CHARS).collect();
    let digest = Sha256::digest(format!("{job_text}::{cv_prefix}").as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

impl PreviewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<StructurePreview> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            None => return None,
            Some((expires_at, _)) => Instant::now() > *expires_at,
        };
        if expired {
            entries.remove(key);
            debug!("Preview cache entry expired");
            return None;
        }
        entries.get(key).map(|(_, preview)| preview.clone())
    }

    pub fn insert(&self, key: String, preview: StructurePreview) {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, (expires_at, _)| *expires_at >= now);
        entries.insert(key, (now + self.ttl, preview));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, StructurePreview)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_uses_cv_prefix_and_job() {
        let long_a = format!("{}A", "x".repeat(KEY_CV_CHARS));
        let long_b = format!("{}B", "x".repeat(KEY_CV_CHARS));
        assert_eq!(preview_cache_key(&long_a, "job"), preview_cache_key(&long_b, "job"));
        assert_ne!(preview_cache_key("cv", "job 1"), preview_cache_key("cv", "job 2"));
        assert_eq!(preview_cache_key("cv", "job").len(), 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = PreviewCache::new(Duration::from_secs(60));
        cache.insert("k".into(), StructurePreview::default());
        assert!(cache.get("k").is_some());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_entries() {
        let cache = PreviewCache::new(Duration::from_secs(10));
        cache.insert("old".into(), StructurePreview::default());
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.insert("new".into(), StructurePreview::default());
        assert_eq!(cache.len(), 1);
    }
}
