//! Bounded in-process memo for [`detect_layout_metadata`].
//!
//! Keys are a SHA-1 of the template label plus the first 10 000 characters of the text, so
//! two résumés sharing a long prefix share an entry. Eviction is FIFO by insertion order.
//! Each [`LayoutCache`] is independent; the server holds one in `AppState`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::layout::detector::{detect_layout_metadata, LayoutMetadata};
use crate::layout::template::TemplateChoice;

pub const DEFAULT_LAYOUT_CACHE_CAPACITY: usize = 200;
const KEY_PREFIX_CHARS: usize = 10_000;

#[derive(Default)]
struct Entries {
    map: HashMap<String, LayoutMetadata>,
    order: VecDeque<String>,
}

pub struct LayoutCache {
    capacity: usize,
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
}

/// Hex SHA-1 of `"{template label or none}|{text prefix}"`.
pub fn cache_key(text: &str, template: Option<TemplateChoice>) -> String {
    let label = template.map(TemplateChoice::label).unwrap_or("none");
    let prefix: String = text.chars().take(KEY_PREFIX_CHARS).collect();
    let digest = Sha1::digest(format!("{label}|{prefix}").as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

impl LayoutCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached metadata for `(text, template)`, detecting and storing it on a miss.
    ///
    /// Detection runs outside the lock; two racing misses for the same key both detect and
    /// the second insert is a no-op.
    pub fn get_or_detect(&self, text: &str, template: Option<TemplateChoice>) -> LayoutMetadata {
        let key = cache_key(text, template);

        if let Some(hit) = self.lock().map.get(&key).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %&key[..8], "Layout cache hit");
            return hit;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let metadata = detect_layout_metadata(text, template);
        self.insert(key, metadata.clone());
        metadata
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: self.lock().map.len(),
        }
    }

    fn insert(&self, key: String, metadata: LayoutMetadata) {
        let mut entries = self.lock();
        if entries.map.contains_key(&key) {
            return;
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!(key = %&oldest[..8], "Evicted layout cache entry");
        }
        entries.order.push_back(key.clone());
        entries.map.insert(key, metadata);
    }

    // A panic mid-insert leaves the map usable; keep serving from it.
    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_LAYOUT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_depends_on_template_and_prefix_only() {
        let base = "Experience\nAcme";
        assert_eq!(cache_key(base, None), cache_key(base, None));
        assert_ne!(cache_key(base, None), cache_key(base, Some(TemplateChoice::MinimalAts)));
        assert_eq!(cache_key(base, None).len(), 40);

        let long_a = format!("{}tail A", "x".repeat(KEY_PREFIX_CHARS));
        let long_b = format!("{}tail B", "x".repeat(KEY_PREFIX_CHARS));
        assert_eq!(cache_key(&long_a, None), cache_key(&long_b, None));
    }

    #[test]
    fn test_hit_returns_identical_metadata() {
        let cache = LayoutCache::new(4);
        let first = cache.get_or_detect("SKILLS\nRust", None);
        let second = cache.get_or_detect("SKILLS\nRust", None);
        assert_eq!(first, second);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, len: 1 });
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = LayoutCache::new(2);
        cache.get_or_detect("one", None);
        cache.get_or_detect("two", None);
        // Re-reading "one" does not refresh its position.
        cache.get_or_detect("one", None);
        cache.get_or_detect("three", None);

        assert_eq!(cache.stats().len, 2);
        cache.get_or_detect("two", None);
        assert_eq!(cache.stats().hits, 2);
        cache.get_or_detect("one", None);
        assert_eq!(cache.stats().hits, 2, "oldest entry should have been evicted");
    }

    #[test]
    fn test_caches_are_isolated() {
        let a = LayoutCache::new(4);
        let b = LayoutCache::new(4);
        a.get_or_detect("shared", None);
        b.get_or_detect("shared", None);
        assert_eq!(a.stats().misses, 1);
        assert_eq!(b.stats().misses, 1);
        assert_eq!(b.stats().hits, 0);
    }
}
