use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Request counters for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub lists_served: Arc<AtomicU64>,
    pub thumbnails_rendered: Arc<AtomicU64>,
    pub thumb_cache_hits: Arc<AtomicU64>,
    pub files_deleted: Arc<AtomicU64>,
    pub delete_failures: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            lists_served: Arc::new(AtomicU64::new(0)),
            thumbnails_rendered: Arc::new(AtomicU64::new(0)),
            thumb_cache_hits: Arc::new(AtomicU64::new(0)),
            files_deleted: Arc::new(AtomicU64::new(0)),
            delete_failures: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_lists(&self) {
        self.lists_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_thumbnails_rendered(&self) {
        self.thumbnails_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_thumb_cache_hits(&self) {
        self.thumb_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_deleted(&self, count: u64) {
        self.files_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_delete_failures(&self, count: u64) {
        self.delete_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lists_served: self.lists_served.load(Ordering::Relaxed),
            thumbnails_rendered: self.thumbnails_rendered.load(Ordering::Relaxed),
            thumb_cache_hits: self.thumb_cache_hits.load(Ordering::Relaxed),
            files_deleted: self.files_deleted.load(Ordering::Relaxed),
            delete_failures: self.delete_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub lists_served: u64,
    pub thumbnails_rendered: u64,
    pub thumb_cache_hits: u64,
    pub files_deleted: u64,
    pub delete_failures: u64,
    pub uptime_seconds: u64,
}
