use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks task and pattern cache activity for a searcher
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    // Dispatch metrics
    blocks_dispatched: Arc<AtomicU64>,
    word_tasks_spawned: Arc<AtomicU64>,
    tasks_completed: Arc<AtomicU64>,
    tasks_failed: Arc<AtomicU64>,

    // Cache metrics
    cache_hits: Arc<AtomicU64>,
    cache_misses: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Creates a new SearchMetrics instance
    pub fn new() -> Self {
        Self {
            blocks_dispatched: Arc::new(AtomicU64::new(0)),
            word_tasks_spawned: Arc::new(AtomicU64::new(0)),
            tasks_completed: Arc::new(AtomicU64::new(0)),
            tasks_failed: Arc::new(AtomicU64::new(0)),
            cache_hits: Arc::new(AtomicU64::new(0)),
            cache_misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a block handed to the outer dispatcher
    pub fn record_block_dispatch(&self) {
        self.blocks_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Records word tasks spawned by the inner dispatcher
    pub fn record_word_tasks(&self, count: u64) {
        let total = self.word_tasks_spawned.fetch_add(count, Ordering::Relaxed) + count;
        debug!("Spawned {} word tasks, total: {}", count, total);
    }

    /// Records the outcome of a finished task
    pub fn record_task_outcome(&self, success: bool) {
        if success {
            self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records pattern cache lookup
    pub fn record_cache_operation(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            blocks_dispatched: self.blocks_dispatched.load(Ordering::Relaxed),
            word_tasks_spawned: self.word_tasks_spawned.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Blocks dispatched: {}\n\
             Word tasks spawned: {}\n\
             Tasks completed/failed: {}/{}\n\
             Pattern cache hits/misses: {}/{}",
            stats.blocks_dispatched,
            stats.word_tasks_spawned,
            stats.tasks_completed,
            stats.tasks_failed,
            stats.cache_hits,
            stats.cache_misses
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of search activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub blocks_dispatched: u64,
    pub word_tasks_spawned: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
