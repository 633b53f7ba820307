//! Allocation counters
//!
//! Bumped by the default backends on every malloc / realloc / calloc / free
//! call. Relaxed atomics: no ordering with the allocation itself and no
//! consistency between the four counters. Diagnostics only.

use std::sync::atomic::{AtomicI64, Ordering};

static MALLOC_COUNT: AtomicI64 = AtomicI64::new(0);
static REALLOC_COUNT: AtomicI64 = AtomicI64::new(0);
static CALLOC_COUNT: AtomicI64 = AtomicI64::new(0);
static FREE_COUNT: AtomicI64 = AtomicI64::new(0);

/// Snapshot of the four counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocCounters {
    pub malloc: i64,
    pub realloc: i64,
    pub calloc: i64,
    pub free: i64,
}

impl AllocCounters {
    /// Allocations not yet matched by a free (advisory)
    pub fn outstanding(&self) -> i64 {
        self.malloc + self.calloc - self.free
    }
}

/// Read all counters
pub fn alloc_counters() -> AllocCounters {
    AllocCounters {
        malloc: MALLOC_COUNT.load(Ordering::Relaxed),
        realloc: REALLOC_COUNT.load(Ordering::Relaxed),
        calloc: CALLOC_COUNT.load(Ordering::Relaxed),
        free: FREE_COUNT.load(Ordering::Relaxed),
    }
}

/// Zero all counters
pub fn reset_alloc_counters() {
    MALLOC_COUNT.store(0, Ordering::Relaxed);
    REALLOC_COUNT.store(0, Ordering::Relaxed);
    CALLOC_COUNT.store(0, Ordering::Relaxed);
    FREE_COUNT.store(0, Ordering::Relaxed);
}

#[inline]
pub fn count_malloc() {
    MALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn count_realloc() {
    REALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn count_calloc() {
    CALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub fn count_free() {
    FREE_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_increase() {
        let before = alloc_counters();
        count_malloc();
        count_calloc();
        count_realloc();
        count_free();
        let after = alloc_counters();

        assert!(after.malloc > before.malloc);
        assert!(after.calloc > before.calloc);
        assert!(after.realloc > before.realloc);
        assert!(after.free > before.free);
    }

    #[test]
    fn test_outstanding() {
        let c = AllocCounters { malloc: 5, realloc: 2, calloc: 1, free: 4 };
        assert_eq!(c.outstanding(), 2);
    }
}
