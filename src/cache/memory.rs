//! Per-type in-memory cache with a fixed freshness window.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

struct Slot<T> {
  items: Vec<T>,
  fetched_at: Option<DateTime<Utc>>,
}

/// Latest fetched collection for one entity type plus its last-fetch stamp.
///
/// Reads and writes take a short-lived mutex and never suspend, so the
/// check-then-replace step stays atomic under the multithreaded runtime.
pub struct MemoryCache<T> {
  state: Mutex<Slot<T>>,
  ttl: Duration,
}

impl<T: Clone> MemoryCache<T> {
  pub fn new(ttl_secs: u64) -> Self {
    Self {
      state: Mutex::new(Slot {
        items: Vec::new(),
        fetched_at: None,
      }),
      ttl: Duration::seconds(ttl_secs as i64),
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Slot<T>> {
    // A poisoned lock only means a panic elsewhere; the slot itself is
    // always in a consistent state, so recover it.
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// True iff the last successful fetch is younger than the TTL.
  /// An empty-but-fetched collection counts as fresh; a never-fetched one
  /// does not.
  pub fn is_fresh(&self) -> bool {
    match self.lock().fetched_at {
      Some(at) => Utc::now() - at < self.ttl,
      None => false,
    }
  }

  /// Current collection, possibly empty, possibly stale. No side effects.
  pub fn read(&self) -> Vec<T> {
    self.lock().items.clone()
  }

  /// Replace the collection and stamp it as fetched now.
  pub fn write(&self, items: Vec<T>) {
    let mut slot = self.lock();
    slot.items = items;
    slot.fetched_at = Some(Utc::now());
  }

  /// Drop the collection and the stamp, forcing the next read path to fetch.
  pub fn invalidate(&self) {
    let mut slot = self.lock();
    slot.items.clear();
    slot.fetched_at = None;
  }

  /// Seconds since the last successful fetch, if any.
  pub fn age_secs(&self) -> Option<i64> {
    self
      .lock()
      .fetched_at
      .map(|at| (Utc::now() - at).num_seconds())
  }

  #[cfg(test)]
  pub(crate) fn backdate(&self, secs: i64) {
    let mut slot = self.lock();
    if let Some(at) = slot.fetched_at {
      slot.fetched_at = Some(at - Duration::seconds(secs));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn never_fetched_is_not_fresh() {
    let cache: MemoryCache<u32> = MemoryCache::new(60);
    assert!(!cache.is_fresh());
    assert!(cache.read().is_empty());
    assert_eq!(cache.age_secs(), None);
  }

  #[test]
  fn write_makes_fresh_even_when_empty() {
    let cache: MemoryCache<u32> = MemoryCache::new(60);
    cache.write(Vec::new());
    assert!(cache.is_fresh());
    assert!(cache.read().is_empty());
  }

  #[test]
  fn freshness_expires_after_ttl() {
    let cache = MemoryCache::new(60);
    cache.write(vec![1, 2, 3]);
    assert!(cache.is_fresh());

    cache.backdate(61);
    assert!(!cache.is_fresh());
    // Stale data is still served as-is.
    assert_eq!(cache.read(), vec![1, 2, 3]);
  }

  #[test]
  fn invalidate_clears_items_and_stamp() {
    let cache = MemoryCache::new(60);
    cache.write(vec![1]);
    cache.invalidate();
    assert!(!cache.is_fresh());
    assert!(cache.read().is_empty());
    assert_eq!(cache.age_secs(), None);
  }
}
