//! Subscriber registry with copy-on-notify fan-out.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

type Callback<T> = dyn Fn(Vec<T>) + Send + Sync;

struct Registry<T> {
  callbacks: Mutex<HashMap<u64, Arc<Callback<T>>>>,
  next_id: AtomicU64,
}

/// Registered callbacks for one entity type.
///
/// Every notification hands each callback its own clone of the data, so one
/// subscriber mutating its copy can never bleed into another's view. A
/// panicking callback is caught and logged without aborting the fan-out.
pub struct SubscriberSet<T> {
  registry: Arc<Registry<T>>,
}

impl<T: Clone + Send + Sync + 'static> SubscriberSet<T> {
  pub fn new() -> Self {
    Self {
      registry: Arc::new(Registry {
        callbacks: Mutex::new(HashMap::new()),
        next_id: AtomicU64::new(0),
      }),
    }
  }

  /// Register a callback; the returned handle removes it on
  /// [`Subscription::unsubscribe`] or drop.
  pub fn subscribe(&self, callback: impl Fn(Vec<T>) + Send + Sync + 'static) -> Subscription {
    let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
    lock(&self.registry.callbacks).insert(id, Arc::new(callback));

    let registry = Arc::downgrade(&self.registry);
    Subscription {
      cancel: Some(Box::new(move || {
        if let Some(registry) = Weak::upgrade(&registry) {
          lock(&registry.callbacks).remove(&id);
        }
      })),
    }
  }

  /// Invoke every registered callback with an independent copy of `items`.
  ///
  /// Iterates a snapshot of the registry taken up front, so callbacks may
  /// subscribe or unsubscribe reentrantly without deadlocking.
  pub fn notify(&self, items: &[T]) {
    let snapshot: Vec<(u64, Arc<Callback<T>>)> = lock(&self.registry.callbacks)
      .iter()
      .map(|(id, cb)| (*id, Arc::clone(cb)))
      .collect();

    for (id, callback) in snapshot {
      let copy = items.to_vec();
      if catch_unwind(AssertUnwindSafe(|| callback(copy))).is_err() {
        warn!(subscriber = id, "subscriber callback panicked; continuing fan-out");
      }
    }
  }

  pub fn len(&self) -> usize {
    lock(&self.registry.callbacks).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn lock<K, V>(mutex: &Mutex<HashMap<K, V>>) -> std::sync::MutexGuard<'_, HashMap<K, V>> {
  mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Handle for one registered callback.
///
/// `unsubscribe` removes exactly that callback; repeated calls are no-ops.
/// Dropping the handle unsubscribes as well, so a forgotten handle cannot
/// leak its callback.
pub struct Subscription {
  cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
  pub fn unsubscribe(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      cancel();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.unsubscribe();
  }
}
