//! The content hub: public facade over the caches, the remote backend and
//! the persistent news store.
//!
//! Constructed once at application start-up and injected into UI layers; it
//! clones cheaply (shared internals), so every surface in the process talks
//! to the same caches without a hidden singleton.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::{Backend, HttpBackend};
use crate::cache::{MemoryCache, SnapshotStore, SubscriberSet, Subscription};
use crate::config::{CacheTuning, Config};
use crate::error::Result;
use crate::models::{
  validate_batch, Doctor, DoctorPatch, EntityKind, NewDoctor, NewNews, NewService, NewsItem,
  NewsSnapshot, Record, Service, ServicePatch,
};
use crate::store::NewsStore;

/// Everything the hub keeps per entity type: the TTL'd collection, its
/// subscribers, and a fetch lock serializing reconciliations for the type.
struct Sector<T> {
  cache: MemoryCache<T>,
  subscribers: SubscriberSet<T>,
  fetch_lock: tokio::sync::Mutex<()>,
}

impl<T: Record> Sector<T> {
  fn new(ttl_secs: u64) -> Self {
    Self {
      cache: MemoryCache::new(ttl_secs),
      subscribers: SubscriberSet::new(),
      fetch_lock: tokio::sync::Mutex::new(()),
    }
  }
}

/// Fetch-and-reconcile for one sector.
///
/// In-flight fetches are deduplicated: the fetch lock serializes stale
/// readers, and whoever acquires it second re-checks freshness and returns
/// the just-written cache without touching the backing store again.
///
/// Degradation contract: a failed fetch notifies subscribers with an empty
/// collection ("visibly empty" beats "silently wrong") and then propagates
/// the error; a shape-invalid response raises without caching and without
/// notifying, leaving prior subscriber state intact.
async fn refresh<T, F, Fut>(
  sector: &Sector<T>,
  tuning: &CacheTuning,
  force: bool,
  fetch: F,
) -> Result<(Vec<T>, bool)>
where
  T: Record,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<Vec<T>>>,
{
  if !force && sector.cache.is_fresh() {
    return Ok((sector.cache.read(), false));
  }

  let _guard = sector.fetch_lock.lock().await;

  // A concurrent reconcile may have landed while we waited for the lock.
  if !force && sector.cache.is_fresh() {
    return Ok((sector.cache.read(), false));
  }

  let items = match fetch().await {
    Ok(items) => items,
    Err(e) if e.is_shape() => {
      warn!(kind = %T::kind(), error = %e, "fetch returned malformed data; keeping prior state");
      return Err(e);
    }
    Err(e) => {
      warn!(kind = %T::kind(), error = %e, "fetch failed; degrading subscribers to empty");
      sector.subscribers.notify(&[]);
      return Err(e);
    }
  };

  validate_batch(&items)?;

  let mut items: Vec<T> = items
    .into_iter()
    .map(|item| item.optimized(tuning.content_preview))
    .collect();
  items.truncate(tuning.max_items);

  sector.cache.write(items.clone());
  sector.subscribers.notify(&items);
  debug!(kind = %T::kind(), count = items.len(), "cache reconciled");

  Ok((items, true))
}

struct HubInner {
  backend: Arc<dyn Backend>,
  news_store: Arc<NewsStore>,
  snapshots: SnapshotStore,
  tuning: CacheTuning,
  doctors: Sector<Doctor>,
  news: Sector<NewsItem>,
  services: Sector<Service>,
}

#[derive(Clone)]
pub struct ContentHub {
  inner: Arc<HubInner>,
}

/// Diagnostic view of one cache, for status displays and loading indicators.
#[derive(Debug, Clone)]
pub struct CacheStatus {
  pub kind: EntityKind,
  pub fresh: bool,
  /// Seconds since the last successful fetch, if any.
  pub age_secs: Option<i64>,
  pub subscribers: usize,
}

impl ContentHub {
  pub fn new(
    backend: Arc<dyn Backend>,
    news_store: NewsStore,
    snapshots: SnapshotStore,
    tuning: CacheTuning,
  ) -> Self {
    let ttl = tuning.ttl_secs;
    Self {
      inner: Arc::new(HubInner {
        backend,
        news_store: Arc::new(news_store),
        snapshots,
        tuning,
        doctors: Sector::new(ttl),
        news: Sector::new(ttl),
        services: Sector::new(ttl),
      }),
    }
  }

  /// Build a hub from configuration: HTTP backend (key from the
  /// environment), news database and snapshot directory under the data dir.
  pub fn from_config(config: &Config) -> Result<Self> {
    let key = Config::get_backend_key()?;
    let backend = HttpBackend::new(&config.backend, key)?;
    let data_dir = config.data_dir()?;
    let news_store = NewsStore::open(&data_dir)?;
    let snapshots = SnapshotStore::new(
      data_dir.join("snapshots"),
      config.cache.snapshot_ceiling_bytes,
    );

    Ok(Self::new(
      Arc::new(backend),
      news_store,
      snapshots,
      config.cache.clone(),
    ))
  }

  // ===== Reads =====

  /// Current doctors, fetching from the backend if the cache is stale.
  pub async fn get_doctors(&self) -> Result<Vec<Doctor>> {
    let inner = &self.inner;
    let (items, _) = refresh(&inner.doctors, &inner.tuning, false, || async move {
      inner.backend.list_doctors().await
    })
    .await?;
    Ok(items)
  }

  /// Current services, fetching from the backend if the cache is stale.
  pub async fn get_services(&self) -> Result<Vec<Service>> {
    let inner = &self.inner;
    let (items, _) = refresh(&inner.services, &inner.tuning, false, || async move {
      inner.backend.list_services().await
    })
    .await?;
    Ok(items)
  }

  /// Current news, re-reading the persistent store if the cache is stale.
  pub async fn get_news(&self) -> Result<Vec<NewsItem>> {
    self.refresh_news(false).await
  }

  async fn refresh_news(&self, force: bool) -> Result<Vec<NewsItem>> {
    let inner = &self.inner;
    let store = Arc::clone(&inner.news_store);
    let (items, reconciled) =
      refresh(&inner.news, &inner.tuning, force, || async move { store.list_all() }).await?;

    if reconciled {
      // Reload-survival snapshot: reduced projection only, never the bodies.
      let projection: Vec<NewsSnapshot> = items.iter().map(NewsSnapshot::from).collect();
      inner
        .snapshots
        .persist(EntityKind::News.as_str(), &projection);
    }

    Ok(items)
  }

  /// Last persisted news projection, for an optimistic first paint before
  /// the authoritative read resolves.
  pub fn news_snapshot(&self) -> Option<Vec<NewsSnapshot>> {
    self.inner.snapshots.retrieve(EntityKind::News.as_str())
  }

  // ===== Subscriptions =====

  /// Register a doctors subscriber. A fresh cache (even a fresh-and-empty
  /// one) is replayed synchronously; otherwise a background fetch is spawned
  /// whose outcome notifies every subscriber, including this one.
  pub fn subscribe_doctors(
    &self,
    callback: impl Fn(Vec<Doctor>) + Send + Sync + 'static,
  ) -> Subscription {
    let callback = Arc::new(callback);
    let registered = Arc::clone(&callback);
    let sub = self
      .inner
      .doctors
      .subscribers
      .subscribe(move |items| registered(items));

    if self.inner.doctors.cache.is_fresh() {
      callback(self.inner.doctors.cache.read());
    } else {
      let hub = self.clone();
      tokio::spawn(async move {
        if let Err(e) = hub.get_doctors().await {
          debug!(error = %e, "subscriber-triggered doctors fetch failed");
        }
      });
    }

    sub
  }

  /// Register a services subscriber; same replay/fetch contract as doctors.
  pub fn subscribe_services(
    &self,
    callback: impl Fn(Vec<Service>) + Send + Sync + 'static,
  ) -> Subscription {
    let callback = Arc::new(callback);
    let registered = Arc::clone(&callback);
    let sub = self
      .inner
      .services
      .subscribers
      .subscribe(move |items| registered(items));

    if self.inner.services.cache.is_fresh() {
      callback(self.inner.services.cache.read());
    } else {
      let hub = self.clone();
      tokio::spawn(async move {
        if let Err(e) = hub.get_services().await {
          debug!(error = %e, "subscriber-triggered services fetch failed");
        }
      });
    }

    sub
  }

  /// Register a news subscriber. News is authoritative only in the
  /// persistent store, so subscribing always spawns a forced re-read (the
  /// TTL alone is never trusted); a fresh cache is still replayed
  /// synchronously first so the subscriber has something to paint.
  pub fn subscribe_news(
    &self,
    callback: impl Fn(Vec<NewsItem>) + Send + Sync + 'static,
  ) -> Subscription {
    let callback = Arc::new(callback);
    let registered = Arc::clone(&callback);
    let sub = self
      .inner
      .news
      .subscribers
      .subscribe(move |items| registered(items));

    if self.inner.news.cache.is_fresh() {
      callback(self.inner.news.cache.read());
    }

    let hub = self.clone();
    tokio::spawn(async move {
      if let Err(e) = hub.refresh_news(true).await {
        debug!(error = %e, "subscriber-triggered news read failed");
      }
    });

    sub
  }

  // ===== Mutations =====
  //
  // Each mutation writes to the type's authoritative store, then invalidates
  // the in-memory cache and spawns a background refetch. The mutation's own
  // result is independent of that refetch; a refetch failure degrades
  // subscribers to empty per the pipeline contract. A failed write returns
  // the error with every cache untouched and no notification fired.

  pub async fn add_doctor(&self, new: NewDoctor) -> Result<Doctor> {
    let created = self.inner.backend.insert_doctor(&new).await?;
    self.invalidate_and_refetch(EntityKind::Doctors);
    Ok(created)
  }

  pub async fn update_doctor(&self, id: &str, patch: DoctorPatch) -> Result<Doctor> {
    let updated = self.inner.backend.update_doctor(id, &patch).await?;
    self.invalidate_and_refetch(EntityKind::Doctors);
    Ok(updated)
  }

  pub async fn delete_doctor(&self, id: &str) -> Result<()> {
    self.inner.backend.delete_doctor(id).await?;
    self.invalidate_and_refetch(EntityKind::Doctors);
    Ok(())
  }

  pub async fn add_service(&self, new: NewService) -> Result<Service> {
    let created = self.inner.backend.insert_service(&new).await?;
    self.invalidate_and_refetch(EntityKind::Services);
    Ok(created)
  }

  pub async fn update_service(&self, id: &str, patch: ServicePatch) -> Result<Service> {
    let updated = self.inner.backend.update_service(id, &patch).await?;
    self.invalidate_and_refetch(EntityKind::Services);
    Ok(updated)
  }

  pub async fn delete_service(&self, id: &str) -> Result<()> {
    self.inner.backend.delete_service(id).await?;
    self.invalidate_and_refetch(EntityKind::Services);
    Ok(())
  }

  /// Create a news article in the persistent store, stamping a generated id
  /// and, when absent, today's date.
  pub async fn add_news(&self, new: NewNews) -> Result<NewsItem> {
    let item = NewsItem {
      id: NewsItem::generate_id(),
      title: new.title,
      content: new.content,
      category: new.category,
      image: new.image,
      date: new
        .date
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
    };

    self.inner.news_store.insert(&item)?;
    self.invalidate_and_refetch(EntityKind::News);
    Ok(item)
  }

  pub async fn update_news(&self, item: NewsItem) -> Result<()> {
    self.inner.news_store.update(&item)?;
    self.invalidate_and_refetch(EntityKind::News);
    Ok(())
  }

  pub async fn delete_news(&self, id: &str) -> Result<()> {
    self.inner.news_store.delete_by_id(id)?;
    self.invalidate_and_refetch(EntityKind::News);
    Ok(())
  }

  fn invalidate_and_refetch(&self, kind: EntityKind) {
    match kind {
      EntityKind::Doctors => self.inner.doctors.cache.invalidate(),
      EntityKind::News => self.inner.news.cache.invalidate(),
      EntityKind::Services => self.inner.services.cache.invalidate(),
    }

    let hub = self.clone();
    tokio::spawn(async move {
      let result = match kind {
        EntityKind::Doctors => hub.get_doctors().await.map(|_| ()),
        EntityKind::News => hub.refresh_news(true).await.map(|_| ()),
        EntityKind::Services => hub.get_services().await.map(|_| ()),
      };
      if let Err(e) = result {
        warn!(kind = %kind, error = %e, "post-mutation refetch failed");
      }
    });
  }

  // ===== Diagnostics & maintenance =====

  /// Wipe the in-memory cache and snapshot for one type (or all), then
  /// notify subscribers with empty collections. Used for forced-refresh
  /// scenarios.
  pub fn clear_cache(&self, kind: Option<EntityKind>) {
    let kinds: Vec<EntityKind> = match kind {
      Some(k) => vec![k],
      None => EntityKind::ALL.to_vec(),
    };

    for k in kinds {
      self.inner.snapshots.clear(k.as_str());
      match k {
        EntityKind::Doctors => {
          self.inner.doctors.cache.invalidate();
          self.inner.doctors.subscribers.notify(&[]);
        }
        EntityKind::News => {
          self.inner.news.cache.invalidate();
          self.inner.news.subscribers.notify(&[]);
        }
        EntityKind::Services => {
          self.inner.services.cache.invalidate();
          self.inner.services.subscribers.notify(&[]);
        }
      }
    }
  }

  /// Whether the in-memory cache for `kind` is within its freshness window.
  /// Exposed for diagnostics, e.g. deciding whether to show a loading
  /// indicator.
  pub fn is_memory_cache_valid(&self, kind: EntityKind) -> bool {
    match kind {
      EntityKind::Doctors => self.inner.doctors.cache.is_fresh(),
      EntityKind::News => self.inner.news.cache.is_fresh(),
      EntityKind::Services => self.inner.services.cache.is_fresh(),
    }
  }

  /// Per-type freshness, age and subscriber counts.
  pub fn status(&self) -> Vec<CacheStatus> {
    vec![
      CacheStatus {
        kind: EntityKind::Doctors,
        fresh: self.inner.doctors.cache.is_fresh(),
        age_secs: self.inner.doctors.cache.age_secs(),
        subscribers: self.inner.doctors.subscribers.len(),
      },
      CacheStatus {
        kind: EntityKind::News,
        fresh: self.inner.news.cache.is_fresh(),
        age_secs: self.inner.news.cache.age_secs(),
        subscribers: self.inner.news.subscribers.len(),
      },
      CacheStatus {
        kind: EntityKind::Services,
        fresh: self.inner.services.cache.is_fresh(),
        age_secs: self.inner.services.cache.age_secs(),
        subscribers: self.inner.services.subscribers.len(),
      },
    ]
  }
}
