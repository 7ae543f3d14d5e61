//! Content cache and synchronization core for a clinic-site catalog.
//!
//! The crate keeps three independent in-memory caches (doctors, news,
//! services) fresh within a fixed TTL, deduplicates concurrent fetches,
//! fans updates out to live subscribers, and survives reloads through a
//! size-bounded snapshot. Doctors and services are owned by a remote data
//! backend; news lives entirely in a persistent local store.
//!
//! UI layers interact through [`ContentHub`]: read (`get_*`), mutate
//! (`add_*` / `update_*` / `delete_*`) and observe (`subscribe_*`).

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod hub;
pub mod models;
pub mod store;

pub use cache::{PersistOutcome, SnapshotStore, Subscription};
pub use config::{CacheTuning, Config};
pub use error::{Error, Result, ShapeError};
pub use hub::{CacheStatus, ContentHub};
pub use models::EntityKind;
pub use store::NewsStore;
