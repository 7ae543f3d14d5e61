//! Caching primitives shared by every entity type:
//! - TTL-stamped in-memory collections (`memory`)
//! - subscriber fan-out with copy-on-notify and panic isolation (`broker`)
//! - bounded reload-survival snapshots (`snapshot`)

mod broker;
mod memory;
mod snapshot;

pub use broker::{SubscriberSet, Subscription};
pub use memory::MemoryCache;
pub use snapshot::{PersistOutcome, SnapshotStore};
