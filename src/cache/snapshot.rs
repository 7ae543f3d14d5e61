//! Bounded reload-survival snapshots.
//!
//! Snapshots are opportunistic: a skipped or failed write leaves the prior
//! persisted value untouched and never raises into the caller. The store only
//! ever reports what happened, for observability.

use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// What became of one `persist` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
  /// Written in full.
  Stored { bytes: usize },
  /// Serialized size exceeded the ceiling; nothing was written.
  SkippedTooLarge { bytes: usize },
  /// The storage medium reported it is full; nothing usable was written.
  StorageFull,
  /// Any other serialization or I/O fault; nothing usable was written.
  Failed,
}

impl PersistOutcome {
  pub fn is_stored(&self) -> bool {
    matches!(self, PersistOutcome::Stored { .. })
  }
}

/// File-backed JSON snapshot store with a per-file size ceiling.
pub struct SnapshotStore {
  dir: PathBuf,
  ceiling_bytes: usize,
}

impl SnapshotStore {
  pub fn new(dir: PathBuf, ceiling_bytes: usize) -> Self {
    Self { dir, ceiling_bytes }
  }

  fn path(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{}.json", name))
  }

  /// Serialize and write `value` under `name`, unless it exceeds the ceiling.
  ///
  /// The write goes to a temp file first and is renamed into place, so a
  /// mid-write fault can never leave a partially written snapshot behind.
  pub fn persist<T: Serialize>(&self, name: &str, value: &T) -> PersistOutcome {
    let contents = match serde_json::to_vec(value) {
      Ok(contents) => contents,
      Err(e) => {
        warn!(snapshot = name, error = %e, "snapshot serialization failed; write skipped");
        return PersistOutcome::Failed;
      }
    };

    if contents.len() > self.ceiling_bytes {
      warn!(
        snapshot = name,
        bytes = contents.len(),
        ceiling = self.ceiling_bytes,
        "snapshot exceeds size ceiling; write skipped"
      );
      return PersistOutcome::SkippedTooLarge {
        bytes: contents.len(),
      };
    }

    if let Err(e) = std::fs::create_dir_all(&self.dir) {
      warn!(snapshot = name, error = %e, "snapshot directory unavailable; write skipped");
      return PersistOutcome::Failed;
    }

    let tmp = self.dir.join(format!("{}.json.tmp", name));
    let result = std::fs::write(&tmp, &contents).and_then(|_| std::fs::rename(&tmp, self.path(name)));

    match result {
      Ok(()) => {
        debug!(snapshot = name, bytes = contents.len(), "snapshot stored");
        PersistOutcome::Stored {
          bytes: contents.len(),
        }
      }
      Err(e) if e.kind() == ErrorKind::StorageFull => {
        let _ = std::fs::remove_file(&tmp);
        warn!(snapshot = name, "storage full; snapshot write skipped");
        PersistOutcome::StorageFull
      }
      Err(e) => {
        let _ = std::fs::remove_file(&tmp);
        warn!(snapshot = name, error = %e, "snapshot write failed; prior value kept");
        PersistOutcome::Failed
      }
    }
  }

  /// Read the snapshot stored under `name`. Missing or unreadable snapshots
  /// yield `None`; this never raises.
  pub fn retrieve<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
    let path = self.path(name);
    if !path.exists() {
      return None;
    }

    let contents = match std::fs::read(&path) {
      Ok(contents) => contents,
      Err(e) => {
        debug!(snapshot = name, error = %e, "snapshot unreadable");
        return None;
      }
    };

    match serde_json::from_slice(&contents) {
      Ok(value) => Some(value),
      Err(e) => {
        debug!(snapshot = name, error = %e, "snapshot corrupt; ignoring");
        None
      }
    }
  }

  /// Remove the snapshot stored under `name`, if any.
  pub fn clear(&self, name: &str) {
    if let Err(e) = std::fs::remove_file(self.path(name)) {
      if e.kind() != ErrorKind::NotFound {
        debug!(snapshot = name, error = %e, "snapshot removal failed");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn store(ceiling: usize) -> (TempDir, SnapshotStore) {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().to_path_buf(), ceiling);
    (dir, store)
  }

  #[test]
  fn round_trip() {
    let (_dir, store) = store(4 * 1024 * 1024);
    assert!(store.persist("news", &vec!["a", "b"]).is_stored());
    let back: Vec<String> = store.retrieve("news").unwrap();
    assert_eq!(back, vec!["a", "b"]);
  }

  #[test]
  fn missing_snapshot_is_none_not_error() {
    let (_dir, store) = store(1024);
    assert!(store.retrieve::<Vec<String>>("absent").is_none());
  }

  #[test]
  fn oversized_write_is_skipped_and_prior_value_kept() {
    let (_dir, store) = store(64);
    assert!(store.persist("news", &"small").is_stored());

    let big = "x".repeat(1024);
    let outcome = store.persist("news", &big);
    assert!(matches!(outcome, PersistOutcome::SkippedTooLarge { .. }));

    let kept: String = store.retrieve("news").unwrap();
    assert_eq!(kept, "small");
  }

  #[test]
  fn corrupt_snapshot_reads_as_none() {
    let (dir, store) = store(1024);
    std::fs::write(dir.path().join("news.json"), b"{not json").unwrap();
    assert!(store.retrieve::<Vec<String>>("news").is_none());
  }

  #[test]
  fn clear_removes_the_file_and_tolerates_absence() {
    let (_dir, store) = store(1024);
    assert!(store.persist("news", &"v").is_stored());
    store.clear("news");
    assert!(store.retrieve::<String>("news").is_none());
    store.clear("news");
  }
}
