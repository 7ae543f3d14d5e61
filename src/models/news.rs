use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// Marker appended to a truncated article body.
pub(crate) const PREVIEW_MARKER: &str = "...";

/// A news article, owned entirely by the persistent local store.
///
/// Identifiers are generated client-side at create time; news never touches
/// the remote backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub content: String,
  /// Free-text category label.
  #[serde(default)]
  pub category: String,
  pub image: Option<String>,
  /// Publication date as an opaque string, e.g. "2026-08-30".
  #[serde(default)]
  pub date: String,
}

impl NewsItem {
  /// Random unique identifier, generated client-side at create time (news is
  /// offline-first and never asks the backend for an id).
  pub fn generate_id() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
  }
}

impl Record for NewsItem {
  fn kind() -> EntityKind {
    EntityKind::News
  }

  fn id(&self) -> &str {
    &self.id
  }

  fn missing_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.id.is_empty() {
      missing.push("id");
    }
    if self.title.is_empty() {
      missing.push("title");
    }
    if self.content.is_empty() {
      missing.push("content");
    }
    missing
  }

  /// Truncate the article body to `content_preview` characters plus a marker.
  /// This is a display-size reduction for the in-memory cache, distinct from
  /// [`NewsSnapshot`] which drops `content` entirely.
  fn optimized(mut self, content_preview: usize) -> Self {
    if self.content.chars().count() > content_preview {
      let mut truncated: String = self.content.chars().take(content_preview).collect();
      truncated.push_str(PREVIEW_MARKER);
      self.content = truncated;
    }
    self
  }
}

/// Reduced projection of [`NewsItem`] persisted to the bounded snapshot.
/// Never carries the article body, so large articles cannot bloat the
/// size-constrained snapshot medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSnapshot {
  pub id: String,
  pub title: String,
  pub category: String,
  pub image: Option<String>,
  pub date: String,
}

impl From<&NewsItem> for NewsSnapshot {
  fn from(item: &NewsItem) -> Self {
    Self {
      id: item.id.clone(),
      title: item.title.clone(),
      category: item.category.clone(),
      image: item.image.clone(),
      date: item.date.clone(),
    }
  }
}

/// Payload for creating a news article. The identifier and, when absent, the
/// publication date are filled in by the core at create time.
#[derive(Debug, Clone)]
pub struct NewNews {
  pub title: String,
  pub content: String,
  pub category: String,
  pub image: Option<String>,
  pub date: Option<String>,
}
