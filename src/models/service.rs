use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// A priced service, owned by the remote backend.
///
/// `price` stays `Option` so a backend row without one still decodes and is
/// rejected by validation; after a batch passes validation every cached
/// service carries `Some(price)`. Non-negativity is enforced by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub category: String,
  /// Price in integer currency units.
  #[serde(default)]
  pub price: Option<u32>,
}

impl Record for Service {
  fn kind() -> EntityKind {
    EntityKind::Services
  }

  fn id(&self) -> &str {
    &self.id
  }

  fn missing_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.id.is_empty() {
      missing.push("id");
    }
    if self.name.is_empty() {
      missing.push("name");
    }
    if self.price.is_none() {
      missing.push("price");
    }
    missing
  }
}

/// Payload for creating a service; the backend assigns the identifier.
#[derive(Debug, Clone, Serialize)]
pub struct NewService {
  pub name: String,
  pub category: String,
  pub price: u32,
}

/// Partial update; only present fields are sent to the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServicePatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<u32>,
}
