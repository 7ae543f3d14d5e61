use serde::{Deserialize, Serialize};

use super::{EntityKind, Record};

/// A doctor profile, owned by the remote backend.
///
/// Required fields default to empty strings on deserialization so a partial
/// backend row still decodes and is then rejected by validation with a
/// field-level report, instead of a blind decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub specialization: String,
  /// Free-text years-of-experience label, e.g. "15 years".
  #[serde(default)]
  pub experience: String,
  pub education: Option<String>,
  pub description: Option<String>,
  pub image: Option<String>,
}

impl Record for Doctor {
  fn kind() -> EntityKind {
    EntityKind::Doctors
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
    if self.specialization.is_empty() {
      missing.push("specialization");
    }
    missing
  }
}

/// Payload for creating a doctor; the backend assigns the identifier.
#[derive(Debug, Clone, Serialize)]
pub struct NewDoctor {
  pub name: String,
  pub specialization: String,
  pub experience: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub education: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

/// Partial update; only present fields are sent to the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub specialization: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub experience: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub education: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}
