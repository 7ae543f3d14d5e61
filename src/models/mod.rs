//! Entity records and the validation seam shared by the fetch pipeline.

mod doctor;
mod news;
mod service;

pub use doctor::{Doctor, DoctorPatch, NewDoctor};
pub use news::{NewNews, NewsItem, NewsSnapshot};
pub use service::{NewService, Service, ServicePatch};

use crate::error::ShapeError;
use serde::{de::DeserializeOwned, Serialize};

/// The three entity types the cache core manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  Doctors,
  News,
  Services,
}

impl EntityKind {
  pub const ALL: [EntityKind; 3] = [EntityKind::Doctors, EntityKind::News, EntityKind::Services];

  /// Stable lowercase name, used for backend tables, snapshot files and log
  /// fields alike.
  pub fn as_str(&self) -> &'static str {
    match self {
      EntityKind::Doctors => "doctors",
      EntityKind::News => "news",
      EntityKind::Services => "services",
    }
  }
}

impl std::fmt::Display for EntityKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Trait for entities that flow through the cache pipeline.
///
/// Implementors provide a stable identifier (the diffing/lookup key), a
/// structured required-field check, and optionally a size optimization applied
/// before the record enters the in-memory cache.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Which cache this record belongs to.
  fn kind() -> EntityKind;

  /// Unique identifier within the entity type, stable across fetches.
  fn id(&self) -> &str;

  /// Names of required fields that are absent or blank on this record.
  fn missing_fields(&self) -> Vec<&'static str>;

  /// Shrink the record for caching. `content_preview` is the maximum number
  /// of characters a long text field may keep; types without long text ignore
  /// it.
  fn optimized(self, content_preview: usize) -> Self {
    let _ = content_preview;
    self
  }
}

/// Validate every element of a fetched batch, collecting all offenders.
///
/// Returns `kind[index].field` entries rather than bailing on the first
/// missing field, so one malformed response is diagnosable in a single pass.
pub fn validate_batch<T: Record>(items: &[T]) -> Result<(), ShapeError> {
  let mut missing = Vec::new();
  for (index, item) in items.iter().enumerate() {
    for field in item.missing_fields() {
      missing.push(format!("{}[{}].{}", T::kind(), index, field));
    }
  }

  if missing.is_empty() {
    Ok(())
  } else {
    Err(ShapeError::MissingFields {
      kind: T::kind(),
      fields: missing,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_batch_accepts_well_formed_records() {
    let doctors = vec![Doctor {
      id: "d1".into(),
      name: "Dr. Ives".into(),
      specialization: "Cardiology".into(),
      experience: "12 years".into(),
      education: None,
      description: None,
      image: None,
    }];
    assert!(validate_batch(&doctors).is_ok());
  }

  #[test]
  fn validate_batch_reports_every_offender_with_its_index() {
    let doctors = vec![
      Doctor {
        id: "d1".into(),
        name: String::new(),
        specialization: "Cardiology".into(),
        experience: String::new(),
        education: None,
        description: None,
        image: None,
      },
      Doctor {
        id: "d2".into(),
        name: "Dr. Ives".into(),
        specialization: String::new(),
        experience: String::new(),
        education: None,
        description: None,
        image: None,
      },
    ];

    let err = validate_batch(&doctors).unwrap_err();
    match err {
      ShapeError::MissingFields { kind, fields } => {
        assert_eq!(kind, EntityKind::Doctors);
        assert_eq!(fields, vec!["doctors[0].name", "doctors[1].specialization"]);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }
}
