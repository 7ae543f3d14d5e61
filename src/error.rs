//! Error taxonomy for the cache core.
//!
//! Backend/transport failures and shape failures are deliberately distinct:
//! a backend failure degrades subscribers to an empty collection before it is
//! re-raised, while a shape failure is fatal for that fetch attempt and never
//! reaches subscribers at all. Snapshot-write faults never surface here; they
//! are absorbed inside `cache::snapshot`.

use crate::models::EntityKind;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport or API failure talking to the remote backend.
  #[error("backend request failed: {0}")]
  Backend(String),

  /// The backend answered, but with something other than the expected shape.
  #[error(transparent)]
  Shape(#[from] ShapeError),

  /// Persistent local store failure (news).
  #[error("local store error: {0}")]
  Store(#[from] rusqlite::Error),

  #[error("configuration error: {0}")]
  Config(String),
}

/// Structured shape-validation failure.
///
/// `MissingFields` carries `kind[index].field` entries rather than bailing on
/// the first offender, so a malformed backend response is diagnosable in one
/// pass.
#[derive(Debug, Error)]
pub enum ShapeError {
  #[error("{kind} response is not a list")]
  NotAList { kind: EntityKind },

  #[error("{kind} response failed validation: missing {}", fields.join(", "))]
  MissingFields {
    kind: EntityKind,
    fields: Vec<String>,
  },

  #[error("{kind} element could not be decoded: {message}")]
  BadElement { kind: EntityKind, message: String },
}

impl Error {
  pub fn is_backend(&self) -> bool {
    matches!(self, Error::Backend(_))
  }

  pub fn is_shape(&self) -> bool {
    matches!(self, Error::Shape(_))
  }
}
