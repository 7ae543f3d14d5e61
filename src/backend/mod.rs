//! Remote data backend, the authoritative store for doctors and services.
//!
//! The trait is the seam: production code talks to [`HttpBackend`], tests
//! substitute an in-process implementation. Per the wire contract, the
//! presence of a failure is load-bearing, not its shape, so every operation
//! simply resolves to `Ok` or a typed [`crate::error::Error`].

mod http;

pub use http::HttpBackend;

use crate::error::Result;
use crate::models::{Doctor, DoctorPatch, NewDoctor, NewService, Service, ServicePatch};
use async_trait::async_trait;

#[async_trait]
pub trait Backend: Send + Sync {
  /// All doctors, ordered by identifier ascending.
  async fn list_doctors(&self) -> Result<Vec<Doctor>>;

  /// Create a doctor; the backend assigns the identifier.
  async fn insert_doctor(&self, new: &NewDoctor) -> Result<Doctor>;

  /// Apply a partial update to the doctor with `id`.
  async fn update_doctor(&self, id: &str, patch: &DoctorPatch) -> Result<Doctor>;

  async fn delete_doctor(&self, id: &str) -> Result<()>;

  /// All services, ordered by identifier ascending.
  async fn list_services(&self) -> Result<Vec<Service>>;

  /// Create a service; the backend assigns the identifier.
  async fn insert_service(&self, new: &NewService) -> Result<Service>;

  /// Apply a partial update to the service with `id`.
  async fn update_service(&self, id: &str, patch: &ServicePatch) -> Result<Service>;

  async fn delete_service(&self, id: &str) -> Result<()>;
}
