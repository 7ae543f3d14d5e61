//! REST rows client for the remote data backend.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use super::Backend;
use crate::config::BackendConfig;
use crate::error::{Error, Result, ShapeError};
use crate::models::{
  Doctor, DoctorPatch, EntityKind, NewDoctor, NewService, Record, Service, ServicePatch,
};

/// Backend client over a per-table rows API
/// (`GET/POST /rest/v1/{table}`, `PATCH/DELETE /rest/v1/{table}?id=eq.{id}`),
/// authenticated with an api-key header pair.
#[derive(Clone)]
pub struct HttpBackend {
  client: reqwest::Client,
  base: Url,
  api_key: String,
}

impl HttpBackend {
  pub fn new(config: &BackendConfig, api_key: String) -> Result<Self> {
    let base = Url::parse(&config.url)
      .map_err(|e| Error::Config(format!("invalid backend url {}: {}", config.url, e)))?;

    Ok(Self {
      client: reqwest::Client::new(),
      base,
      api_key,
    })
  }

  fn table_url(&self, table: &str) -> Result<Url> {
    let path = format!("{}/rest/v1/{}", self.base.as_str().trim_end_matches('/'), table);
    Url::parse(&path).map_err(|e| Error::Config(format!("invalid table url for {}: {}", table, e)))
  }

  fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req
      .header("apikey", &self.api_key)
      .header("Authorization", format!("Bearer {}", self.api_key))
  }

  async fn read_body(table: &str, resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Backend(format!(
        "{} request failed with status {}",
        table, status
      )));
    }

    resp
      .json::<Value>()
      .await
      .map_err(|e| Error::Backend(format!("{} response body unreadable: {}", table, e)))
  }

  /// List a table ordered by identifier ascending.
  ///
  /// A `null` body counts as an empty table; anything other than a list is a
  /// fatal shape error for the attempt.
  async fn list_rows<T: Record>(&self, kind: EntityKind) -> Result<Vec<T>> {
    let table = kind.as_str();
    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("order", "id.asc");

    let resp = self
      .authed(self.client.get(url))
      .send()
      .await
      .map_err(|e| Error::Backend(format!("{} request failed: {}", table, e)))?;

    match Self::read_body(table, resp).await? {
      Value::Null => Ok(Vec::new()),
      Value::Array(rows) => rows
        .into_iter()
        .map(|row| {
          serde_json::from_value(row).map_err(|e| {
            Error::Shape(ShapeError::BadElement {
              kind,
              message: e.to_string(),
            })
          })
        })
        .collect(),
      _ => Err(Error::Shape(ShapeError::NotAList { kind })),
    }
  }

  async fn insert_row<T: Record>(&self, kind: EntityKind, body: &impl Serialize) -> Result<T> {
    let table = kind.as_str();
    let resp = self
      .authed(self.client.post(self.table_url(table)?))
      .header("Prefer", "return=representation")
      .json(body)
      .send()
      .await
      .map_err(|e| Error::Backend(format!("{} insert failed: {}", table, e)))?;

    decode_row(kind, Self::read_body(table, resp).await?)
  }

  async fn update_row<T: Record>(
    &self,
    kind: EntityKind,
    id: &str,
    patch: &impl Serialize,
  ) -> Result<T> {
    let table = kind.as_str();
    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", id));

    let resp = self
      .authed(self.client.patch(url))
      .header("Prefer", "return=representation")
      .json(patch)
      .send()
      .await
      .map_err(|e| Error::Backend(format!("{} update failed: {}", table, e)))?;

    decode_row(kind, Self::read_body(table, resp).await?)
  }

  async fn delete_row(&self, kind: EntityKind, id: &str) -> Result<()> {
    let table = kind.as_str();
    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", id));

    let resp = self
      .authed(self.client.delete(url))
      .send()
      .await
      .map_err(|e| Error::Backend(format!("{} delete failed: {}", table, e)))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Backend(format!(
        "{} delete failed with status {}",
        table, status
      )));
    }
    Ok(())
  }
}

/// Decode a single written row from a write response. The rows API answers
/// with a one-element list; an empty list means the id matched nothing.
fn decode_row<T: DeserializeOwned>(kind: EntityKind, body: Value) -> Result<T> {
  let row = match body {
    Value::Array(mut rows) => {
      if rows.is_empty() {
        return Err(Error::Backend(format!("{} write matched no row", kind)));
      }
      rows.remove(0)
    }
    row @ Value::Object(_) => row,
    _ => return Err(Error::Shape(ShapeError::NotAList { kind })),
  };

  serde_json::from_value(row).map_err(|e| {
    Error::Shape(ShapeError::BadElement {
      kind,
      message: e.to_string(),
    })
  })
}

#[async_trait]
impl Backend for HttpBackend {
  async fn list_doctors(&self) -> Result<Vec<Doctor>> {
    self.list_rows(EntityKind::Doctors).await
  }

  async fn insert_doctor(&self, new: &NewDoctor) -> Result<Doctor> {
    self.insert_row(EntityKind::Doctors, new).await
  }

  async fn update_doctor(&self, id: &str, patch: &DoctorPatch) -> Result<Doctor> {
    self.update_row(EntityKind::Doctors, id, patch).await
  }

  async fn delete_doctor(&self, id: &str) -> Result<()> {
    self.delete_row(EntityKind::Doctors, id).await
  }

  async fn list_services(&self) -> Result<Vec<Service>> {
    self.list_rows(EntityKind::Services).await
  }

  async fn insert_service(&self, new: &NewService) -> Result<Service> {
    self.insert_row(EntityKind::Services, new).await
  }

  async fn update_service(&self, id: &str, patch: &ServicePatch) -> Result<Service> {
    self.update_row(EntityKind::Services, id, patch).await
  }

  async fn delete_service(&self, id: &str) -> Result<()> {
    self.delete_row(EntityKind::Services, id).await
  }
}
