//! HttpBackend wire tests: request shape, auth headers, body/error mapping.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carecache::backend::{Backend, HttpBackend};
use carecache::config::BackendConfig;
use carecache::error::Error;
use carecache::models::{DoctorPatch, NewService};

async fn backend_for(server: &MockServer) -> HttpBackend {
  HttpBackend::new(
    &BackendConfig {
      url: server.uri(),
    },
    "test-key".into(),
  )
  .unwrap()
}

#[tokio::test]
async fn list_doctors_requests_id_ascending_with_auth_headers() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/rest/v1/doctors"))
    .and(query_param("select", "*"))
    .and(query_param("order", "id.asc"))
    .and(header("apikey", "test-key"))
    .and(header("Authorization", "Bearer test-key"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "d1", "name": "Dr. Ives", "specialization": "Cardiology", "experience": "12 years"},
      {"id": "d2", "name": "Dr. Pratt", "specialization": "Neurology", "experience": "4 years", "image": null}
    ])))
    .mount(&server)
    .await;

  let doctors = backend_for(&server).await.list_doctors().await.unwrap();
  assert_eq!(doctors.len(), 2);
  assert_eq!(doctors[0].id, "d1");
  assert_eq!(doctors[1].specialization, "Neurology");
  assert_eq!(doctors[1].image, None);
}

#[tokio::test]
async fn null_body_counts_as_empty_table() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/rest/v1/services"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
    .mount(&server)
    .await;

  let services = backend_for(&server).await.list_services().await.unwrap();
  assert!(services.is_empty());
}

#[tokio::test]
async fn non_array_body_is_a_shape_error() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/rest/v1/doctors"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "oops"})))
    .mount(&server)
    .await;

  let err = backend_for(&server).await.list_doctors().await.unwrap_err();
  assert!(err.is_shape());
}

#[tokio::test]
async fn server_failure_is_a_backend_error() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/rest/v1/doctors"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let err = backend_for(&server).await.list_doctors().await.unwrap_err();
  assert!(err.is_backend());
}

#[tokio::test]
async fn insert_service_posts_and_decodes_the_created_row() {
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/rest/v1/services"))
    .and(header("Prefer", "return=representation"))
    .respond_with(ResponseTemplate::new(201).set_body_json(json!([
      {"id": "s9", "name": "Checkup", "category": "general", "price": 120}
    ])))
    .mount(&server)
    .await;

  let created = backend_for(&server)
    .await
    .insert_service(&NewService {
      name: "Checkup".into(),
      category: "general".into(),
      price: 120,
    })
    .await
    .unwrap();

  assert_eq!(created.id, "s9");
  assert_eq!(created.price, Some(120));
}

#[tokio::test]
async fn update_doctor_patches_by_id_filter() {
  let server = MockServer::start().await;

  Mock::given(method("PATCH"))
    .and(path("/rest/v1/doctors"))
    .and(query_param("id", "eq.d1"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "d1", "name": "New Name", "specialization": "Cardiology", "experience": "12 years"}
    ])))
    .mount(&server)
    .await;

  let patch = DoctorPatch {
    name: Some("New Name".into()),
    ..DoctorPatch::default()
  };
  let updated = backend_for(&server)
    .await
    .update_doctor("d1", &patch)
    .await
    .unwrap();
  assert_eq!(updated.name, "New Name");
}

#[tokio::test]
async fn update_matching_no_row_is_a_backend_error() {
  let server = MockServer::start().await;

  Mock::given(method("PATCH"))
    .and(path("/rest/v1/doctors"))
    .and(query_param("id", "eq.missing"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .mount(&server)
    .await;

  let err = backend_for(&server)
    .await
    .update_doctor("missing", &DoctorPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Backend(_)));
}

#[tokio::test]
async fn delete_doctor_checks_status_only() {
  let server = MockServer::start().await;

  Mock::given(method("DELETE"))
    .and(path("/rest/v1/doctors"))
    .and(query_param("id", "eq.d1"))
    .respond_with(ResponseTemplate::new(204))
    .mount(&server)
    .await;

  backend_for(&server).await.delete_doctor("d1").await.unwrap();
}
