//! The fixtures themselves produce valid, storable payloads.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use posgrado_testing::{TestApp, TestDatabase, fixtures, local_secrets};
use posgrado_secrets::SecretProvider;

#[test]
fn payloads_are_valid() {
    fixtures::teacher("12345678").validate().unwrap();
    fixtures::program("Ciencias de la Computación").validate().unwrap();
    fixtures::student(1, "87654321", "20231234").validate().unwrap();
    fixtures::process(1, 1).validate().unwrap();
}

#[tokio::test]
async fn local_secrets_select_the_local_database() {
    let secrets = local_secrets();
    assert!(secrets.get_secret("SESSION-SECRET-KEY").await.is_ok());
    assert!(secrets.get_secret("DB-HOST").await.is_err());
}

#[tokio::test]
async fn test_database_has_schema() {
    let database = TestDatabase::new().await.unwrap();
    database.db.ping().await.unwrap();
    assert!(database.path().ends_with("posgrado_test.db"));
}

#[tokio::test]
async fn test_app_answers_root() {
    let app = TestApp::new().await.unwrap();
    let response = app.get("/").await.unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.json()["ok"], true);
    assert_eq!(app.api("/docentes"), "/api/v1/docentes");
}
