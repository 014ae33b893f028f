//! End-to-end behaviour of the assembled application.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::body::Body;
use axum::http::Request;
use posgrado_testing::{TestApp, fixtures};
use serde_json::{Value, json};

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

async fn create_teacher(app: &TestApp, dni: &str) -> i64 {
    let response = app
        .post(&app.api("/docentes"), &to_json(&fixtures::teacher(dni)))
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 201, "{:?}", response.json());
    response.json()["id"].as_i64().unwrap()
}

async fn create_program(app: &TestApp) -> i64 {
    let response = app
        .post(&app.api("/programas"), &to_json(&fixtures::program("Ingeniería de Software")))
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 201, "{:?}", response.json());
    response.json()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn root_is_alive_and_idempotent() {
    let app = TestApp::new().await.unwrap();
    let before = app.database.db.stats();

    for _ in 0..3 {
        let response = app.get("/").await.unwrap();
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(
            response.json(),
            json!({"ok": true, "msg": "API de Posgrado activa."})
        );
    }
    assert_eq!(app.database.db.stats(), before);
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = TestApp::new().await.unwrap();

    let request = Request::builder()
        .uri("/")
        .header("X-Request-ID", "ticket-42")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await.unwrap();
    assert_eq!(response.header("x-request-id"), Some("ticket-42"));

    let response = app.get("/does/not/exist").await.unwrap();
    assert_eq!(response.status.as_u16(), 404);
    assert!(!response.header("x-request-id").unwrap().is_empty());
    assert_eq!(response.json()["type"], "NotFoundError");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = TestApp::new().await.unwrap();

    let request = Request::builder()
        .uri("/")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await.unwrap();

    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(response.header("access-control-allow-credentials"), Some("true"));
}

#[tokio::test]
async fn feature_routers_are_mounted() {
    let app = TestApp::new().await.unwrap();

    let response = app.get("/api/v1/estudiantes/ping").await.unwrap();
    assert_ne!(response.status.as_u16(), 404);
    assert_eq!(response.json(), json!({"status": "ok", "module": "estudiantes"}));

    for path in ["/docentes/ping", "/programas/ping", "/procesos/ping"] {
        let response = app.get(&app.api(path)).await.unwrap();
        assert_eq!(response.status.as_u16(), 200, "{path}");
    }

    let response = app
        .get("/api/v1/stage/designacion_de_jurados/ping")
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.json()["module"], "designacion_de_jurados");

    let response = app.get("/health/ready").await.unwrap();
    assert_eq!(response.json(), json!({"ready": true}));
}

#[tokio::test]
async fn duplicate_dni_is_conflict_without_partial_rows() {
    let app = TestApp::new().await.unwrap();
    create_teacher(&app, "40123456").await;

    let response = app
        .post(&app.api("/docentes"), &to_json(&fixtures::teacher("40123456")))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 409);
    let body = response.json();
    assert_eq!(body["error"], true);
    assert_eq!(body["type"], "DatabaseIntegrityError");
    assert_eq!(body["message"], "Integrity violation in the database.");

    let listed = app.get(&app.api("/docentes")).await.unwrap();
    assert_eq!(listed.json().as_array().unwrap().len(), 1);

    let stats = app.database.db.stats();
    assert_eq!(stats.rolled_back, 1);
    assert_eq!(stats.in_flight(), 0);
}

#[tokio::test]
async fn invalid_input_is_validation_error() {
    let app = TestApp::new().await.unwrap();

    let before = app.database.db.stats();
    let mut payload = to_json(&fixtures::teacher("40123456"));
    payload["dni"] = json!("123");
    let response = app.post(&app.api("/docentes"), &payload).await.unwrap();
    assert_eq!(response.status.as_u16(), 422);
    assert_eq!(response.json()["type"], "ValidationError");

    let mut payload = to_json(&fixtures::program("Ingeniería de Software"));
    payload["name"] = json!("");
    let response = app.post(&app.api("/programas"), &payload).await.unwrap();
    assert_eq!(response.status.as_u16(), 422);

    // Rejected before a session is opened.
    assert_eq!(app.database.db.stats(), before);

    let response = app.get(&app.api("/docentes/abc")).await.unwrap();
    assert_eq!(response.status.as_u16(), 422);

    let response = app.get(&app.api("/docentes/999")).await.unwrap();
    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.json()["type"], "NotFoundError");
}

#[tokio::test]
async fn student_lifecycle() {
    let app = TestApp::new().await.unwrap();
    let program_id = create_program(&app).await;

    let response = app
        .post(
            &app.api("/estudiantes"),
            &to_json(&fixtures::student(program_id, "70111222", "20230001")),
        )
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 201, "{:?}", response.json());
    let student_id = response.json()["personal"]["id"].as_i64().unwrap();

    let response = app
        .patch(
            &app.api(&format!("/estudiantes/{student_id}")),
            &json!({"phone": "955444333", "status_academic": "egresado", "graduation_year": 2025}),
        )
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 200, "{:?}", response.json());

    let profile = app
        .get(&app.api(&format!("/estudiantes/{student_id}")))
        .await
        .unwrap()
        .json();
    assert_eq!(profile["personal"]["phone"], "955444333");
    assert_eq!(profile["academic"][0]["status"], "egresado");

    let listed = app.get(&app.api("/estudiantes")).await.unwrap().json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn process_advances_and_shows_up_in_stage_router() {
    let app = TestApp::new().await.unwrap();
    let program_id = create_program(&app).await;
    let advisor_id = create_teacher(&app, "40999888").await;

    let profile = app
        .post(
            &app.api("/estudiantes"),
            &to_json(&fixtures::student(program_id, "70333444", "20230002")),
        )
        .await
        .unwrap()
        .json();
    let enrollment_id = profile["academic"][0]["id"].as_i64().unwrap();

    let response = app
        .post(
            &app.api("/procesos"),
            &to_json(&fixtures::process(enrollment_id, advisor_id)),
        )
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 201, "{:?}", response.json());
    let process_id = response.json()["id"].as_i64().unwrap();
    assert_eq!(response.json()["current_stage"], "inscripcion");

    let response = app
        .post(&app.api(&format!("/procesos/{process_id}/avanzar")), &json!({}))
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.json()["current_stage"], "turnitin");

    let in_turnitin = app.get("/api/v1/stage/turnitin/procesos").await.unwrap().json();
    assert_eq!(in_turnitin.as_array().unwrap().len(), 1);

    let in_enrollment = app.get("/api/v1/stage/inscripcion/procesos").await.unwrap().json();
    assert!(in_enrollment.as_array().unwrap().is_empty());

    let response = app
        .patch(
            &app.api(&format!("/procesos/{process_id}")),
            &json!({"general_status": "pausado"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 200);

    let response = app
        .post(&app.api(&format!("/procesos/{process_id}/avanzar")), &json!({}))
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 400);
    assert_eq!(response.json()["type"], "AppError");
}

#[tokio::test]
async fn unknown_foreign_key_is_conflict() {
    let app = TestApp::new().await.unwrap();

    let response = app
        .post(
            &app.api("/estudiantes"),
            &to_json(&fixtures::student(4242, "70555666", "20230003")),
        )
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 409);
    let listed = app.get(&app.api("/estudiantes")).await.unwrap().json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_method_on_known_route_uses_error_envelope() {
    let app = TestApp::new().await.unwrap();
    let teacher_id = create_teacher(&app, "40112233").await;

    let uri = app.api(&format!("/docentes/{teacher_id}"));
    let response = app
        .request(axum::http::Method::DELETE, &uri, None)
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 405);
    let body = response.json();
    assert_eq!(body["error"], true);
    assert_eq!(body["type"], "MethodNotAllowedError");
    assert!(response.header("x-request-id").is_some());
}
