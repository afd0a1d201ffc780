//! End-to-end tests for the cardioscope server.
//!
//! Each test:
//! 1. Builds the app state against the bundled classifier artifact
//! 2. Drives the router with in-process requests
//! 3. Verifies the rendered page or JSON response

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use cardioscope_core::{ServerConfig, FIELDS, VALIDATION_MESSAGE};
use cardioscope_model::Predictor;
use cardioscope_server::{api, pages, AppState};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Path of the classifier artifact bundled with the repository.
const BUNDLED_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../saved_models/heart_disease_model.json"
);

/// Build a router backed by the bundled artifact.
fn build_app() -> Router {
    let config = ServerConfig {
        model_path: BUNDLED_MODEL.to_string(),
        ..ServerConfig::default()
    };
    let predictor = Predictor::load(&config.model_path).unwrap();
    let state = Arc::new(AppState { config, predictor });

    Router::new()
        .route("/", get(pages::index_handler))
        .route("/predict", post(pages::predict_handler))
        .route("/api/v1/predict", post(api::predict_api_handler))
        .route("/health", get(api::health_handler))
        .with_state(state)
}

/// Urlencoded form body with every field at its default, plus overrides.
fn form_body(overrides: &[(&str, &str)]) -> String {
    FIELDS
        .iter()
        .map(|field| {
            let value = overrides
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| field.default.to_string());
            format!("{}={}", field.name, value)
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn post_form(app: Router, body: String) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// The high-risk regression vector recorded against the bundled artifact.
fn high_risk_overrides() -> Vec<(&'static str, &'static str)> {
    vec![
        ("age", "65"),
        ("cp", "3"),
        ("trestbps", "180"),
        ("chol", "300"),
        ("fbs", "1"),
        ("restecg", "2"),
        ("thalach", "100"),
        ("exang", "1"),
        ("oldpeak", "4"),
        ("slope", "0"),
        ("ca", "3"),
        ("thal", "2"),
    ]
}

// ---------------------------------------------------------------------------
// Form surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_form_page_lists_every_field() {
    let app = build_app();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    for field in &FIELDS {
        assert!(html.contains(&format!("name=\"{}\"", field.name)));
    }
}

#[tokio::test]
async fn test_submitting_defaults_renders_negative_card() {
    let app = build_app();
    let (status, html) = post_form(app, form_body(&[])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("result-card negative"));
    assert!(html.contains("The person does not have heart disease"));
}

#[tokio::test]
async fn test_submitting_high_risk_vector_renders_positive_card() {
    let app = build_app();
    let (status, html) = post_form(app, form_body(&high_risk_overrides())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("result-card positive"));
    assert!(html.contains("The person has heart disease"));
}

#[tokio::test]
async fn test_non_numeric_field_renders_generic_validation_card() {
    let app = build_app();
    let (status, html) = post_form(app, form_body(&[("age", "abc")])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(VALIDATION_MESSAGE));
    assert!(!html.contains("result-card positive"));
    assert!(!html.contains("result-card negative"));
}

#[tokio::test]
async fn test_missing_field_renders_generic_validation_card() {
    let app = build_app();
    let body = form_body(&[])
        .split('&')
        .filter(|pair| !pair.starts_with("chol="))
        .collect::<Vec<_>>()
        .join("&");
    let (status, html) = post_form(app, body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(VALIDATION_MESSAGE));
}

#[tokio::test]
async fn test_submission_is_stateless() {
    // Two identical submissions produce identical verdicts, and the page
    // rendered after an error is a usable blank form again.
    let app = build_app();
    let (_, first) = post_form(app.clone(), form_body(&[])).await;
    let (_, second) = post_form(app.clone(), form_body(&[])).await;
    assert_eq!(first, second);

    let (status, html) = post_form(app, form_body(&[("age", "abc")])).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<form"));
}

// ---------------------------------------------------------------------------
// JSON surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_api_predict_moderate_case_is_negative() {
    let app = build_app();
    let body = json!({
        "age": 45, "sex": 1, "cp": 2, "trestbps": 130, "chol": 250, "fbs": 0,
        "restecg": 1, "thalach": 160, "exang": 0, "oldpeak": 1.5, "slope": 2,
        "ca": 0, "thal": 2,
    });
    let (status, json) = post_json(app, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verdict"], "negative");
    assert_eq!(json["message"], "The person does not have heart disease");
}

#[tokio::test]
async fn test_api_predict_high_risk_is_positive() {
    let app = build_app();
    let body = json!({
        "age": 65, "sex": 1, "cp": 3, "trestbps": 180, "chol": 300, "fbs": 1,
        "restecg": 2, "thalach": 100, "exang": 1, "oldpeak": 4.0, "slope": 0,
        "ca": 3, "thal": 2,
    });
    let (status, json) = post_json(app, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["verdict"], "positive");
}

#[tokio::test]
async fn test_api_missing_field_is_unprocessable() {
    let app = build_app();
    let (status, json) = post_json(app, json!({ "age": 45 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["message"], VALIDATION_MESSAGE);
}

#[tokio::test]
async fn test_api_malformed_body_is_unprocessable() {
    let app = build_app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["message"], VALIDATION_MESSAGE);
}

#[tokio::test]
async fn test_health_reports_model_loaded() {
    let app = build_app();
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["model"]["loaded"].as_bool().unwrap());
}
