//! JSON API handlers.
//!
//! A machine-readable surface next to the HTML form: `POST /api/v1/predict`
//! scores a JSON body carrying the thirteen named fields, and `GET /health`
//! reports liveness. Error responses follow the same policy as the form —
//! every validation failure collapses to one generic message.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cardioscope_core::{
    CardioError, FeatureVector, Result, Verdict, FEATURE_COUNT, FEATURE_ORDER, VALIDATION_MESSAGE,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::pages::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Successful prediction response.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// The binary verdict.
    pub verdict: Verdict,
    /// User-facing result line.
    pub message: &'static str,
}

/// API error response body.
#[derive(Debug, Serialize)]
struct ApiError {
    error: ApiErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// Build a JSON error response.
fn api_error(status: StatusCode, message: &str) -> Response {
    let body = ApiError {
        error: ApiErrorDetail {
            message: message.to_string(),
            error_type: "validation_error".to_string(),
        },
    };
    (status, Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Coerce a JSON object into a feature vector, in [`FEATURE_ORDER`].
///
/// Numbers are taken as-is; strings are parsed, mirroring the form surface.
/// Anything else — a missing field, a boolean, a null — is a validation
/// failure.
fn vector_from_json(body: &Value) -> Result<FeatureVector> {
    let mut row = [0.0; FEATURE_COUNT];
    for (slot, name) in row.iter_mut().zip(FEATURE_ORDER.iter()) {
        let value = body.get(*name).ok_or(CardioError::ValidationFailed)?;
        *slot = match value {
            Value::Number(n) => n.as_f64().ok_or(CardioError::ValidationFailed)?,
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| CardioError::ValidationFailed)?,
            _ => return Err(CardioError::ValidationFailed),
        };
    }
    Ok(FeatureVector::from_row(row))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/v1/predict` — score a JSON submission.
pub async fn predict_api_handler(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let verdict = match body {
        Ok(Json(body)) => vector_from_json(&body).and_then(|v| state.predictor.predict(&v)),
        Err(rejection) => {
            warn!(%rejection, "Malformed JSON body");
            Err(CardioError::ValidationFailed)
        }
    };

    match verdict {
        Ok(verdict) => (
            StatusCode::OK,
            Json(PredictResponse {
                verdict,
                message: verdict.message(),
            }),
        )
            .into_response(),
        Err(err) => {
            warn!(%err, "Rejected API submission");
            api_error(StatusCode::UNPROCESSABLE_ENTITY, VALIDATION_MESSAGE)
        }
    }
}

/// `GET /health` — liveness check.
///
/// The classifier is loaded before the listener binds, so a serving process
/// always reports the model as loaded.
pub async fn health_handler(State(_state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "model": { "loaded": true },
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
