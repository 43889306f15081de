//! HTTP routes for the attendance pipeline.
//!
//! Thin surface only: request shaping (defaults for blank assignment name and
//! missing points), one call into the orchestrator, and error-kind to
//! status-code mapping. All pipeline semantics live in `rollmark-pipeline`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use rollmark_core::{AttendanceError, AttendanceRequest};
use rollmark_pipeline::AttendancePipeline;

/// Shared application state for route handlers.
pub struct AppState {
    pub pipeline: AttendancePipeline,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/attendance/mark", post(mark_attendance))
        .with_state(state)
}

/// Wire shape of a mark-attendance request. Name and points are optional and
/// default the way the original capture client defaulted them.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceBody {
    pub access_token: String,
    pub course_id: String,
    pub images: Vec<String>,
    #[serde(default)]
    pub assignment_name: Option<String>,
    #[serde(default)]
    pub points_possible: Option<f64>,
}

impl MarkAttendanceBody {
    fn into_request(self) -> AttendanceRequest {
        let assignment_name = self
            .assignment_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Attendance - {}", Local::now().format("%Y-%m-%d")));
        AttendanceRequest {
            access_token: self.access_token,
            course_id: self.course_id,
            images: self.images,
            assignment_name,
            points_possible: self.points_possible.unwrap_or(1.0),
        }
    }
}

/// Status code for each error kind. `NoMatches` never reaches this mapping:
/// it is a normal report, not an error.
fn status_for(error: &AttendanceError) -> StatusCode {
    match error {
        AttendanceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        AttendanceError::InvalidImageEncoding(_) => StatusCode::BAD_REQUEST,
        AttendanceError::ProvisioningFailed(_)
        | AttendanceError::RosterFetchFailed(_)
        | AttendanceError::RecognitionServiceError(_)
        | AttendanceError::GradeSubmissionFailed(_) => StatusCode::BAD_GATEWAY,
        AttendanceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "rollmark",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run one attendance pipeline for the caller.
async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MarkAttendanceBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request = body.into_request();
    match state.pipeline.run(&request).await {
        Ok(report) => Ok(Json(serde_json::to_value(report).unwrap_or_else(
            |e| json!({ "success": false, "message": format!("report encoding failed: {e}") }),
        ))),
        Err(error) => {
            warn!("[Gateway] Pipeline run failed: {} ({})", error, error.kind());
            Err((
                status_for(&error),
                Json(json!({
                    "success": false,
                    "message": error.to_string(),
                    "kind": error.kind(),
                })),
            ))
        }
    }
}
