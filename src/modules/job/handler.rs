use axum::{Json, body::Bytes, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use super::dto::RunSyncResponse;
use super::service::JobService;
use crate::state::AppState;

/// Run one job synchronously and return its output, like a serverless
/// host's local `runsync` endpoint. The body is parsed here so that bad JSON
/// still gets a structured `{ok: false, error}` output.
pub async fn run_sync(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let id = Uuid::new_v4().to_string();
    info!(request_id = %id, "📦 Received job over local API");

    let output = JobService::handle_raw(&state, &body).await;

    (
        StatusCode::OK,
        Json(RunSyncResponse {
            id,
            status: "COMPLETED".to_string(),
            output,
        }),
    )
}
