use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// A route handler that responds with `200 OK` while the server is running.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
