use axum::response::Json;
use serde_json::json;

/// Liveness probe.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Auth**: none
///
/// Always answers `{"status": "pong"}` with 200 and touches no store, so it
/// keeps working while the database is down.
///
/// ```bash
/// curl http://localhost:8080/ping
/// ```
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "pong" }))
}
