use axum::{Router, response::Json, routing::get};
use serde::Serialize;

/// Server status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
}

/// Create public API routes
pub fn api_routes() -> Router {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status - Get server status (public endpoint)
async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
