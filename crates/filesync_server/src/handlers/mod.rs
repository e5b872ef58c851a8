pub mod admin;
pub mod api;
pub mod client;

pub use admin::admin_routes;
pub use api::api_routes;
pub use client::client_routes;

use crate::auth::AuthExtractor;
use crate::db::FileRecord;
use crate::sync::SyncEngine;
use axum::{
    Extension, Router,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

/// Success envelope: `{"success": true, "data": ...}`
///
/// Errors use the matching `{"success": false, "error": ...}` shape produced
/// by [`crate::error::SyncError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Catalog record in responses
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: String,
    pub path: String,
    pub name: String,
    pub checksum: String,
    pub size: u64,
    pub mime_type: String,
    pub modified_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            path: record.path,
            name: record.name,
            checksum: record.checksum,
            size: record.size,
            mime_type: record.mime_type,
            modified_at: record.modified_at.to_rfc3339(),
        }
    }
}

/// Response for deletions
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// All routes of the server, without transport layers (CORS, tracing)
pub fn router(engine: Arc<SyncEngine>, auth: AuthExtractor) -> Router {
    Router::new()
        .route("/", get(|| async { "Filesync Server" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", api_routes())
        .nest("/sync", client_routes(engine.clone()))
        .nest("/admin", admin_routes(engine))
        .layer(Extension(auth))
}
