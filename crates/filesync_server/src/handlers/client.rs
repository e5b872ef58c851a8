use super::{ApiResponse, DeleteResponse, FileResponse};
use crate::auth::FolderAuth;
use crate::error::{SyncError, SyncResult};
use crate::storage::Upload;
use crate::sync::SyncEngine;
use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use filesync_core::{ManifestEntry, SyncPlan};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for folder client handlers
#[derive(Clone)]
pub struct ClientState {
    pub engine: Arc<SyncEngine>,
}

/// Folder info for clients (never includes the token)
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub device_name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub client_id: String,
    pub folder_id: String,
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub client_id: String,
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Display name; defaults to the last path segment
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub path: String,
    pub checksum: String,
    pub size: u64,
}

/// Create folder client routes
pub fn client_routes(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/folder", get(get_folder))
        .route("/register", post(register))
        .route("/status", post(status))
        .route("/files", get(list_files))
        .route("/files/{*path}", put(upload_file).delete(delete_file))
        .route("/download/{file_id}", get(download_file))
        .with_state(ClientState { engine })
}

/// GET /sync/folder - The folder the token belongs to
async fn get_folder(FolderAuth(folder): FolderAuth) -> ApiResponse<FolderResponse> {
    ApiResponse::ok(FolderResponse {
        id: folder.id,
        name: folder.name,
    })
}

/// POST /sync/register - Register this device as a client of the folder
async fn register(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, SyncError>,
) -> SyncResult<impl IntoResponse> {
    let client = state.engine.register_client(&folder, &body.device_name)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(RegisterResponse {
            client_id: client.id,
            folder_id: client.folder_id,
            device_name: client.device_name,
        }),
    ))
}

/// POST /sync/status - Diff the client's manifest against the catalog
async fn status(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
    WithRejection(Json(body), _): WithRejection<Json<StatusRequest>, SyncError>,
) -> SyncResult<ApiResponse<SyncPlan>> {
    let plan = state.engine.status(&folder, &body.client_id, body.files)?;
    Ok(ApiResponse::ok(plan))
}

/// GET /sync/files - The folder's catalog
async fn list_files(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
) -> SyncResult<ApiResponse<Vec<FileResponse>>> {
    let files = state.engine.list_files(&folder.id)?;
    Ok(ApiResponse::ok(files.into_iter().map(FileResponse::from).collect()))
}

/// PUT /sync/files/{*path} - Store the raw request body at `path`
async fn upload_file(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
    Path(path): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Body,
) -> SyncResult<ApiResponse<UploadResponse>> {
    // Refuse early when the declared length is already too large
    let limit = state.engine.max_upload_bytes();
    if let Some(size) = content_length(&headers).filter(|size| *size > limit) {
        return Err(SyncError::Capacity { size, limit });
    }

    let upload = Upload {
        path: &path,
        display_name: query.name.as_deref(),
        mime_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    };
    let record = state
        .engine
        .upload(&folder, upload, body.into_data_stream())
        .await?;

    Ok(ApiResponse::ok(UploadResponse {
        id: record.id,
        path: record.path,
        checksum: record.checksum,
        size: record.size,
    }))
}

/// DELETE /sync/files/{*path} - Remove `path` from the folder
async fn delete_file(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
    Path(path): Path<String>,
) -> SyncResult<ApiResponse<DeleteResponse>> {
    let deleted = state.engine.delete_file(&folder, &path).await?;
    Ok(ApiResponse::ok(DeleteResponse { deleted }))
}

/// GET /sync/download/{file_id} - Raw file bytes
async fn download_file(
    State(state): State<ClientState>,
    FolderAuth(folder): FolderAuth,
    Path(file_id): Path<String>,
) -> SyncResult<Response> {
    let content = state.engine.download(&folder, &file_id).await?;
    let record = content.record;

    let content_type = HeaderValue::from_str(&record.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(crate::storage::DEFAULT_MIME_TYPE));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        ascii_filename(&record.name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let etag = HeaderValue::from_str(&format!("\"{}\"", record.checksum))
        .unwrap_or_else(|_| HeaderValue::from_static("\"\""));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::ETAG, etag),
        ],
        content.bytes,
    )
        .into_response())
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Filename safe to quote in a Content-Disposition header
fn ascii_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
