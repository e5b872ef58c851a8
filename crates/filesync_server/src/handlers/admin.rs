use super::{ApiResponse, DeleteResponse, FileResponse};
use crate::auth::RequireAdmin;
use crate::db::{ClientInfo, FolderInfo, FolderSummary};
use crate::error::{SyncError, SyncResult};
use crate::sync::SyncEngine;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for admin handlers
#[derive(Clone)]
pub struct AdminState {
    pub engine: Arc<SyncEngine>,
}

/// Request body for creating or renaming a folder
#[derive(Debug, Deserialize)]
pub struct FolderNameRequest {
    pub name: String,
}

/// Folder details, including the access token to hand to clients
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    pub access_token: String,
    pub created_at: String,
}

impl From<FolderInfo> for FolderResponse {
    fn from(folder: FolderInfo) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            access_token: folder.access_token,
            created_at: folder.created_at.to_rfc3339(),
        }
    }
}

/// Folder row in listings
#[derive(Debug, Serialize)]
pub struct FolderListItem {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub client_count: u64,
    pub file_count: u64,
}

impl From<FolderSummary> for FolderListItem {
    fn from(summary: FolderSummary) -> Self {
        Self {
            id: summary.folder.id,
            name: summary.folder.name,
            created_at: summary.folder.created_at.to_rfc3339(),
            client_count: summary.client_count,
            file_count: summary.file_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: String,
    pub folder_id: String,
    pub device_name: String,
    pub created_at: String,
    pub last_sync_at: Option<String>,
}

impl From<ClientInfo> for ClientResponse {
    fn from(client: ClientInfo) -> Self {
        Self {
            id: client.id,
            folder_id: client.folder_id,
            device_name: client.device_name,
            created_at: client.created_at.to_rfc3339(),
            last_sync_at: client.last_sync_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create admin routes
pub fn admin_routes(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/folders", get(list_folders).post(create_folder))
        .route(
            "/folders/{folder_id}",
            get(get_folder).patch(rename_folder).delete(delete_folder),
        )
        .route("/folders/{folder_id}/token", post(regenerate_token))
        .route("/folders/{folder_id}/clients", get(list_clients))
        .route("/folders/{folder_id}/files", get(list_files))
        .route("/clients/{client_id}", delete(delete_client))
        .with_state(AdminState { engine })
}

/// GET /admin/folders - All folders with client and file counts
async fn list_folders(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
) -> SyncResult<ApiResponse<Vec<FolderListItem>>> {
    let folders = state.engine.list_folders()?;
    Ok(ApiResponse::ok(
        folders.into_iter().map(FolderListItem::from).collect(),
    ))
}

/// POST /admin/folders - Create a folder
async fn create_folder(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    WithRejection(Json(body), _): WithRejection<Json<FolderNameRequest>, SyncError>,
) -> SyncResult<impl IntoResponse> {
    let folder = state.engine.create_folder(&body.name)?;
    Ok((StatusCode::CREATED, ApiResponse::ok(FolderResponse::from(folder))))
}

/// GET /admin/folders/{folder_id}
async fn get_folder(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
) -> SyncResult<ApiResponse<FolderResponse>> {
    let folder = state.engine.get_folder(&folder_id)?;
    Ok(ApiResponse::ok(folder.into()))
}

/// PATCH /admin/folders/{folder_id} - Rename a folder
async fn rename_folder(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<FolderNameRequest>, SyncError>,
) -> SyncResult<ApiResponse<FolderResponse>> {
    let folder = state.engine.rename_folder(&folder_id, &body.name)?;
    Ok(ApiResponse::ok(folder.into()))
}

/// DELETE /admin/folders/{folder_id} - Delete a folder and everything in it
async fn delete_folder(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
) -> SyncResult<ApiResponse<DeleteResponse>> {
    state.engine.delete_folder(&folder_id).await?;
    Ok(ApiResponse::ok(DeleteResponse { deleted: true }))
}

/// POST /admin/folders/{folder_id}/token - Rotate the access token
async fn regenerate_token(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
) -> SyncResult<ApiResponse<TokenResponse>> {
    let access_token = state.engine.regenerate_token(&folder_id)?;
    Ok(ApiResponse::ok(TokenResponse { access_token }))
}

/// GET /admin/folders/{folder_id}/clients
async fn list_clients(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
) -> SyncResult<ApiResponse<Vec<ClientResponse>>> {
    let clients = state.engine.list_clients(&folder_id)?;
    Ok(ApiResponse::ok(
        clients.into_iter().map(ClientResponse::from).collect(),
    ))
}

/// GET /admin/folders/{folder_id}/files
async fn list_files(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(folder_id): Path<String>,
) -> SyncResult<ApiResponse<Vec<FileResponse>>> {
    let files = state.engine.folder_files(&folder_id)?;
    Ok(ApiResponse::ok(files.into_iter().map(FileResponse::from).collect()))
}

/// DELETE /admin/clients/{client_id}
async fn delete_client(
    State(state): State<AdminState>,
    _admin: RequireAdmin,
    Path(client_id): Path<String>,
) -> SyncResult<ApiResponse<DeleteResponse>> {
    state.engine.delete_client(&client_id)?;
    Ok(ApiResponse::ok(DeleteResponse { deleted: true }))
}
