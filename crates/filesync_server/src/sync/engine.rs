use crate::db::{ClientInfo, FileRecord, FolderInfo, FolderSummary, SyncRepo};
use crate::error::{SyncError, SyncResult};
use crate::storage::{ContentStore, FileContent, Upload};
use axum::body::Bytes;
use filesync_core::{ManifestEntry, SyncPlan, compute_sync_plan, normalize_name, validate_manifest};
use futures::Stream;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Folder, client and file operations behind the HTTP handlers
pub struct SyncEngine {
    repo: Arc<SyncRepo>,
    store: ContentStore,
}

impl SyncEngine {
    pub fn new(repo: Arc<SyncRepo>, store: ContentStore) -> Self {
        Self { repo, store }
    }

    /// Largest accepted upload in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.store.max_upload_bytes()
    }

    // ===== Folders (admin) =====

    pub fn create_folder(&self, name: &str) -> SyncResult<FolderInfo> {
        let name = normalize_name("Folder name", name)?;
        let folder = self.repo.create_folder(&name)?;
        info!("Created folder {} ({})", folder.id, folder.name);
        Ok(folder)
    }

    pub fn list_folders(&self) -> SyncResult<Vec<FolderSummary>> {
        Ok(self.repo.list_folders()?)
    }

    pub fn get_folder(&self, folder_id: &str) -> SyncResult<FolderInfo> {
        self.repo
            .get_folder(folder_id)?
            .ok_or(SyncError::NotFound("Folder"))
    }

    pub fn rename_folder(&self, folder_id: &str, name: &str) -> SyncResult<FolderInfo> {
        let name = normalize_name("Folder name", name)?;
        if !self.repo.rename_folder(folder_id, &name)? {
            return Err(SyncError::NotFound("Folder"));
        }
        info!("Renamed folder {} to {}", folder_id, name);
        self.get_folder(folder_id)
    }

    /// Issue a new access token; the previous one stops working immediately
    pub fn regenerate_token(&self, folder_id: &str) -> SyncResult<String> {
        let token = self
            .repo
            .regenerate_token(folder_id)?
            .ok_or(SyncError::NotFound("Folder"))?;
        info!("Rotated access token of folder {}", folder_id);
        Ok(token)
    }

    /// Delete a folder with its clients, catalog and stored content
    pub async fn delete_folder(&self, folder_id: &str) -> SyncResult<()> {
        if !self.repo.delete_folder(folder_id)? {
            return Err(SyncError::NotFound("Folder"));
        }
        self.store.remove_folder_content(folder_id).await?;
        info!("Deleted folder {}", folder_id);
        Ok(())
    }

    // ===== Clients =====

    /// Register a device for a folder and return its client record
    pub fn register_client(&self, folder: &FolderInfo, device_name: &str) -> SyncResult<ClientInfo> {
        let device_name = normalize_name("Device name", device_name)?;
        let client = self
            .repo
            .create_client(&folder.id, &device_name)?
            .ok_or(SyncError::NotFound("Folder"))?;
        info!(
            "Registered client {} ({}) for folder {}",
            client.id, client.device_name, folder.id
        );
        Ok(client)
    }

    pub fn list_clients(&self, folder_id: &str) -> SyncResult<Vec<ClientInfo>> {
        self.get_folder(folder_id)?;
        Ok(self.repo.list_clients(folder_id)?)
    }

    pub fn delete_client(&self, client_id: &str) -> SyncResult<()> {
        if !self.repo.delete_client(client_id)? {
            return Err(SyncError::NotFound("Client"));
        }
        info!("Deleted client {}", client_id);
        Ok(())
    }

    // ===== Sync =====

    /// Compare a client's manifest with the current catalog.
    ///
    /// The catalog is read fresh on every call. Recording the client's last
    /// sync time is best effort and never fails the request.
    pub fn status(
        &self,
        folder: &FolderInfo,
        client_id: &str,
        manifest: Vec<ManifestEntry>,
    ) -> SyncResult<SyncPlan> {
        match self.repo.get_client(client_id)? {
            Some(client) if client.folder_id == folder.id => {}
            _ => return Err(SyncError::NotFound("Client")),
        }

        let manifest = validate_manifest(manifest)?;
        let catalog = self.repo.catalog_entries(&folder.id)?;
        let plan = compute_sync_plan(&catalog, &manifest);

        match self.repo.touch_last_sync(client_id) {
            Ok(true) => {}
            Ok(false) => warn!("Client {} vanished before its sync time was recorded", client_id),
            Err(e) => warn!("Failed to record sync time for client {}: {}", client_id, e),
        }

        debug!(
            "Status for client {} in folder {}: {} to upload, {} to download",
            client_id,
            folder.id,
            plan.to_upload.len(),
            plan.to_download.len()
        );
        Ok(plan)
    }

    pub fn list_files(&self, folder_id: &str) -> SyncResult<Vec<FileRecord>> {
        self.store.list_files(folder_id)
    }

    /// Admin view of a folder's catalog
    pub fn folder_files(&self, folder_id: &str) -> SyncResult<Vec<FileRecord>> {
        self.get_folder(folder_id)?;
        self.store.list_files(folder_id)
    }

    pub async fn upload<S, E>(
        &self,
        folder: &FolderInfo,
        upload: Upload<'_>,
        body: S,
    ) -> SyncResult<FileRecord>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        self.store.upload_stream(folder, upload, body).await
    }

    pub async fn download(&self, folder: &FolderInfo, file_id: &str) -> SyncResult<FileContent> {
        self.store.get_file_data(folder, file_id).await
    }

    pub async fn delete_file(&self, folder: &FolderInfo, path: &str) -> SyncResult<bool> {
        self.store.delete_file(folder, path).await
    }
}
