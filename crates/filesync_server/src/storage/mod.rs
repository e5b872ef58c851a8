//! Content store: file bytes on disk plus their catalog records.
//!
//! Every mutation of a `(folder, path)` pair runs under that pair's lock, and
//! every operation that can create or delete a blob also holds the
//! `(folder, checksum)` lock. Lock order is always path, then checksum.

mod blobs;
mod locks;

pub use blobs::{BlobStore, StagedBlob};
pub use locks::KeyedLocks;

use crate::config::Config;
use crate::db::{FileCommit, FileRecord, FileRemoval, FolderInfo, NewFile, SyncRepo};
use crate::error::{SyncError, SyncResult};
use axum::body::Bytes;
use filesync_core::checksum::{ChecksumHasher, sha256_hex};
use filesync_core::path_utils::{file_name, validate_sync_path};
use futures::{Stream, StreamExt, stream};
use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// MIME type used when an upload doesn't declare one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const TOKEN_ROTATED: &str = "folder access token was rotated; re-authenticate";

/// Stored bytes together with the catalog record they belong to
#[derive(Debug, Clone)]
pub struct FileContent {
    pub record: FileRecord,
    pub bytes: Vec<u8>,
}

/// Metadata of an upload as received from a client
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub path: &'a str,
    pub display_name: Option<&'a str>,
    pub mime_type: Option<&'a str>,
}

/// An upload body fully written to a temp file
struct Received {
    staged: StagedBlob,
    checksum: String,
    size: u64,
}

/// A persisted blob the catalog doesn't reference yet.
///
/// Until [`PendingBlob::commit`] runs, dropping it removes the blob unless a
/// record of the folder already points at the checksum. That covers every
/// early return between persist and catalog commit, and the upload future
/// being dropped when the client disconnects.
struct PendingBlob<'a> {
    store: &'a ContentStore,
    folder_id: &'a str,
    checksum: &'a str,
    committed: bool,
}

impl PendingBlob<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PendingBlob<'_> {
    fn drop(&mut self) {
        if self.committed || !self.store.is_unreferenced(self.folder_id, self.checksum) {
            return;
        }
        match self.store.blobs.remove_blocking(self.folder_id, self.checksum) {
            Ok(()) => debug!(
                "Discarded uncommitted blob {} in folder {}",
                self.checksum, self.folder_id
            ),
            Err(e) => warn!(
                "Failed to discard blob {} in folder {}: {}",
                self.checksum, self.folder_id, e
            ),
        }
    }
}

/// Persists file bytes and keeps the catalog in step with them
pub struct ContentStore {
    repo: Arc<SyncRepo>,
    blobs: BlobStore,
    path_locks: KeyedLocks<(String, String)>,
    blob_locks: KeyedLocks<(String, String)>,
    max_upload_bytes: u64,
    upload_timeout: Duration,
}

impl ContentStore {
    /// Open the content store under the configured blobs directory.
    ///
    /// Blobs no catalog record points at are removed before the store is
    /// handed out.
    pub async fn open(repo: Arc<SyncRepo>, config: &Config) -> SyncResult<Self> {
        let store = Self {
            repo,
            blobs: BlobStore::open(config.blobs_dir()).await?,
            path_locks: KeyedLocks::new(),
            blob_locks: KeyedLocks::new(),
            max_upload_bytes: config.max_upload_bytes,
            upload_timeout: config.upload_timeout,
        };

        let swept = store.sweep_orphans().await?;
        if swept > 0 {
            warn!("Removed {} blobs left without a catalog record", swept);
        }

        Ok(store)
    }

    /// Remove unreferenced blobs and the directories of deleted folders
    async fn sweep_orphans(&self) -> SyncResult<usize> {
        let mut removed = 0;
        for folder_id in self.blobs.folder_ids().await? {
            if self.repo.get_folder(&folder_id)?.is_none() {
                removed += self.blobs.checksums(&folder_id).await?.len();
                self.blobs.remove_folder(&folder_id).await?;
                continue;
            }

            for checksum in self.blobs.checksums(&folder_id).await? {
                if !self.repo.checksum_in_use(&folder_id, &checksum)? {
                    self.blobs.remove(&folder_id, &checksum).await?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    /// Largest accepted upload in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Store an in-memory upload. See [`ContentStore::upload_stream`].
    pub async fn upload_file(
        &self,
        folder: &FolderInfo,
        upload: Upload<'_>,
        bytes: &[u8],
    ) -> SyncResult<FileRecord> {
        let chunk = Bytes::copy_from_slice(bytes);
        let body = stream::once(async move { Ok::<_, Infallible>(chunk) });
        self.upload_stream(folder, upload, body).await
    }

    /// Store an upload body and create or replace its catalog record.
    ///
    /// The checksum is always computed here from the received bytes. Receiving
    /// the body is bounded by the upload timeout and the size limit; an upload
    /// that fails either is discarded before the catalog is touched. The record
    /// is only written once the bytes are on disk under their checksum and
    /// have been read back and verified.
    pub async fn upload_stream<S, E>(
        &self,
        folder: &FolderInfo,
        upload: Upload<'_>,
        body: S,
    ) -> SyncResult<FileRecord>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        validate_sync_path(upload.path)?;
        let name = upload
            .display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| file_name(upload.path));
        let mime_type = upload
            .mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE);

        let received = tokio::time::timeout(self.upload_timeout, self.receive(&folder.id, body))
            .await
            .map_err(|_| {
                warn!(
                    "Upload of '{}' to folder {} timed out after {:?}",
                    upload.path, folder.id, self.upload_timeout
                );
                SyncError::Timeout
            })??;
        let Received {
            staged,
            checksum,
            size,
        } = received;

        let _path_guard = self
            .path_locks
            .lock((folder.id.clone(), upload.path.to_string()))
            .await;

        let (record, previous_checksum) = {
            let _blob_guard = self
                .blob_locks
                .lock((folder.id.clone(), checksum.clone()))
                .await;

            let pending = PendingBlob {
                store: self,
                folder_id: &folder.id,
                checksum: &checksum,
                committed: false,
            };
            self.blobs.persist(staged, &folder.id, &checksum).await?;
            self.verify_blob(&folder.id, upload.path, &checksum).await?;

            let new_file = NewFile {
                path: upload.path,
                name,
                checksum: &checksum,
                size,
                mime_type,
            };

            match self
                .repo
                .commit_file(&folder.id, &folder.access_token, &new_file)?
            {
                FileCommit::Stored {
                    record,
                    previous_checksum,
                } => {
                    pending.commit();
                    (record, previous_checksum)
                }
                FileCommit::TokenMismatch => {
                    return Err(SyncError::Conflict(TOKEN_ROTATED.to_string()));
                }
                FileCommit::FolderMissing => {
                    drop(pending);
                    self.discard_folder_dir(&folder.id).await;
                    return Err(SyncError::NotFound("Folder"));
                }
            }
        };

        if let Some(previous) = previous_checksum.filter(|p| *p != checksum) {
            self.prune_blob(&folder.id, &previous).await;
        }

        info!(
            "Stored '{}' in folder {} ({} bytes, {})",
            record.path, folder.id, record.size, record.checksum
        );
        Ok(record)
    }

    /// Write a body to a temp file, hashing it on the way
    async fn receive<S, E>(&self, folder_id: &str, body: S) -> SyncResult<Received>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let (staged, mut file) = self.blobs.create_staged(folder_id).await?;
        let mut hasher = ChecksumHasher::new();

        let mut body = std::pin::pin!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                SyncError::InvalidRequest(format!("Failed to read upload body: {}", e))
            })?;

            let size = hasher.len() + chunk.len() as u64;
            if size > self.max_upload_bytes {
                return Err(SyncError::Capacity {
                    size,
                    limit: self.max_upload_bytes,
                });
            }

            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.sync_all().await?;

        Ok(Received {
            staged,
            size: hasher.len(),
            checksum: hasher.finalize(),
        })
    }

    /// Read the bytes of a catalog record that belongs to `folder`.
    ///
    /// The record is re-read under the path lock so the returned bytes always
    /// match the returned checksum.
    pub async fn get_file_data(&self, folder: &FolderInfo, file_id: &str) -> SyncResult<FileContent> {
        let record = self
            .repo
            .get_file(&folder.id, file_id)?
            .ok_or(SyncError::NotFound("File"))?;

        let _path_guard = self
            .path_locks
            .lock((folder.id.clone(), record.path.clone()))
            .await;

        let record = self
            .repo
            .get_file(&folder.id, file_id)?
            .ok_or(SyncError::NotFound("File"))?;

        let bytes = match self.blobs.read(&folder.id, &record.checksum).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SyncError::Integrity {
                    path: record.path,
                    expected: record.checksum,
                    actual: "missing content".to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let actual = sha256_hex(&bytes);
        if actual != record.checksum {
            return Err(SyncError::Integrity {
                path: record.path,
                expected: record.checksum,
                actual,
            });
        }

        Ok(FileContent { record, bytes })
    }

    /// Remove a path's bytes and catalog record.
    ///
    /// Returns false when nothing was stored at `path`.
    pub async fn delete_file(&self, folder: &FolderInfo, path: &str) -> SyncResult<bool> {
        validate_sync_path(path)?;

        let _path_guard = self
            .path_locks
            .lock((folder.id.clone(), path.to_string()))
            .await;

        match self
            .repo
            .remove_file(&folder.id, &folder.access_token, path)?
        {
            FileRemoval::Removed { checksum } => {
                self.prune_blob(&folder.id, &checksum).await;
                info!("Deleted '{}' from folder {}", path, folder.id);
                Ok(true)
            }
            FileRemoval::Absent => Ok(false),
            FileRemoval::TokenMismatch => Err(SyncError::Conflict(TOKEN_ROTATED.to_string())),
            FileRemoval::FolderMissing => Err(SyncError::NotFound("Folder")),
        }
    }

    /// Full current catalog of a folder
    pub fn list_files(&self, folder_id: &str) -> SyncResult<Vec<FileRecord>> {
        Ok(self.repo.list_files(folder_id)?)
    }

    /// Remove all stored bytes of a folder (after its records are gone)
    pub async fn remove_folder_content(&self, folder_id: &str) -> SyncResult<()> {
        Ok(self.blobs.remove_folder(folder_id).await?)
    }

    async fn verify_blob(&self, folder_id: &str, path: &str, checksum: &str) -> SyncResult<()> {
        let stored = self.blobs.read(folder_id, checksum).await?;
        let actual = sha256_hex(&stored);
        if actual != checksum {
            return Err(SyncError::Integrity {
                path: path.to_string(),
                expected: checksum.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// Remove a blob no record points at any more
    async fn prune_blob(&self, folder_id: &str, checksum: &str) {
        let _blob_guard = self
            .blob_locks
            .lock((folder_id.to_string(), checksum.to_string()))
            .await;
        if !self.is_unreferenced(folder_id, checksum) {
            return;
        }
        if let Err(e) = self.blobs.remove(folder_id, checksum).await {
            warn!("Failed to remove blob {} in folder {}: {}", checksum, folder_id, e);
        }
    }

    /// True only when the catalog confirms no record of the folder uses `checksum`
    fn is_unreferenced(&self, folder_id: &str, checksum: &str) -> bool {
        match self.repo.checksum_in_use(folder_id, checksum) {
            Ok(in_use) => !in_use,
            Err(e) => {
                warn!("Failed to check blob {} in folder {}: {}", checksum, folder_id, e);
                false
            }
        }
    }

    /// Drop the directory an upload recreated for a folder deleted meanwhile
    async fn discard_folder_dir(&self, folder_id: &str) {
        match self.blobs.remove_folder_if_empty(folder_id).await {
            Ok(true) => info!("Removed directory of deleted folder {}", folder_id),
            Ok(false) => {}
            Err(e) => warn!("Failed to remove directory of folder {}: {}", folder_id, e),
        }
    }
}
