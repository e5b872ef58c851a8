use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const TEMP_PREFIX: &str = ".tmp-";

/// Content-addressed file storage.
///
/// Layout: `<root>/<folder_id>/<checksum>`. A blob never changes once it has
/// its final name, so anything that resolved a checksum from the catalog
/// reads the bytes that checksum describes.
pub struct BlobStore {
    root: PathBuf,
}

/// Bytes written to a temporary file, not yet visible under a checksum.
///
/// Dropping a staged blob without persisting it removes the temp file, which
/// is how cancelled or timed-out uploads are discarded.
pub struct StagedBlob {
    path: PathBuf,
    persisted: bool,
}

impl BlobStore {
    /// Open the store, creating the root and clearing interrupted uploads
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let store = Self { root: root.into() };
        fs::create_dir_all(&store.root).await?;

        let swept = store.sweep_temp_files().await?;
        if swept > 0 {
            warn!("Removed {} temp files left by interrupted uploads", swept);
        }

        Ok(store)
    }

    fn folder_dir(&self, folder_id: &str) -> PathBuf {
        self.root.join(folder_id)
    }

    fn blob_path(&self, folder_id: &str, checksum: &str) -> PathBuf {
        self.folder_dir(folder_id).join(checksum)
    }

    /// Open a temp file in the folder's directory for an incoming upload
    pub async fn create_staged(&self, folder_id: &str) -> io::Result<(StagedBlob, fs::File)> {
        let dir = self.folder_dir(folder_id);
        fs::create_dir_all(&dir).await?;

        // Guard exists before the file so cancellation always cleans up
        let staged = StagedBlob {
            path: dir.join(format!("{}{}", TEMP_PREFIX, uuid::Uuid::new_v4())),
            persisted: false,
        };
        let file = fs::File::create(&staged.path).await?;

        Ok((staged, file))
    }

    /// Give a staged blob its final checksum name
    pub async fn persist(
        &self,
        mut staged: StagedBlob,
        folder_id: &str,
        checksum: &str,
    ) -> io::Result<()> {
        fs::rename(&staged.path, self.blob_path(folder_id, checksum)).await?;
        staged.persisted = true;
        Ok(())
    }

    /// Read a blob's bytes
    pub async fn read(&self, folder_id: &str, checksum: &str) -> io::Result<Vec<u8>> {
        fs::read(self.blob_path(folder_id, checksum)).await
    }

    /// Remove a blob; a blob that is already gone is not an error
    pub async fn remove(&self, folder_id: &str, checksum: &str) -> io::Result<()> {
        match fs::remove_file(self.blob_path(folder_id, checksum)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Blocking [`BlobStore::remove`], for cleanup that runs inside `Drop`
    pub fn remove_blocking(&self, folder_id: &str, checksum: &str) -> io::Result<()> {
        match std::fs::remove_file(self.blob_path(folder_id, checksum)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove every blob of a folder
    pub async fn remove_folder(&self, folder_id: &str) -> io::Result<()> {
        match fs::remove_dir_all(self.folder_dir(folder_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Ids of every folder that has a directory in the store
    pub async fn folder_ids(&self) -> io::Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut folders = fs::read_dir(&self.root).await?;
        while let Some(folder) = folders.next_entry().await? {
            if !folder.file_type().await?.is_dir() {
                continue;
            }
            if let Some(id) = folder.file_name().to_str() {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Checksums of the persisted blobs in a folder, temp files excluded
    pub async fn checksums(&self, folder_id: &str) -> io::Result<Vec<String>> {
        let mut checksums = Vec::new();
        let mut entries = match fs::read_dir(self.folder_dir(folder_id)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(checksums),
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            if is_temp_file(&entry.path()) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                checksums.push(name.to_string());
            }
        }
        Ok(checksums)
    }

    /// Remove a folder's directory if nothing is left in it
    pub async fn remove_folder_if_empty(&self, folder_id: &str) -> io::Result<bool> {
        match fs::remove_dir(self.folder_dir(folder_id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete temp files from uploads that never finished
    pub async fn sweep_temp_files(&self) -> io::Result<usize> {
        let mut removed = 0;
        let mut folders = fs::read_dir(&self.root).await?;

        while let Some(folder) = folders.next_entry().await? {
            if !folder.file_type().await?.is_dir() {
                continue;
            }

            let mut entries = fs::read_dir(folder.path()).await?;
            while let Some(entry) = entries.next_entry().await? {
                if is_temp_file(&entry.path()) {
                    fs::remove_file(entry.path()).await?;
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

impl Drop for StagedBlob {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Discarded staged upload {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to discard staged upload {:?}: {}", self.path, e),
        }
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filesync_core::checksum::sha256_hex;
    use tokio::io::AsyncWriteExt;

    async fn stage(store: &BlobStore, folder_id: &str, bytes: &[u8]) -> StagedBlob {
        let (staged, mut file) = store.create_staged(folder_id).await.unwrap();
        file.write_all(bytes).await.unwrap();
        file.sync_all().await.unwrap();
        staged
    }

    async fn folder_entries(root: &Path, folder_id: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(root.join(folder_id)).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_stage_persist_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();
        let checksum = sha256_hex(b"hello");

        let staged = stage(&store, "f1", b"hello").await;
        store.persist(staged, "f1", &checksum).await.unwrap();

        assert_eq!(store.read("f1", &checksum).await.unwrap(), b"hello");
        assert_eq!(folder_entries(dir.path(), "f1").await, vec![checksum]);
    }

    #[tokio::test]
    async fn test_dropped_stage_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        let staged = stage(&store, "f1", b"partial").await;
        drop(staged);

        assert!(folder_entries(dir.path(), "f1").await.is_empty());
    }

    #[tokio::test]
    async fn test_open_sweeps_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("f1")).unwrap();
        std::fs::write(dir.path().join("f1").join(".tmp-leftover"), b"x").unwrap();
        std::fs::write(dir.path().join("f1").join("keep"), b"y").unwrap();

        let _store = BlobStore::open(dir.path()).await.unwrap();
        assert_eq!(folder_entries(dir.path(), "f1").await, vec!["keep".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        store.remove("f1", "missing").await.unwrap();
        store.remove_folder("missing").await.unwrap();

        let staged = stage(&store, "f1", b"x").await;
        store.persist(staged, "f1", "abc").await.unwrap();
        store.remove_folder("f1").await.unwrap();
        assert!(!dir.path().join("f1").exists());
    }

    #[tokio::test]
    async fn test_remove_folder_if_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();
        assert!(!store.remove_folder_if_empty("missing").await.unwrap());

        let staged = stage(&store, "f1", b"x").await;
        store.persist(staged, "f1", "abc").await.unwrap();
        assert!(!store.remove_folder_if_empty("f1").await.unwrap());

        store.remove("f1", "abc").await.unwrap();
        assert!(store.remove_folder_if_empty("f1").await.unwrap());
        assert!(!dir.path().join("f1").exists());
    }

    #[tokio::test]
    async fn test_listing_skips_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        let staged = stage(&store, "f1", b"done").await;
        store.persist(staged, "f1", "abc").await.unwrap();
        let _pending = stage(&store, "f1", b"in flight").await;

        assert_eq!(store.folder_ids().await.unwrap(), vec!["f1".to_string()]);
        assert_eq!(store.checksums("f1").await.unwrap(), vec!["abc".to_string()]);
        assert!(store.checksums("missing").await.unwrap().is_empty());

        store.remove_blocking("f1", "abc").unwrap();
        store.remove_blocking("f1", "abc").unwrap();
        assert!(store.checksums("f1").await.unwrap().is_empty());
    }
}
