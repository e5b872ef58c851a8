use chrono::{DateTime, Utc};
use filesync_core::CatalogEntry;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::{Arc, Mutex, MutexGuard};

/// Sync folder information
#[derive(Debug, Clone)]
pub struct FolderInfo {
    pub id: String,
    pub name: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

/// Folder information with child counts (for listings)
#[derive(Debug, Clone)]
pub struct FolderSummary {
    pub folder: FolderInfo,
    pub client_count: u64,
    pub file_count: u64,
}

/// Sync client (device) information
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub id: String,
    pub folder_id: String,
    pub device_name: String,
    pub created_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

/// Catalog record for one path in one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub folder_id: String,
    pub path: String,
    pub name: String,
    pub checksum: String,
    pub size: u64,
    pub mime_type: String,
    pub modified_at: DateTime<Utc>,
}

/// New catalog content for a path, written by an upload
#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    pub path: &'a str,
    pub name: &'a str,
    pub checksum: &'a str,
    pub size: u64,
    pub mime_type: &'a str,
}

/// Outcome of committing an upload to the catalog
#[derive(Debug)]
pub enum FileCommit {
    /// Record created or replaced; carries the checksum it replaced, if any
    Stored {
        record: FileRecord,
        previous_checksum: Option<String>,
    },
    /// The folder's token no longer matches the caller's credential
    TokenMismatch,
    /// The folder was deleted after the caller authenticated
    FolderMissing,
}

/// Outcome of removing a path from the catalog
#[derive(Debug, PartialEq, Eq)]
pub enum FileRemoval {
    /// Record removed; carries the checksum it had
    Removed { checksum: String },
    /// Nothing was stored at that path
    Absent,
    /// The folder's token no longer matches the caller's credential
    TokenMismatch,
    /// The folder was deleted after the caller authenticated
    FolderMissing,
}

/// Resolves a bearer token to the folder it grants access to.
///
/// This is the only capability the client-facing auth layer needs, so it is
/// kept apart from the rest of the repository.
pub trait FolderResolver: Send + Sync {
    fn find_by_token(&self, token: &str) -> Result<Option<FolderInfo>, rusqlite::Error>;
}

/// Repository for folders, clients and the file catalog
#[derive(Clone)]
pub struct SyncRepo {
    conn: Arc<Mutex<Connection>>,
}

const FILE_COLUMNS: &str = "id, folder_id, path, name, checksum, size, mime_type, modified_at";

impl SyncRepo {
    /// Create a new SyncRepo with the given connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-applied statement
        // behind (SQLite rolls back), so the connection stays usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ===== Folder operations =====

    /// Create a folder with a fresh access token
    pub fn create_folder(&self, name: &str) -> Result<FolderInfo, rusqlite::Error> {
        let conn = self.conn();
        let folder = FolderInfo {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            access_token: generate_secure_token(),
            created_at: timestamp_to_datetime(Utc::now().timestamp()),
        };

        conn.execute(
            "INSERT INTO folders (id, name, access_token, created_at) VALUES (?, ?, ?, ?)",
            params![
                folder.id,
                folder.name,
                folder.access_token,
                folder.created_at.timestamp()
            ],
        )?;

        Ok(folder)
    }

    /// Get a folder by ID
    pub fn get_folder(&self, folder_id: &str) -> Result<Option<FolderInfo>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, access_token, created_at FROM folders WHERE id = ?",
            [folder_id],
            folder_from_row,
        )
        .optional()
    }

    /// List all folders with their client and file counts
    pub fn list_folders(&self) -> Result<Vec<FolderSummary>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT f.id, f.name, f.access_token, f.created_at,
                    (SELECT COUNT(*) FROM clients c WHERE c.folder_id = f.id),
                    (SELECT COUNT(*) FROM files x WHERE x.folder_id = f.id)
             FROM folders f ORDER BY f.created_at, f.id",
        )?;

        let folders = stmt
            .query_map([], |row| {
                Ok(FolderSummary {
                    folder: folder_from_row(row)?,
                    client_count: row.get::<_, i64>(4)? as u64,
                    file_count: row.get::<_, i64>(5)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(folders)
    }

    /// Rename a folder (returns false if it doesn't exist)
    pub fn rename_folder(&self, folder_id: &str, name: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let updated = conn.execute(
            "UPDATE folders SET name = ? WHERE id = ?",
            params![name, folder_id],
        )?;
        Ok(updated > 0)
    }

    /// Replace a folder's access token in a single statement.
    ///
    /// The old token stops resolving the moment this returns.
    pub fn regenerate_token(&self, folder_id: &str) -> Result<Option<String>, rusqlite::Error> {
        let conn = self.conn();
        let token = generate_secure_token();
        let updated = conn.execute(
            "UPDATE folders SET access_token = ? WHERE id = ?",
            params![token, folder_id],
        )?;
        Ok((updated > 0).then_some(token))
    }

    /// Delete a folder (clients and catalog records cascade)
    pub fn delete_folder(&self, folder_id: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM folders WHERE id = ?", [folder_id])?;
        Ok(deleted > 0)
    }

    // ===== Client operations =====

    /// Register a client for a folder (returns None if the folder doesn't exist)
    pub fn create_client(
        &self,
        folder_id: &str,
        device_name: &str,
    ) -> Result<Option<ClientInfo>, rusqlite::Error> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let folder_exists = tx
            .query_row("SELECT 1 FROM folders WHERE id = ?", [folder_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !folder_exists {
            return Ok(None);
        }

        let client = ClientInfo {
            id: uuid::Uuid::new_v4().to_string(),
            folder_id: folder_id.to_string(),
            device_name: device_name.to_string(),
            created_at: timestamp_to_datetime(Utc::now().timestamp()),
            last_sync_at: None,
        };

        tx.execute(
            "INSERT INTO clients (id, folder_id, device_name, created_at) VALUES (?, ?, ?, ?)",
            params![
                client.id,
                client.folder_id,
                client.device_name,
                client.created_at.timestamp()
            ],
        )?;
        tx.commit()?;

        Ok(Some(client))
    }

    /// Get a client by ID
    pub fn get_client(&self, client_id: &str) -> Result<Option<ClientInfo>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, folder_id, device_name, created_at, last_sync_at FROM clients WHERE id = ?",
            [client_id],
            client_from_row,
        )
        .optional()
    }

    /// List the clients of a folder, most recently synced first
    pub fn list_clients(&self, folder_id: &str) -> Result<Vec<ClientInfo>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, folder_id, device_name, created_at, last_sync_at
             FROM clients WHERE folder_id = ?
             ORDER BY last_sync_at IS NULL, last_sync_at DESC, created_at DESC",
        )?;

        let clients = stmt
            .query_map([folder_id], client_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(clients)
    }

    /// Update a client's last sync time (returns false if it doesn't exist)
    pub fn touch_last_sync(&self, client_id: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let now = Utc::now().timestamp();
        let updated = conn.execute(
            "UPDATE clients SET last_sync_at = ? WHERE id = ?",
            params![now, client_id],
        )?;
        Ok(updated > 0)
    }

    /// Delete a client
    pub fn delete_client(&self, client_id: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let deleted = conn.execute("DELETE FROM clients WHERE id = ?", [client_id])?;
        Ok(deleted > 0)
    }

    // ===== File catalog operations =====

    /// Full catalog of a folder, ordered by path
    pub fn list_files(&self, folder_id: &str) -> Result<Vec<FileRecord>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE folder_id = ? ORDER BY path"
        ))?;

        let files = stmt
            .query_map([folder_id], file_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(files)
    }

    /// The catalog reduced to what the diff engine compares
    pub fn catalog_entries(&self, folder_id: &str) -> Result<Vec<CatalogEntry>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, path, checksum, size FROM files WHERE folder_id = ?")?;

        let entries = stmt
            .query_map([folder_id], |row| {
                Ok(CatalogEntry {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    checksum: row.get(2)?,
                    size: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get a catalog record by ID, scoped to its folder
    pub fn get_file(
        &self,
        folder_id: &str,
        file_id: &str,
    ) -> Result<Option<FileRecord>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ? AND folder_id = ?"),
            params![file_id, folder_id],
            file_from_row,
        )
        .optional()
    }

    /// Create or replace the record for a path.
    ///
    /// Runs in one transaction that first confirms `token` is still the
    /// folder's access token, so a rotation between authentication and
    /// commit never lets the stale credential write.
    pub fn commit_file(
        &self,
        folder_id: &str,
        token: &str,
        file: &NewFile<'_>,
    ) -> Result<FileCommit, rusqlite::Error> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        match check_token(&tx, folder_id, token)? {
            TokenCheck::Current => {}
            TokenCheck::Rotated => return Ok(FileCommit::TokenMismatch),
            TokenCheck::FolderMissing => return Ok(FileCommit::FolderMissing),
        }

        let existing: Option<(String, String)> = tx
            .query_row(
                "SELECT id, checksum FROM files WHERE folder_id = ? AND path = ?",
                params![folder_id, file.path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let now = Utc::now().timestamp();
        let (file_id, previous_checksum) = match existing {
            Some((id, checksum)) => {
                tx.execute(
                    "UPDATE files SET name = ?, checksum = ?, size = ?, mime_type = ?, modified_at = ?
                     WHERE id = ?",
                    params![
                        file.name,
                        file.checksum,
                        file.size as i64,
                        file.mime_type,
                        now,
                        id
                    ],
                )?;
                (id, Some(checksum))
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO files (id, folder_id, path, name, checksum, size, mime_type, modified_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        id,
                        folder_id,
                        file.path,
                        file.name,
                        file.checksum,
                        file.size as i64,
                        file.mime_type,
                        now
                    ],
                )?;
                (id, None)
            }
        };

        tx.commit()?;

        Ok(FileCommit::Stored {
            record: FileRecord {
                id: file_id,
                folder_id: folder_id.to_string(),
                path: file.path.to_string(),
                name: file.name.to_string(),
                checksum: file.checksum.to_string(),
                size: file.size,
                mime_type: file.mime_type.to_string(),
                modified_at: timestamp_to_datetime(now),
            },
            previous_checksum,
        })
    }

    /// Remove the record for a path, with the same token check as uploads
    pub fn remove_file(
        &self,
        folder_id: &str,
        token: &str,
        path: &str,
    ) -> Result<FileRemoval, rusqlite::Error> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        match check_token(&tx, folder_id, token)? {
            TokenCheck::Current => {}
            TokenCheck::Rotated => return Ok(FileRemoval::TokenMismatch),
            TokenCheck::FolderMissing => return Ok(FileRemoval::FolderMissing),
        }

        let checksum: Option<String> = tx
            .query_row(
                "SELECT checksum FROM files WHERE folder_id = ? AND path = ?",
                params![folder_id, path],
                |row| row.get(0),
            )
            .optional()?;

        let Some(checksum) = checksum else {
            return Ok(FileRemoval::Absent);
        };

        tx.execute(
            "DELETE FROM files WHERE folder_id = ? AND path = ?",
            params![folder_id, path],
        )?;
        tx.commit()?;

        Ok(FileRemoval::Removed { checksum })
    }

    /// True if any catalog record in the folder still points at `checksum`
    pub fn checksum_in_use(&self, folder_id: &str, checksum: &str) -> Result<bool, rusqlite::Error> {
        let conn = self.conn();
        let found = conn
            .query_row(
                "SELECT 1 FROM files WHERE folder_id = ? AND checksum = ? LIMIT 1",
                params![folder_id, checksum],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl FolderResolver for SyncRepo {
    fn find_by_token(&self, token: &str) -> Result<Option<FolderInfo>, rusqlite::Error> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, access_token, created_at FROM folders WHERE access_token = ?",
            [token],
            folder_from_row,
        )
        .optional()
    }
}

// ===== Helper functions =====

enum TokenCheck {
    Current,
    Rotated,
    FolderMissing,
}

fn check_token(conn: &Connection, folder_id: &str, token: &str) -> Result<TokenCheck, rusqlite::Error> {
    let current: Option<String> = conn
        .query_row(
            "SELECT access_token FROM folders WHERE id = ?",
            [folder_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(match current {
        None => TokenCheck::FolderMissing,
        Some(current) if current == token => TokenCheck::Current,
        Some(_) => TokenCheck::Rotated,
    })
}

fn folder_from_row(row: &Row<'_>) -> Result<FolderInfo, rusqlite::Error> {
    Ok(FolderInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        access_token: row.get(2)?,
        created_at: timestamp_to_datetime(row.get(3)?),
    })
}

fn client_from_row(row: &Row<'_>) -> Result<ClientInfo, rusqlite::Error> {
    Ok(ClientInfo {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        device_name: row.get(2)?,
        created_at: timestamp_to_datetime(row.get(3)?),
        last_sync_at: row.get::<_, Option<i64>>(4)?.map(timestamp_to_datetime),
    })
}

fn file_from_row(row: &Row<'_>) -> Result<FileRecord, rusqlite::Error> {
    Ok(FileRecord {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        path: row.get(2)?,
        name: row.get(3)?,
        checksum: row.get(4)?,
        size: row.get::<_, i64>(5)? as u64,
        mime_type: row.get(6)?,
        modified_at: timestamp_to_datetime(row.get(7)?),
    })
}

/// Generate a cryptographically secure random token
fn generate_secure_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.r#gen()).collect();
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

/// Convert Unix timestamp to DateTime<Utc>
fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    fn setup_test_db() -> SyncRepo {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        SyncRepo::new(conn)
    }

    fn new_file<'a>(path: &'a str, checksum: &'a str, size: u64) -> NewFile<'a> {
        NewFile {
            path,
            name: filesync_core::path_utils::file_name(path),
            checksum,
            size,
            mime_type: "text/plain",
        }
    }

    #[test]
    fn test_folder_lifecycle() {
        let repo = setup_test_db();

        let folder = repo.create_folder("Photos").unwrap();
        assert!(!folder.access_token.is_empty());

        let found = repo.find_by_token(&folder.access_token).unwrap().unwrap();
        assert_eq!(found.id, folder.id);

        assert!(repo.rename_folder(&folder.id, "Pictures").unwrap());
        assert_eq!(repo.get_folder(&folder.id).unwrap().unwrap().name, "Pictures");

        assert!(repo.delete_folder(&folder.id).unwrap());
        assert!(repo.get_folder(&folder.id).unwrap().is_none());
        assert!(!repo.delete_folder(&folder.id).unwrap());
        assert!(!repo.rename_folder(&folder.id, "Gone").unwrap());
    }

    #[test]
    fn test_tokens_are_unique() {
        let repo = setup_test_db();
        let a = repo.create_folder("a").unwrap();
        let b = repo.create_folder("b").unwrap();
        assert_ne!(a.access_token, b.access_token);
    }

    #[test]
    fn test_regenerate_token_invalidates_old() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();

        let new_token = repo.regenerate_token(&folder.id).unwrap().unwrap();
        assert_ne!(new_token, folder.access_token);

        assert!(repo.find_by_token(&folder.access_token).unwrap().is_none());
        let found = repo.find_by_token(&new_token).unwrap().unwrap();
        assert_eq!(found.id, folder.id);

        assert!(repo.regenerate_token("missing").unwrap().is_none());
    }

    #[test]
    fn test_client_registration() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();

        let client = repo.create_client(&folder.id, "laptop").unwrap().unwrap();
        assert!(client.last_sync_at.is_none());

        // Same device name registers a separate client
        let again = repo.create_client(&folder.id, "laptop").unwrap().unwrap();
        assert_ne!(client.id, again.id);

        assert!(repo.create_client("missing", "laptop").unwrap().is_none());

        assert!(repo.touch_last_sync(&client.id).unwrap());
        let touched = repo.get_client(&client.id).unwrap().unwrap();
        assert!(touched.last_sync_at.is_some());
        assert!(!repo.touch_last_sync("missing").unwrap());

        let clients = repo.list_clients(&folder.id).unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].id, client.id);

        assert!(repo.delete_client(&client.id).unwrap());
        assert!(!repo.delete_client(&client.id).unwrap());
        assert_eq!(repo.list_clients(&folder.id).unwrap().len(), 1);
    }

    #[test]
    fn test_commit_replaces_record_for_path() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();

        let first = match repo
            .commit_file(&folder.id, &folder.access_token, &new_file("a.txt", "x1", 10))
            .unwrap()
        {
            FileCommit::Stored {
                record,
                previous_checksum,
            } => {
                assert!(previous_checksum.is_none());
                record
            }
            other => panic!("token should match: {other:?}"),
        };

        let second = repo
            .commit_file(&folder.id, &folder.access_token, &new_file("a.txt", "x2", 12))
            .unwrap();
        match second {
            FileCommit::Stored {
                record,
                previous_checksum,
            } => {
                assert_eq!(record.id, first.id);
                assert_eq!(previous_checksum.as_deref(), Some("x1"));
            }
            other => panic!("token should match: {other:?}"),
        }

        let files = repo.list_files(&folder.id).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].checksum, "x2");
        assert_eq!(files[0].size, 12);
    }

    #[test]
    fn test_commit_rejects_rotated_token() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();
        repo.regenerate_token(&folder.id).unwrap();

        let result = repo
            .commit_file(&folder.id, &folder.access_token, &new_file("a.txt", "x", 1))
            .unwrap();
        assert!(matches!(result, FileCommit::TokenMismatch));
        assert!(repo.list_files(&folder.id).unwrap().is_empty());

        let removal = repo
            .remove_file(&folder.id, &folder.access_token, "a.txt")
            .unwrap();
        assert_eq!(removal, FileRemoval::TokenMismatch);
    }

    #[test]
    fn test_remove_file_is_idempotent() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();
        let token = folder.access_token.clone();
        repo.commit_file(&folder.id, &token, &new_file("a.txt", "x", 1))
            .unwrap();

        assert_eq!(
            repo.remove_file(&folder.id, &token, "a.txt").unwrap(),
            FileRemoval::Removed {
                checksum: "x".to_string()
            }
        );
        assert_eq!(
            repo.remove_file(&folder.id, &token, "a.txt").unwrap(),
            FileRemoval::Absent
        );
        assert!(!repo.checksum_in_use(&folder.id, "x").unwrap());
    }

    #[test]
    fn test_files_are_scoped_to_folder() {
        let repo = setup_test_db();
        let a = repo.create_folder("a").unwrap();
        let b = repo.create_folder("b").unwrap();

        let record = match repo
            .commit_file(&a.id, &a.access_token, &new_file("shared.txt", "x", 1))
            .unwrap()
        {
            FileCommit::Stored { record, .. } => record,
            other => panic!("token should match: {other:?}"),
        };

        assert!(repo.get_file(&a.id, &record.id).unwrap().is_some());
        assert!(repo.get_file(&b.id, &record.id).unwrap().is_none());
        assert!(repo.list_files(&b.id).unwrap().is_empty());
        assert!(!repo.checksum_in_use(&b.id, "x").unwrap());
    }

    #[test]
    fn test_delete_folder_cascades() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();
        let client = repo.create_client(&folder.id, "phone").unwrap().unwrap();
        repo.commit_file(&folder.id, &folder.access_token, &new_file("a.txt", "x", 1))
            .unwrap();

        let summary = repo.list_folders().unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].client_count, 1);
        assert_eq!(summary[0].file_count, 1);

        repo.delete_folder(&folder.id).unwrap();
        assert!(repo.get_client(&client.id).unwrap().is_none());
        assert!(repo.list_files(&folder.id).unwrap().is_empty());
        assert!(repo.list_folders().unwrap().is_empty());
    }

    #[test]
    fn test_deleted_folder_is_not_a_rotation() {
        let repo = setup_test_db();
        let folder = repo.create_folder("Docs").unwrap();
        repo.delete_folder(&folder.id).unwrap();

        let result = repo
            .commit_file(&folder.id, &folder.access_token, &new_file("a.txt", "x", 1))
            .unwrap();
        assert!(matches!(result, FileCommit::FolderMissing));
        assert!(repo.list_files(&folder.id).unwrap().is_empty());

        let removal = repo
            .remove_file(&folder.id, &folder.access_token, "a.txt")
            .unwrap();
        assert_eq!(removal, FileRemoval::FolderMissing);
    }
}
