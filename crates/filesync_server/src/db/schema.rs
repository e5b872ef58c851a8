use rusqlite::Connection;

/// SQL schema for folders, clients and the file catalog
const SCHEMA: &str = r#"
-- Sync folders (each scoped by a secret access token)
CREATE TABLE IF NOT EXISTS folders (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    access_token TEXT UNIQUE NOT NULL,
    created_at INTEGER NOT NULL
);

-- Sync clients (devices bound to one folder)
CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    folder_id TEXT NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    device_name TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_sync_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_clients_folder_id ON clients(folder_id);

-- File catalog (one live record per folder + path)
CREATE TABLE IF NOT EXISTS files (
    id TEXT PRIMARY KEY,
    folder_id TEXT NOT NULL REFERENCES folders(id) ON DELETE CASCADE,
    path TEXT NOT NULL,
    name TEXT NOT NULL,
    checksum TEXT NOT NULL,
    size INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    modified_at INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_files_folder_path ON files(folder_id, path);
CREATE INDEX IF NOT EXISTS idx_files_folder_checksum ON files(folder_id, checksum);
"#;

/// Initialize the database with the sync schema
pub fn init_database(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
