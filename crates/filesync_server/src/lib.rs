//! Filesync Server
//!
//! A folder synchronization server: devices holding a folder's access token
//! exchange manifests with the server, learn which files to push or pull, and
//! move file content over plain HTTP.
//!
//! ## Features
//!
//! - **Token-scoped folders**: Each folder has one rotatable access token
//! - **Checksum diffing**: SHA-256 manifests decide uploads and downloads
//! - **Content store**: Verified, content-addressed file storage on disk
//! - **Admin API**: Folder and client management behind `ADMIN_TOKEN`
//!
//! ## Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3030)
//! - `DATABASE_PATH`: Path to SQLite database (default: ./filesync.db)
//! - `DATA_DIR`: Directory for stored file content (default: directory of the database)
//! - `MAX_UPLOAD_BYTES`: Largest accepted upload (default: 52428800)
//! - `UPLOAD_TIMEOUT_SECS`: Time allowed to receive an upload body (default: 120)
//! - `ADMIN_TOKEN`: Bearer token for `/admin` (admin API disabled when unset)
//! - `CORS_ORIGINS`: Comma-separated list of allowed origins

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use error::{SyncError, SyncResult};
pub use sync::SyncEngine;
