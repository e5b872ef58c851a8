//! Filesync core
//!
//! IO-free building blocks of the Filesync engine: the records exchanged
//! between clients and the server, checksum helpers, catalog path rules and
//! the manifest diff that decides which files have to move.

#![warn(missing_docs)]

/// Content checksums (SHA-256, lowercase hex)
pub mod checksum;

/// Manifest diffing (decides uploads and downloads)
pub mod diff;

/// Error (common error types)
pub mod error;

/// Catalog and manifest records
pub mod manifest;

/// Catalog path validation
pub mod path_utils;

pub use diff::{DownloadAction, SyncPlan, compute_sync_plan};
pub use error::{CoreError, Result};
pub use manifest::{CatalogEntry, ManifestEntry, normalize_name, validate_manifest};
