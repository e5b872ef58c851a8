//! Manifest and catalog records.
//!
//! A manifest is the client's snapshot of what it believes exists locally.
//! The catalog is the server's authoritative record for the folder. Both are
//! reduced to the same `(path, checksum, size)` shape before diffing.

use crate::checksum::{is_valid_checksum, normalize_checksum};
use crate::error::{CoreError, Result};
use crate::path_utils::validate_sync_path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One file as reported by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the folder root
    pub path: String,

    /// SHA-256 hex digest of the local content
    pub checksum: String,

    /// Local size in bytes
    #[serde(default)]
    pub size: u64,
}

impl ManifestEntry {
    /// Create a manifest entry
    pub fn new(path: impl Into<String>, checksum: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
            size,
        }
    }
}

/// The slice of a catalog record the diff engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog record id (used for downloads)
    pub id: String,

    /// Path relative to the folder root
    pub path: String,

    /// SHA-256 hex digest of the stored content
    pub checksum: String,

    /// Stored size in bytes
    pub size: u64,
}

/// Validate a client manifest and normalize its checksums.
///
/// Every path must be a valid catalog path, every checksum a SHA-256 hex
/// digest (case-insensitive), and no path may appear twice.
pub fn validate_manifest(entries: Vec<ManifestEntry>) -> Result<Vec<ManifestEntry>> {
    let mut seen = HashSet::with_capacity(entries.len());

    entries
        .into_iter()
        .map(|mut entry| {
            validate_sync_path(&entry.path)?;

            entry.checksum = normalize_checksum(&entry.checksum);
            if !is_valid_checksum(&entry.checksum) {
                return Err(CoreError::InvalidChecksum(entry.path));
            }

            if !seen.insert(entry.path.clone()) {
                return Err(CoreError::DuplicatePath(entry.path));
            }

            Ok(entry)
        })
        .collect()
}

/// Trim a folder or device name, rejecting blank input.
///
/// `what` names the field in the resulting error message.
pub fn normalize_name(what: &'static str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyName(what));
    }
    Ok(trimmed.to_string())
}
