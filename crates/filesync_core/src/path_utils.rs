//! Catalog path rules.
//!
//! Catalog paths are slash-delimited and relative to the folder root. They
//! are compared byte for byte, so `Notes/a.md` and `notes/a.md` are two
//! different files.

use crate::error::{CoreError, Result};

/// Longest path accepted into a catalog, in bytes.
pub const MAX_PATH_LEN: usize = 1024;

/// Check that `path` is a valid catalog path.
///
/// # Example
/// ```
/// use filesync_core::path_utils::validate_sync_path;
///
/// assert!(validate_sync_path("notes/2024/today.md").is_ok());
/// assert!(validate_sync_path("../etc/passwd").is_err());
/// ```
pub fn validate_sync_path(path: &str) -> Result<()> {
    let invalid = |reason: &'static str| CoreError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(invalid("path is too long"));
    }
    if path.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    if path.contains('\\') {
        return Err(invalid("path must use '/' as separator"));
    }
    if path.chars().any(char::is_control) {
        return Err(invalid("path contains control characters"));
    }

    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("path contains an empty segment")),
            "." | ".." => return Err(invalid("path contains a relative segment")),
            _ => {}
        }
    }

    Ok(())
}

/// The final segment of a catalog path, used as the default display name.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
