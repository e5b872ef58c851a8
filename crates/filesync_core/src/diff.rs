//! Manifest diffing.
//!
//! Compares a client's manifest with the folder catalog and decides, per
//! path, whether the client has to upload, download, or do nothing:
//!
//! | catalog | manifest | result |
//! |---|---|---|
//! | checksum X | checksum X | nothing |
//! | present | absent | download |
//! | absent | present | upload |
//! | checksum X | checksum Y | upload (the client copy wins) |
//!
//! There are no tombstones, so a path missing from the manifest is always a
//! download, never a delete. Deletes are explicit client calls.

use crate::manifest::{CatalogEntry, ManifestEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file the client should fetch from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadAction {
    /// Catalog record id to pass to the download call
    pub id: String,
    /// Path relative to the folder root
    pub path: String,
    /// Catalog checksum the downloaded bytes will have
    pub checksum: String,
    /// Catalog size in bytes
    pub size: u64,
}

impl From<&CatalogEntry> for DownloadAction {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            path: entry.path.clone(),
            checksum: entry.checksum.clone(),
            size: entry.size,
        }
    }
}

/// Reconciliation instructions for one client, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    /// Paths the client should push
    pub to_upload: Vec<String>,
    /// Catalog files the client should pull
    pub to_download: Vec<DownloadAction>,
}

impl SyncPlan {
    /// True when the client is already in sync
    pub fn is_empty(&self) -> bool {
        self.to_upload.is_empty() && self.to_download.is_empty()
    }
}

/// Compute the sync plan for a manifest against a catalog snapshot.
///
/// Both inputs are read only. The result depends on nothing but the inputs,
/// so the same catalog and manifest always produce the same plan. Sizes are
/// informational; the checksum alone decides whether two copies match.
///
/// The manifest is expected to have gone through
/// [`validate_manifest`](crate::manifest::validate_manifest); if a path is
/// repeated anyway the last entry wins.
pub fn compute_sync_plan(catalog: &[CatalogEntry], manifest: &[ManifestEntry]) -> SyncPlan {
    let catalog: BTreeMap<&str, &CatalogEntry> =
        catalog.iter().map(|e| (e.path.as_str(), e)).collect();
    let local: BTreeMap<&str, &ManifestEntry> =
        manifest.iter().map(|e| (e.path.as_str(), e)).collect();

    let mut plan = SyncPlan::default();

    for (path, local_entry) in &local {
        match catalog.get(path) {
            Some(remote) if remote.checksum == local_entry.checksum => {}
            // New on the client, or changed on either side: push wins
            _ => plan.to_upload.push((*path).to_string()),
        }
    }

    for (path, remote) in &catalog {
        if !local.contains_key(path) {
            plan.to_download.push(DownloadAction::from(*remote));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::sha256_hex;

    fn catalog_entry(id: &str, path: &str, content: &[u8]) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            path: path.to_string(),
            checksum: sha256_hex(content),
            size: content.len() as u64,
        }
    }

    fn manifest_entry(path: &str, content: &[u8]) -> ManifestEntry {
        ManifestEntry::new(path, sha256_hex(content), content.len() as u64)
    }

    #[test]
    fn test_identical_sides_need_nothing() {
        let catalog = vec![
            catalog_entry("1", "a.txt", b"alpha"),
            catalog_entry("2", "dir/b.txt", b"beta"),
        ];
        let manifest = vec![
            manifest_entry("dir/b.txt", b"beta"),
            manifest_entry("a.txt", b"alpha"),
        ];

        let plan = compute_sync_plan(&catalog, &manifest);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_missing_locally_is_download() {
        let catalog = vec![catalog_entry("1", "a.txt", b"0123456789")];

        let plan = compute_sync_plan(&catalog, &[]);
        assert!(plan.to_upload.is_empty());
        assert_eq!(
            plan.to_download,
            vec![DownloadAction {
                id: "1".to_string(),
                path: "a.txt".to_string(),
                checksum: sha256_hex(b"0123456789"),
                size: 10,
            }]
        );
    }

    #[test]
    fn test_new_locally_is_upload() {
        let plan = compute_sync_plan(&[], &[manifest_entry("new.txt", b"fresh")]);
        assert_eq!(plan.to_upload, vec!["new.txt".to_string()]);
        assert!(plan.to_download.is_empty());
    }

    #[test]
    fn test_checksum_mismatch_pushes_client_copy() {
        let catalog = vec![catalog_entry("1", "a.txt", b"0123456789")];
        let manifest = vec![manifest_entry("a.txt", b"0123456789ab")];

        let plan = compute_sync_plan(&catalog, &manifest);
        assert_eq!(plan.to_upload, vec!["a.txt".to_string()]);
        assert!(plan.to_download.is_empty());

        // Dropping the file from the manifest flips it to a download
        let plan = compute_sync_plan(&catalog, &[]);
        assert!(plan.to_upload.is_empty());
        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_download[0].path, "a.txt");
    }

    #[test]
    fn test_size_does_not_override_checksum() {
        let catalog = vec![catalog_entry("1", "a.txt", b"same")];
        let manifest = vec![ManifestEntry::new("a.txt", sha256_hex(b"same"), 999)];

        assert!(compute_sync_plan(&catalog, &manifest).is_empty());
    }

    #[test]
    fn test_buckets_are_disjoint_and_sorted() {
        let catalog = vec![
            catalog_entry("1", "z.txt", b"z"),
            catalog_entry("2", "m.txt", b"m"),
            catalog_entry("3", "shared.txt", b"old"),
            catalog_entry("4", "b.txt", b"b"),
        ];
        let manifest = vec![
            manifest_entry("shared.txt", b"new"),
            manifest_entry("y.txt", b"y"),
            manifest_entry("c.txt", b"c"),
            manifest_entry("b.txt", b"b"),
        ];

        let plan = compute_sync_plan(&catalog, &manifest);
        assert_eq!(plan.to_upload, vec!["c.txt", "shared.txt", "y.txt"]);
        let downloads: Vec<_> = plan.to_download.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(downloads, vec!["m.txt", "z.txt"]);

        for path in &plan.to_upload {
            assert!(!downloads.contains(&path.as_str()));
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let catalog = vec![
            catalog_entry("1", "one", b"1"),
            catalog_entry("2", "two", b"2"),
        ];
        let manifest = vec![manifest_entry("two", b"changed"), manifest_entry("three", b"3")];
        let reversed: Vec<_> = manifest.iter().rev().cloned().collect();

        let first = compute_sync_plan(&catalog, &manifest);
        assert_eq!(first, compute_sync_plan(&catalog, &manifest));
        assert_eq!(first, compute_sync_plan(&catalog, &reversed));
    }

    #[test]
    fn test_plan_json_shape() {
        let plan = compute_sync_plan(&[catalog_entry("f1", "a.txt", b"x")], &[]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["to_upload"], serde_json::json!([]));
        assert_eq!(json["to_download"][0]["id"], "f1");
        assert_eq!(json["to_download"][0]["size"], 1);
    }
}
