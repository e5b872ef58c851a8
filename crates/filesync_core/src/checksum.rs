//! SHA-256 content checksums.
//!
//! Every checksum stored in the catalog is the lowercase hex digest of the
//! complete file content. Client-reported checksums go through
//! [`normalize_checksum`] before they are compared with catalog values.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const CHECKSUM_HEX_LEN: usize = 64;

/// Compute the catalog checksum of `bytes`.
///
/// # Example
/// ```
/// use filesync_core::checksum::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b"hello"),
///     "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
/// );
/// ```
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Incremental checksum for content that arrives in chunks.
///
/// Produces the same digest as [`sha256_hex`] over the concatenated chunks.
#[derive(Debug, Clone, Default)]
pub struct ChecksumHasher {
    inner: Sha256,
    len: u64,
}

impl ChecksumHasher {
    /// Start an empty checksum
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of content
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Number of bytes fed so far
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True if no bytes were fed
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finish and return the lowercase hex digest
    pub fn finalize(self) -> String {
        format!("{:x}", self.inner.finalize())
    }
}

/// Trim and lowercase a checksum supplied by a client.
pub fn normalize_checksum(checksum: &str) -> String {
    checksum.trim().to_ascii_lowercase()
}

/// True if `checksum` looks like a normalized SHA-256 hex digest.
pub fn is_valid_checksum(checksum: &str) -> bool {
    checksum.len() == CHECKSUM_HEX_LEN
        && checksum
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_valid() {
        assert!(is_valid_checksum(&sha256_hex(b"some file")));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = ChecksumHasher::new();
        hasher.update(b"hello ");
        hasher.update(b"");
        hasher.update(b"world");
        assert_eq!(hasher.len(), 11);
        assert_eq!(hasher.finalize(), sha256_hex(b"hello world"));
    }

    #[test]
    fn test_normalize_checksum() {
        let upper = "  E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855 ";
        let normalized = normalize_checksum(upper);
        assert_eq!(normalized, sha256_hex(b""));
        assert!(is_valid_checksum(&normalized));
    }

    #[test]
    fn test_invalid_checksums() {
        assert!(!is_valid_checksum(""));
        assert!(!is_valid_checksum("abc123"));
        // Uppercase is rejected until normalized
        assert!(!is_valid_checksum(
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        ));
        assert!(!is_valid_checksum(&"g".repeat(CHECKSUM_HEX_LEN)));
    }
}
