use thiserror::Error;

/// Validation errors raised by the core before anything touches storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A catalog path broke one of the path rules
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending path as supplied by the caller
        path: String,
        /// Which rule the path broke
        reason: &'static str,
    },

    /// The same path was reported twice in one manifest
    #[error("Path '{0}' appears more than once in the manifest")]
    DuplicatePath(String),

    /// A reported checksum is not a SHA-256 hex digest
    #[error("Invalid checksum for '{0}': expected 64 hex characters")]
    InvalidChecksum(String),

    /// A required name (folder, device) was blank
    #[error("{0} must not be empty")]
    EmptyName(&'static str),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = CoreError::InvalidPath {
            path: "../x".to_string(),
            reason: "contains a '..' segment",
        };
        assert_eq!(err.to_string(), "Invalid path '../x': contains a '..' segment");
        assert_eq!(
            CoreError::EmptyName("Device name").to_string(),
            "Device name must not be empty"
        );
    }
}
