use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 3030)
    pub port: u16,
    /// Database file path (default: ./filesync.db)
    pub database_path: PathBuf,
    /// Directory holding stored file content (default: directory of the database)
    pub data_dir: PathBuf,
    /// Largest accepted upload in bytes (default: 50 MiB)
    pub max_upload_bytes: u64,
    /// How long an upload may take to reach storage (default: 120s)
    pub upload_timeout: Duration,
    /// Bearer token for the admin API; the admin API is disabled when unset
    pub admin_token: Option<String>,
    /// CORS allowed origins (comma-separated)
    pub cors_origins: Vec<String>,
}

impl Config {
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
    pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3030".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_path = PathBuf::from(
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./filesync.db".to_string()),
        );

        let data_dir = match env::var("DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => database_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
        };

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidMaxUploadBytes)?,
            Err(_) => Self::DEFAULT_MAX_UPLOAD_BYTES,
        };

        let upload_timeout_secs = match env::var("UPLOAD_TIMEOUT_SECS") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidUploadTimeout)?,
            Err(_) => Self::DEFAULT_UPLOAD_TIMEOUT_SECS,
        };

        let admin_token = env::var("ADMIN_TOKEN")
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            host,
            port,
            database_path,
            data_dir,
            max_upload_bytes,
            upload_timeout: Duration::from_secs(upload_timeout_secs),
            admin_token,
            cors_origins,
        })
    }

    /// Configuration rooted at `data_dir`, with defaults and no environment lookups
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Config {
            host: "127.0.0.1".to_string(),
            port: 3030,
            database_path: data_dir.join("filesync.db"),
            data_dir,
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            upload_timeout: Duration::from_secs(Self::DEFAULT_UPLOAD_TIMEOUT_SECS),
            admin_token: None,
            cors_origins: Vec::new(),
        }
    }

    /// Check if the admin API is enabled
    pub fn is_admin_enabled(&self) -> bool {
        self.admin_token.is_some()
    }

    /// Directory holding stored file content
    pub fn blobs_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidMaxUploadBytes,
    InvalidUploadTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "Invalid PORT environment variable"),
            ConfigError::InvalidMaxUploadBytes => {
                write!(f, "Invalid MAX_UPLOAD_BYTES environment variable")
            }
            ConfigError::InvalidUploadTimeout => {
                write!(f, "Invalid UPLOAD_TIMEOUT_SECS environment variable")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
