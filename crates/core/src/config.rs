//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body for `POST /resources`, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// Process-local storage; contents are lost on restart.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/resources"),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("storage.path must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Song metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
        /// Query timeout in seconds (advisory only - SQLite cannot force-cancel queries).
        /// Logs warnings for queries exceeding this duration.
        #[serde(default = "default_sqlite_query_timeout_secs")]
        query_timeout_secs: Option<u64>,
    },
}

fn default_sqlite_query_timeout_secs() -> Option<u64> {
    Some(30)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/songs.db"),
            query_timeout_secs: default_sqlite_query_timeout_secs(),
        }
    }
}

/// Remote song service used by the resource service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SongServiceConfig {
    /// Collection URL of the song service (e.g., "http://songs:8081/songs").
    #[serde(default = "default_song_service_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Attempts per call, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further attempt.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound for the retry delay.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_song_service_url() -> String {
    "http://localhost:8081/songs".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    2_000
}

impl Default for SongServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_song_service_url(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl SongServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Parse `base_url`, rejecting anything that is not http(s).
    pub fn parsed_base_url(&self) -> Result<Url, String> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| format!("song_service.base_url '{}' is invalid: {e}", self.base_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(format!(
                "song_service.base_url must use http or https, got '{other}'"
            )),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.parsed_base_url()?;

        if self.max_attempts == 0 {
            return Err("song_service.max_attempts must be at least 1".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("song_service.request_timeout_ms cannot be 0".to_string());
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(format!(
                "song_service.initial_backoff_ms {} exceeds max_backoff_ms {}",
                self.initial_backoff_ms, self.max_backoff_ms
            ));
        }
        Ok(())
    }
}

/// Background reconciliation of uploads whose metadata outcome is unknown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Run the reconciliation task (default: true).
    #[serde(default = "default_reconcile_enabled")]
    pub enabled: bool,
    /// Seconds between reconciliation passes.
    #[serde(default = "default_reconcile_interval_secs")]
    pub interval_secs: u64,
    /// Queue every stored resource at startup, so outcomes left unknown by a
    /// previous process are settled too. Re-reads every blob once.
    #[serde(default)]
    pub sweep_on_startup: bool,
}

fn default_reconcile_enabled() -> bool {
    true
}

fn default_reconcile_interval_secs() -> u64 {
    30
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enabled: default_reconcile_enabled(),
            interval_secs: default_reconcile_interval_secs(),
            sweep_on_startup: false,
        }
    }
}

impl ReconcileConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        // tokio::time::interval panics on a zero period
        if self.enabled && self.interval_secs == 0 {
            return Err("reconcile.interval_secs cannot be 0".to_string());
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Song metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Remote song service configuration.
    #[serde(default)]
    pub song_service: SongServiceConfig,
    /// Reconciliation configuration.
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses in-memory storage, a fast retry policy
    /// and no background reconciliation.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Memory,
            metadata: MetadataConfig::default(),
            song_service: SongServiceConfig {
                request_timeout_ms: 1_000,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
                ..SongServiceConfig::default()
            },
            reconcile: ReconcileConfig {
                enabled: false,
                ..ReconcileConfig::default()
            },
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> crate::Result<()> {
        self.storage
            .validate()
            .and_then(|_| self.song_service.validate())
            .and_then(|_| self.reconcile.validate())
            .map_err(crate::Error::Config)
    }
}
