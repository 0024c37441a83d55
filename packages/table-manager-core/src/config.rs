//! Table manager configuration.

use std::path::PathBuf;

/// Service configuration shared by the server, the admin tool and persistence.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Host address to bind the HTTP server to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Data directory for the table snapshot
    pub data_dir: PathBuf,
    /// Request body read timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Interval between snapshot flushes in milliseconds (0 = only on shutdown)
    pub persistence_interval_ms: u64,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
    /// Row limit applied to listings that don't specify one (None = unlimited)
    pub default_page_limit: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            request_timeout_ms: 5000,
            persistence_interval_ms: 1000,
            persistence_max_retries: 3,
            persistence_retry_delay_ms: 100,
            default_page_limit: None,
        }
    }
}
