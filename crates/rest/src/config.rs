//! Server configuration for the feedkeeper API.
//!
//! Every field can be given on the command line or through the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FEEDKEEPER_PORT` | 8080 | Server port |
//! | `FEEDKEEPER_HOST` | 127.0.0.1 | Host to bind |
//! | `FEEDKEEPER_LOG_LEVEL` | info | Log level |
//! | `FEEDKEEPER_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `FEEDKEEPER_ENABLE_CORS` | true | Enable CORS |
//! | `FEEDKEEPER_CORS_ORIGINS` | * | Allowed origins |
//! | `FEEDKEEPER_CORS_METHODS` | GET,POST,PUT,PATCH,DELETE,OPTIONS | Allowed methods |
//! | `FEEDKEEPER_CORS_HEADERS` | Content-Type,Authorization,Accept | Allowed headers |
//! | `FEEDKEEPER_STORAGE` | sqlite | Storage backend (`sqlite` or `memory`) |
//! | `FEEDKEEPER_DATABASE_URL` | feedkeeper.db | SQLite path, `:memory:` allowed |
//! | `FEEDKEEPER_DEFAULT_PAGE_SIZE` | 20 | Page size when `page_size` is absent |
//! | `FEEDKEEPER_MAX_PAGE_SIZE` | 1000 | Cap on `page_size` |
//! | `FEEDKEEPER_BOOTSTRAP_EMAIL` | - | Create this user at startup and log a token |
//!
//! # Example
//!
//! ```rust
//! use feedkeeper_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(config.socket_addr(), "0.0.0.0:3000");
//! ```

use std::fmt;

use clap::{Parser, ValueEnum};

/// Which storage backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendMode {
    /// SQLite through a connection pool.
    Sqlite,
    /// In-process tables; everything is lost on exit.
    Memory,
}

impl fmt::Display for StorageBackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackendMode::Sqlite => write!(f, "sqlite"),
            StorageBackendMode::Memory => write!(f, "memory"),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "feedkeeper")]
#[command(about = "Feed reader API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "FEEDKEEPER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "FEEDKEEPER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "FEEDKEEPER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "FEEDKEEPER_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "FEEDKEEPER_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "FEEDKEEPER_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Allowed CORS methods (comma-separated, or * for all).
    #[arg(
        long,
        env = "FEEDKEEPER_CORS_METHODS",
        default_value = "GET,POST,PUT,PATCH,DELETE,OPTIONS"
    )]
    pub cors_methods: String,

    /// Allowed CORS headers (comma-separated, or * for all).
    #[arg(
        long,
        env = "FEEDKEEPER_CORS_HEADERS",
        default_value = "Content-Type,Authorization,Accept"
    )]
    pub cors_headers: String,

    /// Storage backend.
    #[arg(long, env = "FEEDKEEPER_STORAGE", value_enum, default_value = "sqlite")]
    pub storage: StorageBackendMode,

    /// SQLite database path.
    #[arg(long, env = "FEEDKEEPER_DATABASE_URL", default_value = "feedkeeper.db")]
    pub database_url: String,

    /// Page size used when a list request has no usable `page_size`.
    #[arg(long, env = "FEEDKEEPER_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: u64,

    /// Largest `page_size` a list request may ask for.
    #[arg(long, env = "FEEDKEEPER_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: u64,

    /// Email of a user to create at startup; a bearer token for it is logged.
    #[arg(long, env = "FEEDKEEPER_BOOTSTRAP_EMAIL")]
    pub bootstrap_email: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            cors_methods: "GET,POST,PUT,PATCH,DELETE,OPTIONS".to_string(),
            cors_headers: "Content-Type,Authorization,Accept".to_string(),
            storage: StorageBackendMode::Sqlite,
            database_url: "feedkeeper.db".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
            bootstrap_email: None,
        }
    }
}

impl ServerConfig {
    /// Parses the environment only, ignoring the command line.
    pub fn from_env() -> Self {
        Self::try_parse_from(["feedkeeper"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration, reporting every problem at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if self.storage == StorageBackendMode::Sqlite && self.database_url.trim().is_empty() {
            errors.push("Database URL cannot be empty for the sqlite backend".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            cors_origins: "*".to_string(),
            cors_methods: "*".to_string(),
            cors_headers: "*".to_string(),
            storage: StorageBackendMode::Memory,
            database_url: ":memory:".to_string(),
            default_page_size: 20,
            max_page_size: 100,
            bootstrap_email: None,
        }
    }
}
