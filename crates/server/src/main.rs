//! Feedkeeper
//!
//! Feed reader API server.

use std::sync::Arc;

use clap::Parser;
use feedkeeper_persistence::FeedStorage;
use feedkeeper_persistence::backends::memory::MemoryBackend;
use feedkeeper_persistence::types::UserDraft;
use feedkeeper_rest::{ServerConfig, StorageBackendMode, create_app_with_shared, init_logging};
use tracing::{info, warn};

#[cfg(feature = "sqlite")]
use feedkeeper_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    info!(database = %config.database_url, "Initializing SQLite backend");

    let backend = SqliteBackend::with_config(&config.database_url, SqliteBackendConfig::default())?;
    backend.init_schema()?;

    Ok(backend)
}

/// Creates the configured bootstrap user and logs a token for it.
async fn bootstrap<S: FeedStorage>(storage: &S, config: &ServerConfig) -> anyhow::Result<()> {
    let Some(email) = config.bootstrap_email.as_deref() else {
        return Ok(());
    };

    let user = storage.create_user(UserDraft::with_email(email)).await?;
    let token = storage.issue_token(user.id).await?;
    warn!(email = %email, token = %token, "Bootstrap user created; keep this token private");

    Ok(())
}

/// Builds the app over `storage` and serves it.
async fn run<S: FeedStorage>(storage: S, config: ServerConfig) -> anyhow::Result<()> {
    let storage = Arc::new(storage);
    bootstrap(storage.as_ref(), &config).await?;

    let app = create_app_with_shared(storage, config.clone())?;
    serve(app, &config).await
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        storage_backend = %config.storage,
        max_page_size = config.max_page_size,
        "Starting Feedkeeper"
    );

    match config.storage {
        StorageBackendMode::Sqlite => start_sqlite(config).await,
        StorageBackendMode::Memory => {
            warn!("Using the in-memory backend; all data is lost on exit");
            run(MemoryBackend::new(), config).await
        }
    }
}

/// Starts the server with the SQLite backend.
#[cfg(feature = "sqlite")]
async fn start_sqlite(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    run(backend, config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The sqlite backend requires the 'sqlite' feature. \
         Build with: cargo build -p feedkeeper-server --features sqlite"
    )
}
