//! # feedkeeper-rest - Feed reader HTTP API
//!
//! Axum routes for a user's feed sources and their posts. Every list
//! endpoint goes through the same query shaper: query parameters are parsed
//! against the entity's declared capabilities, applied to an owner-scoped
//! collection, paged, and described in response headers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use feedkeeper_rest::{create_app_with_config, ServerConfig};
//! use feedkeeper_persistence::backends::memory::MemoryBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(MemoryBackend::new(), config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Action | HTTP Method | URL Pattern |
//! |--------|-------------|-------------|
//! | list sources | GET | `/api/v1/feed/source/` |
//! | create source | POST | `/api/v1/feed/source/` |
//! | read / update / delete source | GET / PUT / DELETE | `/api/v1/feed/source/{id}/` |
//! | list posts | GET | `/api/v1/feed/source/{id}/post/` |
//! | create post | POST | `/api/v1/feed/source/{id}/post/` |
//! | read / update / delete post | GET / PUT / DELETE | `/api/v1/feed/source/{id}/post/{post_id}/` |
//! | like / unlike | PATCH / DELETE | `.../post/{post_id}/favorite/` |
//! | bookmark / unbookmark | PATCH / DELETE | `.../post/{post_id}/bookmark/` |
//! | health | GET | `/health` |
//!
//! Every feed route requires `Authorization: Bearer <token>`.
//!
//! ## List Parameters
//!
//! | Parameter | Meaning |
//! |-----------|---------|
//! | `page` | 1-based page number; invalid values mean 1 |
//! | `page_size` | records per page; invalid values mean the default, capped at the maximum |
//! | `sort` | `[+\|-]field` tokens separated by commas |
//! | `search` | case-insensitive text matched against every searchable field |
//! | `filter__f` | case-insensitive substring on `f` |
//! | `exact__f` | equality on `f` |
//! | `lt__f` / `lte__f` / `gt__f` / `gte__f` | ordering comparisons on `f` |
//!
//! Unknown fields are ignored and unparseable values fall back to a
//! default for the field's kind. A list request never fails because of its
//! parameters.
//!
//! ## Architecture
//!
//! - [`error`] - Error types and JSON error bodies
//! - [`config`] - Server configuration
//! - [`state`] - Application state (storage, configuration, capabilities)
//! - [`extractors`] - Authenticated caller and list-request extractors
//! - [`listing`] - The list pipeline shared by every list endpoint
//! - [`responses`] - Pagination headers
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod listing;
pub mod responses;
pub mod routing;
pub mod state;

pub use config::{ServerConfig, StorageBackendMode};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use feedkeeper_persistence::core::FeedStorage;
use feedkeeper_persistence::error::SchemaError;
use feedkeeper_persistence::schema::CapabilityRegistry;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Result<Router, SchemaError>
where
    S: FeedStorage,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Builds the capability registry, the routes and the middleware stack.
/// Fails only if an entity declares a capability on a field it does not
/// have.
///
/// # Example
///
/// ```rust
/// use feedkeeper_persistence::backends::memory::MemoryBackend;
/// use feedkeeper_rest::{ServerConfig, create_app_with_config};
///
/// let app = create_app_with_config(MemoryBackend::new(), ServerConfig::for_testing());
/// assert!(app.is_ok());
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Result<Router, SchemaError>
where
    S: FeedStorage,
{
    create_app_with_shared(Arc::new(storage), config)
}

/// Like [`create_app_with_config`], for a backend the caller keeps using.
pub fn create_app_with_shared<S>(
    storage: Arc<S>,
    config: ServerConfig,
) -> Result<Router, SchemaError>
where
    S: FeedStorage,
{
    info!(
        "Creating feed API server with backend: {}",
        storage.backend_name()
    );

    let registry = CapabilityRegistry::feed()?;
    let state = AppState::new(storage, config.clone(), registry);

    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        let cors = build_cors_layer(&config);
        router.layer(cors)
    } else {
        router
    };

    Ok(router.layer(service_builder))
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    cors
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG` takes
/// precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "feedkeeper_rest={0},feedkeeper_persistence={0},tower_http=debug",
            level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
