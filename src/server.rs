//! HTTP server initialization and runtime setup.
//!
//! Handles store and cache setup and the Axum server lifecycle.

use crate::config::{Config, StoreBackend};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::{MemoryLinkRepository, RestLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the link store selected by `STORE_BACKEND`.
///
/// # Errors
///
/// Returns an error if the REST store settings are missing or the HTTP
/// client cannot be built.
pub fn build_repository(config: &Config) -> Result<Arc<dyn LinkRepository>> {
    match config.store_backend {
        StoreBackend::Rest => {
            let store_url = config
                .store_url
                .as_deref()
                .context("STORE_URL must be set for the rest store")?;
            let api_key = config
                .store_api_key
                .as_deref()
                .context("STORE_API_KEY must be set for the rest store")?;

            let repository = RestLinkRepository::new(
                store_url,
                &config.store_table,
                api_key,
                config.store_timeout(),
            )
            .context("Failed to create store client")?;

            tracing::info!("Link store: {} (table {})", store_url, config.store_table);
            Ok(Arc::new(repository))
        }
        StoreBackend::Memory => {
            tracing::warn!("Link store: memory, links are lost on restart");
            Ok(Arc::new(MemoryLinkRepository::new()))
        }
    }
}

/// Connects the listing cache, falling back to [`NullCache`] when Redis is
/// not configured or unreachable.
pub async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

/// Builds the shared state from the configuration.
///
/// # Errors
///
/// Returns an error if the link store cannot be set up.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let repository = build_repository(config)?;
    let cache = build_cache(config).await;
    Ok(AppState::new(repository, cache, &config.public_base_url))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Link store (REST or memory)
/// - Redis cache (or NullCache fallback)
/// - Axum HTTP server, stopped gracefully on Ctrl-C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Store setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    if let Err(e) = state.link_service.store_health().await {
        tracing::warn!("Link store is not reachable yet: {}", e);
    }

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
