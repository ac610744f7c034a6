//! Server setup and initialization
//!
//! Builds the service context for the configured storage backend, the Axum
//! application, and the background task that sweeps round deadlines.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use league_cache::{LocalProjectionCache, RedisPool, RedisProjectionCache};
use league_common::{AppConfig, AppError, JwtService, StorageBackend};
use league_core::traits::ProjectionCache;
use league_core::SnowflakeGenerator;
use league_db::{create_pool, run_migrations, MemoryStore};
use league_service::{RoundScheduler, ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(create_router(), state.config());
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let builder = ServiceContextBuilder::new();

    let builder = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; state is lost on restart");
            builder.memory_store(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::config("DATABASE_URL is required for postgres storage"))?;

            info!("Connecting to PostgreSQL...");
            let db_config = league_db::DatabaseConfig::new(
                database.url.clone(),
                database.max_connections,
                database.min_connections,
            )
            .with_acquire_timeout(Duration::from_secs(database.connect_timeout_secs));
            let pool = create_pool(&db_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if config.storage.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!("Migrations applied");
            }

            builder.postgres(pool)
        }
    };

    let cache_ttl = Duration::from_secs(config.league.leaderboard_cache_ttl_secs);
    let projection_cache: Arc<dyn ProjectionCache> = match &config.redis {
        Some(redis) => {
            info!("Connecting to Redis...");
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            if let Err(e) = pool.health_check().await {
                // The cache is an optimization; reads fall through on errors
                warn!(error = %e, "Redis health check failed; continuing");
            }
            Arc::new(RedisProjectionCache::new(pool, cache_ttl))
        }
        None => Arc::new(LocalProjectionCache::new(cache_ttl)),
    };

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    let service_context = builder
        .projection_cache(projection_cache)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .settings(config.league.clone())
        .build()
        .map_err(|e| AppError::config(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Sweep round deadlines every `every` until the task is aborted
///
/// Reads also settle overdue rounds, so a missed tick only delays the
/// visible transition, never the rules.
pub fn spawn_round_sweeper(context: Arc<ServiceContext>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match RoundScheduler::new(&context).sweep().await {
                Ok(report) if report.advanced > 0 || report.extended > 0 || report.failed > 0 => {
                    info!(
                        examined = report.examined,
                        advanced = report.advanced,
                        extended = report.extended,
                        held = report.held,
                        failed = report.failed,
                        "Round sweep finished"
                    );
                }
                Ok(report) => debug!(examined = report.examined, "Round sweep idle"),
                Err(e) => warn!(error = %e, "Round sweep failed"),
            }
        }
    })
}

/// Run the HTTP server until ctrl-c
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::config(format!("Invalid listen address: {e}")))?;
    let sweep_every = config.league.round_sweep_interval_secs;

    let state = create_app_state(config).await?;

    let sweeper = if sweep_every > 0 {
        info!(interval_secs = sweep_every, "Starting round sweeper");
        Some(spawn_round_sweeper(
            state.shared_context(),
            Duration::from_secs(sweep_every),
        ))
    } else {
        info!("Round sweeper disabled; deadlines settle on read");
        None
    };

    let result = run_server(create_app(state), addr).await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    result
}
