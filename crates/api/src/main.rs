use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turkce_api::config::ServerConfig;
use turkce_api::router::build_app_router;
use turkce_api::state::AppState;
use turkce_db::DbPool;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        cors_origins = ?config.cors_origins,
        "Loaded server configuration"
    );

    let pool = connect_database(&config).await;

    let app = build_app_router(
        AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
        },
        &config,
    );

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Versioning API listening");

    // Set once a termination signal arrives; starts the drain deadline.
    let draining = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let draining = Arc::clone(&draining);
        async move {
            wait_for_termination().await;
            draining.notify_one();
        }
    });

    let drain_limit = Duration::from_secs(config.shutdown_timeout_secs);
    tokio::select! {
        result = async { server.await } => {
            result.expect("Server error");
            tracing::info!("All connections drained");
        }
        () = async {
            draining.notified().await;
            tokio::time::sleep(drain_limit).await;
        } => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Drain deadline reached, dropping remaining connections"
            );
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// Install the global subscriber. `LOG_FORMAT=json` switches the fmt layer
/// to JSON lines; anything else keeps the human-readable format.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "turkce_api=debug,turkce_db=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Open the pool, prove the database answers, and apply pending migrations.
///
/// # Panics
///
/// Any failure here aborts startup.
async fn connect_database(config: &ServerConfig) -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = turkce_db::create_pool(&database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to database");
    turkce_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    turkce_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        max_connections = config.database_max_connections,
        "Database ready, migrations applied"
    );
    pool
}

/// Resolve on SIGINT, or on SIGTERM where the platform has it.
async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to listen for Ctrl-C");
                tracing::info!("SIGINT received, draining connections");
            }
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, draining connections");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl-C");
        tracing::info!("Ctrl-C received, draining connections");
    }
}
