use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postpilot_api::config::ServerConfig;
use postpilot_api::engine::JobDispatcher;
use postpilot_api::notifications::NotificationRouter;
use postpilot_api::router::build_app_router;
use postpilot_api::state::AppState;
use postpilot_api::{background, engine};
use postpilot_events::{EmailConfig, EmailDelivery, EventBus, EventPersistence};
use postpilot_llm::LlmClient;
use postpilot_scrape::{ApifyScraper, ChannelScraper, TrendSource};

/// Upper bound on waiting for in-flight jobs during shutdown.
const DISPATCHER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound per auxiliary task during shutdown.
const TASK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Server configuration loaded");

    let pool = connect_database().await;

    // Jobs left `running` by a previous process are failed and advertisers
    // stuck `syncing` are reset before the dispatcher starts claiming work.
    engine::recovery::recover(&pool)
        .await
        .expect("Startup recovery failed");

    let llm = Arc::new(LlmClient::from_env().expect("Failed to configure LLM client"));
    let apify = Arc::new(ApifyScraper::from_env().expect("Failed to configure Apify scraper"));
    let scraper: Arc<dyn ChannelScraper> = apify.clone();
    let trend_source: Arc<dyn TrendSource> = apify;
    tracing::info!("LLM and scraper clients ready");

    // Event plumbing: the bus, its durable writer, and the router that
    // fans events out to in-app notifications (and email when configured).
    let event_bus = Arc::new(EventBus::default());
    let persistence_handle =
        tokio::spawn(EventPersistence::run(pool.clone(), event_bus.subscribe()));

    let email = EmailConfig::from_env().map(|cfg| Arc::new(EmailDelivery::new(cfg)));
    if email.is_some() {
        tracing::info!("Email delivery enabled");
    }
    let notifier = NotificationRouter::new(pool.clone(), email);
    let notifier_handle = tokio::spawn(notifier.run(event_bus.subscribe()));

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        llm,
        scraper,
        trend_source,
    };

    let dispatcher_cancel = CancellationToken::new();
    let dispatcher = JobDispatcher::new(state.clone());
    let dispatcher_handle = {
        let cancel = dispatcher_cancel.clone();
        tokio::spawn(async move { dispatcher.run(cancel).await })
    };

    let sweep_cancel = CancellationToken::new();
    let expiry_handle = tokio::spawn(background::proposal_expiry::run(
        pool.clone(),
        Arc::clone(&event_bus),
        sweep_cancel.clone(),
    ));
    let retention_handle = tokio::spawn(background::retention::run(
        pool.clone(),
        config.job_retention_days,
        sweep_cancel.clone(),
    ));
    let trends_handle = tokio::spawn(background::trends_refresh::run(
        state.clone(),
        sweep_cancel.clone(),
    ));
    tracing::info!("Dispatcher and background sweeps running");

    let app = build_app_router(state, &config);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Shutdown order matters: stop claiming jobs first (in-flight
    // executors drain inside the dispatcher), then the sweeps, and close
    // the bus last so the event services see a clean end-of-stream.
    tracing::info!("No longer accepting connections, draining tasks");

    dispatcher_cancel.cancel();
    let _ = tokio::time::timeout(DISPATCHER_DRAIN_TIMEOUT, dispatcher_handle).await;

    sweep_cancel.cancel();
    for handle in [expiry_handle, retention_handle, trends_handle] {
        let _ = tokio::time::timeout(TASK_DRAIN_TIMEOUT, handle).await;
    }

    drop(event_bus);
    let _ = tokio::time::timeout(TASK_DRAIN_TIMEOUT, persistence_handle).await;
    let _ = tokio::time::timeout(TASK_DRAIN_TIMEOUT, notifier_handle).await;

    tracing::info!("Shutdown complete");
}

/// Env-filtered fmt subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "postpilot_api=debug,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect to Postgres, verify the connection, and apply migrations.
///
/// # Panics
///
/// Panics when `DATABASE_URL` is missing or the database is unreachable;
/// the server has nothing useful to do without it.
async fn connect_database() -> postpilot_db::DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = postpilot_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    postpilot_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    postpilot_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready (pool, health check, migrations)");
    pool
}

/// Resolves when the process receives SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
