use std::sync::Arc;

use anyhow::Context;
use axum::middleware;
use tower_http::trace::TraceLayer;
use vocab_api::{
    ApiConfig, ApiState, PgVocabularyRepository, jobs,
    metrics::{init_metrics, metrics_router, track_metrics},
    middleware::{cors::create_cors_layer, request_id::request_id_middleware},
    router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("invalid configuration")?;

    vocab_api::tracing::init_tracing(&config.environment);
    let metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let pool = vocab_db::create_pool(&config.database_url, config.db_max_connections).await?;
    vocab_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let repo = Arc::new(PgVocabularyRepository::new(pool.clone()));
    let (state, timers) = ApiState::from_config(&config, repo);
    let jobs = jobs::start_background_jobs(
        state.registry.clone(),
        timers,
        config.session_idle_timeout(),
    );

    let app = router::router()
        .with_state(state)
        .merge(metrics_router(metrics_handle))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(config.allowed_origins()));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, environment = ?config.environment, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for job in jobs {
        job.abort();
    }
    pool.close().await;
    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(%err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
