//! Replay worker: consumes `replay-jobs`, renders a bounded video artifact
//! (render-gated by quota), optionally confirms it with a visual model, and
//! reports the merged card back to the orchestrator.

use core_config::{Environment, FromEnv};
use database::postgres::{connect_from_config_with_retry, PostgresConfig};
use database::redis::RedisConfig;
use domain_retro_core::{FsObjectStore, ReplayJob, ReplayQueue};
use domain_retro_replay::{
    HTTPOrchestratorSink, PgArtifactRepository, ReplayConfig, ReplayProcessor, ReplayService,
    RenderQuotaGate, SubprocessRenderer, VisualModelClient,
};
use eyre::{Result, WrapErr};
use std::sync::Arc;
use stream_worker::{full_admin_router, metrics, Broker, HealthState, StreamWorker, WorkerConfig};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

async fn start_health_server(health_state: HealthState, port: u16) -> Result<()> {
    let app = full_admin_router(health_state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind health server to {}", addr))?;

    info!(port = %port, "health and admin server listening");

    axum::serve(listener, app).await.wrap_err("health server failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);
    metrics::init_metrics();

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "starting replay worker"
    );

    let health_port: u16 = std::env::var("REPLAY_WORKER_HEALTH_PORT")
        .or_else(|_| std::env::var("HEALTH_PORT"))
        .unwrap_or_else(|_| "8084".to_string())
        .parse()
        .unwrap_or(8084);

    let pg_config = PostgresConfig::from_env().wrap_err("failed to load postgres configuration")?;
    info!("connecting to postgres...");
    let db = connect_from_config_with_retry(pg_config, None)
        .await
        .wrap_err("failed to connect to postgres")?;
    info!("connected to postgres");

    let redis_config = RedisConfig::from_env().wrap_err("failed to load redis configuration")?;
    info!("connecting to redis...");
    let redis = database::redis::connect_from_config_with_retry(redis_config, None)
        .await
        .wrap_err("failed to connect to redis")?;
    info!("connected to redis");

    let replay_config = ReplayConfig::from_env().wrap_err("failed to load replay configuration")?;

    let object_store_root = std::env::var("RETROSPEC_OBJECT_STORE_ROOT").unwrap_or_else(|_| "/var/lib/retrospec/objects".to_string());
    let object_store = Arc::new(FsObjectStore::new(object_store_root));

    let render_command = std::env::var("REPLAY_RENDER_COMMAND").unwrap_or_else(|_| "retrospec-headless-render".to_string());
    let renderer = Arc::new(SubprocessRenderer::new(render_command));

    let quota_gate = if replay_config.render_enabled {
        Some(RenderQuotaGate::new(
            redis.clone(),
            replay_config.daily_limit_per_project,
            replay_config.daily_limit_global,
            replay_config.min_interval_sec_per_project,
        ))
    } else {
        None
    };

    let visual_client = replay_config
        .visual_model_url
        .clone()
        .map(|url| VisualModelClient::new(url, replay_config.visual_model_timeout_ms));

    let orchestrator_url = replay_config
        .orchestrator_url
        .clone()
        .ok_or_else(|| eyre::eyre!("REPLAY_ORCHESTRATOR_URL must be set for a standalone replay worker"))?;
    let report_sink = Arc::new(HTTPOrchestratorSink::new(orchestrator_url, replay_config.internal_api_key.clone()));

    let worker_config = WorkerConfig::from_stream_def::<ReplayQueue>().with_max_concurrent_jobs(5);

    let repository = PgArtifactRepository::new(db);
    let service = ReplayService::new(repository, object_store, renderer, quota_gate, visual_client, report_sink, replay_config);
    let processor = ReplayProcessor::new(service, worker_config.max_attempts);
    info!(
        stream = %worker_config.queue_name,
        consumer_group = %worker_config.group_name(),
        consumer_id = %worker_config.consumer_id,
        "worker configuration loaded"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!(error = %e, "error waiting for shutdown signal");
        }
        let _ = shutdown_tx.send(true);
    });

    let health_state = HealthState::new(
        Arc::new(redis.clone()),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        worker_config.queue_name.clone(),
    );

    let health_state_clone = health_state.clone();
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_state_clone, health_port).await {
            error!(error = %e, "health server failed");
        }
    });

    info!("starting replay job processor...");
    let worker = StreamWorker::<ReplayJob, _>::new(Broker::new(redis), processor, worker_config);
    worker.run(shutdown_rx).await.map_err(|e| eyre::eyre!("{}", e))?;

    info!("replay worker stopped");
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl+c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl+c, initiating shutdown..."),
        _ = terminate => info!("received sigterm, initiating shutdown..."),
    }

    Ok(())
}
