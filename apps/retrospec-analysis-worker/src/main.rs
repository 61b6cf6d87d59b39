//! Analysis worker: consumes `analysis-jobs`, turns markers into a
//! confidence-scored report card, and stores it.

use core_config::{Environment, FromEnv};
use database::postgres::{connect_from_config_with_retry, PostgresConfig};
use database::redis::RedisConfig;
use domain_retro_analysis::{AnalysisConfig, AnalysisProcessor, AnalysisService, PgReportCardRepository};
use domain_retro_core::{AnalysisJob, AnalysisQueue, FsObjectStore};
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
        "starting analysis worker"
    );

    let health_port: u16 = std::env::var("ANALYSIS_WORKER_HEALTH_PORT")
        .or_else(|_| std::env::var("HEALTH_PORT"))
        .unwrap_or_else(|_| "8083".to_string())
        .parse()
        .unwrap_or(8083);

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

    let analysis_config = AnalysisConfig::from_env().wrap_err("failed to load analyzer configuration")?;

    let object_store_root = std::env::var("RETROSPEC_OBJECT_STORE_ROOT").unwrap_or_else(|_| "/var/lib/retrospec/objects".to_string());
    let object_store = Arc::new(FsObjectStore::new(object_store_root));

    let worker_config = WorkerConfig::from_stream_def::<AnalysisQueue>().with_max_concurrent_jobs(10);

    let repository = PgReportCardRepository::new(db);
    let service = AnalysisService::new(repository, analysis_config, object_store);
    let processor = AnalysisProcessor::new(service, worker_config.max_attempts);
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

    info!("starting analysis job processor...");
    let worker = StreamWorker::<AnalysisJob, _>::new(Broker::new(redis), processor, worker_config);
    worker.run(shutdown_rx).await.map_err(|e| eyre::eyre!("{}", e))?;

    info!("analysis worker stopped");
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
