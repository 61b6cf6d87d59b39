//! Ingest/query/admin API: accepts sessions, serves issue-cluster triage,
//! accepts internal report callbacks from the analysis/replay workers, and
//! exposes queue administration.

mod admin;
mod auth;
mod config;
mod error;
mod openapi;

use axum::middleware;
use core_config::{Environment, FromEnv};
use database::postgres::{connect_from_config_with_retry, PostgresConfig};
use database::redis::RedisConfig;
use domain_retro_analysis::{AnalysisConfig, AnalysisService, PgReportCardRepository};
use domain_retro_clustering::{AlertGate, ClusterConfig, ClusteringService, PgClusteringRepository};
use domain_retro_core::FsObjectStore;
use domain_retro_dispatch::DispatchService;
use eyre::WrapErr;
use std::sync::Arc;
use stream_worker::Broker;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use admin::AdminState;
use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    info!(name = env!("CARGO_PKG_NAME"), version = env!("CARGO_PKG_VERSION"), "starting api");

    let config = Config::from_env().wrap_err("failed to load api configuration")?;

    let pg_config = PostgresConfig::from_env().wrap_err("failed to load postgres configuration")?;
    let db = connect_from_config_with_retry(pg_config, None).await.wrap_err("failed to connect to postgres")?;

    let redis_config = RedisConfig::from_env().wrap_err("failed to load redis configuration")?;
    let redis = database::redis::connect_from_config_with_retry(redis_config, None).await.wrap_err("failed to connect to redis")?;

    let analysis_config = AnalysisConfig::from_env().wrap_err("failed to load analyzer configuration")?;
    let object_store_root = std::env::var("RETROSPEC_OBJECT_STORE_ROOT").unwrap_or_else(|_| "/var/lib/retrospec/objects".to_string());
    let object_store = Arc::new(FsObjectStore::new(object_store_root));

    let report_cards = PgReportCardRepository::new(db.clone());
    let analysis_service = Arc::new(AnalysisService::new(report_cards, analysis_config, object_store));

    let cluster_config = ClusterConfig::from_env().wrap_err("failed to load clustering configuration")?;
    let alert_gate = Some(AlertGate::new(redis.clone(), cluster_config.cooldown_minutes));
    let clustering_repo = PgClusteringRepository::new(db.clone());
    let report_cards_lookup: Arc<dyn domain_retro_clustering::ReportCardLookup> = analysis_service.clone();
    let clustering_service = Arc::new(ClusteringService::new(
        clustering_repo.clone(),
        clustering_repo.clone(),
        clustering_repo.clone(),
        cluster_config,
        alert_gate,
        Some(report_cards_lookup),
    ));

    let broker = Broker::new(redis.clone());
    let dispatch_service = Arc::new(DispatchService::new(broker.clone(), clustering_repo));

    let internal_routes = domain_retro_analysis::handlers::router(analysis_service.clone())
        .merge(domain_retro_replay::handlers::router(analysis_service))
        .layer(middleware::from_fn_with_state(config.internal_api_key.clone(), auth::internal_api_guard));

    let admin_state = AdminState { broker, queue_health: Arc::new(config.queue_health.clone()) };

    let app = domain_retro_dispatch::handlers::router(dispatch_service)
        .merge(domain_retro_clustering::handlers::router(clustering_service))
        .merge(internal_routes)
        .merge(admin::router(admin_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.server.address())
        .await
        .wrap_err_with(|| format!("failed to bind to {}", config.server.address()))?;

    info!(addr = %config.server.address(), "api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("api server failed")?;

    info!("api shut down");
    Ok(())
}

async fn shutdown_signal() {
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
}
