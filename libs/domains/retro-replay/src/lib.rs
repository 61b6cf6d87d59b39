//! Replay/visual stage: renders a session's events into a bounded video
//! artifact, optionally confirms it with a visual model, and closes the
//! report card the analysis stage left pending.

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod postgres;
pub mod processor;
pub mod quota;
pub mod renderer;
pub mod report_sink;
pub mod repository;
pub mod service;
pub mod visual_client;

pub use config::ReplayConfig;
pub use error::{ReplayError, ReplayResult};
pub use handlers::ApiDoc;
pub use postgres::PgArtifactRepository;
pub use processor::ReplayProcessor;
pub use quota::{RenderGateDecision, RenderQuotaGate};
pub use renderer::{render_budget_ms, Renderer, RenderOutcome, SubprocessRenderer, Viewport};
pub use report_sink::{HTTPOrchestratorSink, InProcessSink, ReportSink};
pub use repository::ArtifactRepository;
pub use service::ReplayService;
pub use visual_client::{VideoLocation, VisualModelClient, VisualVerdict};
