//! Analysis stage: turns a session's markers into a confidence-scored
//! report card, via a heuristic provider or an optional remote text model.

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod postgres;
pub mod processor;
pub mod providers;
pub mod repository;
pub mod service;

pub use config::{AnalysisConfig, AnalyzerProvider};
pub use error::{AnalysisError, AnalysisResult};
pub use handlers::ApiDoc;
pub use postgres::PgReportCardRepository;
pub use processor::AnalysisProcessor;
pub use providers::{ConfidenceProvider, HeuristicProvider, ProviderOutput, RemoteTextProvider};
pub use repository::ReportCardRepository;
pub use service::AnalysisService;
