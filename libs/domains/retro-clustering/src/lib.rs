//! Clustering engine: derives a stable fingerprint per marker, aggregates
//! markers into issue clusters per project, and exposes the triage
//! operators (state, feedback, merge, split) plus alerting.

pub mod alert;
pub mod cluster_key;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod postgres;
pub mod repository;
pub mod service;

pub use alert::{AlertClient, AlertGate, ClusterAlert};
pub use cluster_key::derive_cluster_key;
pub use config::ClusterConfig;
pub use error::{ClusteringError, ClusteringResult};
pub use handlers::ApiDoc;
pub use postgres::PgClusteringRepository;
pub use repository::{feedback_event, ClusterRepository, FeedbackRepository, MarkerRepository};
pub use service::{ClusterStat, ClusteringService, ReportCardLookup, SessionFilter};
