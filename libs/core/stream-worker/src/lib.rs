//! Stream Worker — generic Redis Streams broker and worker runtime.
//!
//! A reusable library for building Redis Streams queue consumers with:
//! - Consumer group support for horizontal scaling
//! - A retry z-set with exponential backoff, separate from stream delivery
//! - Dead-letter / unprocessable lists with an admin redrive API
//! - A process-wide done-marker idempotency cache
//! - Health check endpoints for Kubernetes probes
//! - Concurrent job processing with configurable parallelism
//! - Circuit breaker and rate limiting for downstream calls
//!
//! # Architecture
//!
//! ```text
//! Redis Stream ({queue})
//!   ↓ (consumer group)
//! StreamWorker<J, P>
//!   ↓ (processes jobs)
//! StreamProcessor<J>
//!   ↓ (on permanent failure or exhausted retries)
//! {queue}:failed
//! ```

pub mod broker;
mod config;
pub mod dlq;
mod error;
mod health;
pub mod metrics;
mod registry;
pub mod resilience;
mod worker;

pub use broker::{Broker, BrokerStats, Delivery, FailedEntry, RawDelivery, RedriveResult};
pub use config::WorkerConfig;
pub use error::{BrokerError, ErrorCategory};
pub use health::{
    dlq_admin_router, dlq_list_handler, dlq_redrive_handler, dlq_stats_handler, full_admin_router,
    health_handler, health_router, metrics_handler, queue_info_handler, ready_handler, HealthState,
};
pub use registry::{StreamDef, StreamJob, StreamProcessor};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RateLimiter, ResilienceError, ResilienceLayer};
pub use worker::StreamWorker;

pub type BrokerResult<T> = Result<T, BrokerError>;
