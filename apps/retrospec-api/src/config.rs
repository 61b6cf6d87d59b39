//! Configuration for the ingest/query/admin API.

use core_config::server::ServerConfig;
use core_config::{env_or_default, ConfigError, FromEnv};

/// Thresholds for `/v1/admin/queue-health`. Each field pairs a warning
/// level with a critical level; whichever queue/metric crosses the
/// highest threshold decides the overall status.
#[derive(Clone, Debug)]
pub struct QueueHealthConfig {
    pub warning_pending: u64,
    pub critical_pending: u64,
    pub warning_retry: u64,
    pub critical_retry: u64,
    pub warning_failed: u64,
    pub critical_failed: u64,
}

impl FromEnv for QueueHealthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let parse = |key: &str, default: &str| -> Result<u64, ConfigError> {
            env_or_default(key, default)
                .parse()
                .map_err(|e| ConfigError::ParseError { key: key.to_string(), details: format!("{e}") })
        };

        Ok(Self {
            warning_pending: parse("QUEUE_WARNING_PENDING", "100")?,
            critical_pending: parse("QUEUE_CRITICAL_PENDING", "500")?,
            warning_retry: parse("QUEUE_WARNING_RETRY", "50")?,
            critical_retry: parse("QUEUE_CRITICAL_RETRY", "250")?,
            warning_failed: parse("QUEUE_WARNING_FAILED", "20")?,
            critical_failed: parse("QUEUE_CRITICAL_FAILED", "100")?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub queue_health: QueueHealthConfig,
    /// Compared against the `X-Retrospec-Internal` header on the
    /// analysis/replay report-callback routes.
    pub internal_api_key: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            queue_health: QueueHealthConfig::from_env()?,
            internal_api_key: env_or_default("RETROSPEC_INTERNAL_API_KEY", "dev-internal-key"),
        })
    }
}
