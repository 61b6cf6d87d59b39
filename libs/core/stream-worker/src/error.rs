//! Error types for the broker and worker runtime.

use thiserror::Error;

/// Errors raised by `Broker` operations and the worker runtime.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("health check failed: {0}")]
    HealthCheck(String),
}

impl BrokerError {
    /// BLOCK timeouts on XREAD surface as a nil reply, not an error worth logging loudly.
    pub fn is_block_timeout(&self) -> bool {
        matches!(self, BrokerError::Redis(e) if e.to_string().contains("response was nil"))
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, BrokerError::Redis(e) if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout())
    }

    pub fn is_nogroup_error(&self) -> bool {
        matches!(self, BrokerError::Redis(e) if e.to_string().contains("NOGROUP"))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BrokerError::Redis(_) | BrokerError::Timeout(_) => ErrorCategory::Transient,
            BrokerError::Serialization(_) => ErrorCategory::Permanent,
            BrokerError::Processing(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("rate limit") || lower.contains("429") {
                    ErrorCategory::RateLimited
                } else if lower.contains("schema")
                    || lower.contains("unprocessable")
                    || lower.contains("malformed")
                {
                    ErrorCategory::Permanent
                } else {
                    ErrorCategory::Transient
                }
            }
            BrokerError::Configuration(_) | BrokerError::HealthCheck(_) => ErrorCategory::Permanent,
        }
    }
}

/// Classification used to decide retry behavior for a failed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Permanent,
    RateLimited,
}

impl ErrorCategory {
    pub fn should_retry(&self) -> bool {
        !matches!(self, ErrorCategory::Permanent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_errors_are_permanent() {
        let err: BrokerError =
            serde_json::from_str::<serde_json::Value>("not json").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Permanent);
        assert!(!err.category().should_retry());
    }

    #[test]
    fn processing_error_detects_rate_limit() {
        let err = BrokerError::Processing("upstream returned 429".into());
        assert_eq!(err.category(), ErrorCategory::RateLimited);
    }
}
