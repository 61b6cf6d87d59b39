use core_config::{env_or_default, ConfigError, FromEnv};

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub min_sessions: u64,
    pub min_cluster_confidence: f64,
    pub cooldown_minutes: u64,
    pub alert_webhook_url: Option<String>,
    pub alert_timeout_ms: u64,
}

impl FromEnv for ClusterConfig {
    fn from_env() -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            env_or_default(key, default)
                .parse()
                .map_err(|e: T::Err| ConfigError::ParseError { key: key.to_string(), details: e.to_string() })
        }

        Ok(Self {
            min_sessions: parse("CLUSTER_MIN_SESSIONS", "2")?,
            min_cluster_confidence: parse("CLUSTER_MIN_CONFIDENCE", "0.0")?,
            cooldown_minutes: parse("CLUSTER_ALERT_COOLDOWN_MINUTES", "60")?,
            alert_webhook_url: std::env::var("CLUSTER_ALERT_WEBHOOK_URL").ok(),
            alert_timeout_ms: parse("CLUSTER_ALERT_TIMEOUT_MS", "5000")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_two_sessions() {
        let config = ClusterConfig::from_env().unwrap();
        assert_eq!(config.min_sessions, 2);
        assert!(config.alert_webhook_url.is_none());
    }
}
