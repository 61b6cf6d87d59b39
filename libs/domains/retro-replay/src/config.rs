use core_config::{env_or_default, ConfigError, FromEnv};

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub render_enabled: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub render_speed: f64,
    pub render_max_duration_ms: u64,
    pub daily_limit_per_project: u64,
    pub daily_limit_global: u64,
    pub min_interval_sec_per_project: u64,
    pub artifact_prefix: String,
    pub artifact_bucket: String,
    pub artifact_endpoint: String,
    pub artifact_region: String,
    pub visual_model_url: Option<String>,
    pub visual_model_timeout_ms: u64,
    pub internal_api_key: String,
    pub orchestrator_url: Option<String>,
}

impl FromEnv for ReplayConfig {
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
            render_enabled: parse("REPLAY_RENDER_ENABLED", "true")?,
            viewport_width: parse("REPLAY_RENDER_VIEWPORT_WIDTH", "1280")?,
            viewport_height: parse("REPLAY_RENDER_VIEWPORT_HEIGHT", "720")?,
            render_speed: parse("REPLAY_RENDER_SPEED", "1.0")?,
            render_max_duration_ms: parse("REPLAY_RENDER_MAX_DURATION_MS", "60000")?,
            daily_limit_per_project: parse("REPLAY_RENDER_DAILY_LIMIT_PER_PROJECT", "200")?,
            daily_limit_global: parse("REPLAY_RENDER_DAILY_LIMIT_GLOBAL", "2000")?,
            min_interval_sec_per_project: parse("REPLAY_RENDER_MIN_INTERVAL_SEC_PER_PROJECT", "30")?,
            artifact_prefix: env_or_default("REPLAY_ARTIFACT_PREFIX", "replay-artifacts/"),
            artifact_bucket: env_or_default("REPLAY_ARTIFACT_BUCKET", "retrospec-artifacts"),
            artifact_endpoint: env_or_default("REPLAY_ARTIFACT_ENDPOINT", "https://s3.amazonaws.com"),
            artifact_region: env_or_default("REPLAY_ARTIFACT_REGION", "us-east-1"),
            visual_model_url: std::env::var("REPLAY_VISUAL_MODEL_URL").ok(),
            visual_model_timeout_ms: parse("REPLAY_VISUAL_MODEL_TIMEOUT_MS", "8000")?,
            internal_api_key: env_or_default("RETROSPEC_INTERNAL_API_KEY", "dev-internal-key"),
            orchestrator_url: std::env::var("REPLAY_ORCHESTRATOR_URL").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_rendering() {
        let config = ReplayConfig::from_env().unwrap();
        assert!(config.render_enabled);
        assert_eq!(config.viewport_width, 1280);
        assert_eq!(config.artifact_prefix, "replay-artifacts/");
    }
}
