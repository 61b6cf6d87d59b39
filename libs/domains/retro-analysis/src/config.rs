use core_config::{env_or_default, ConfigError, FromEnv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerProvider {
    Heuristic,
    RemoteText,
}

impl AnalyzerProvider {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("remote_text") {
            AnalyzerProvider::RemoteText
        } else {
            AnalyzerProvider::Heuristic
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub provider: AnalyzerProvider,
    pub min_accept_confidence: f64,
    pub discard_uncertain: bool,
    pub remote_text_url: Option<String>,
    pub remote_text_timeout_ms: u64,
}

impl FromEnv for AnalysisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider = AnalyzerProvider::parse(&env_or_default("ANALYZER_PROVIDER", "heuristic"));

        let min_accept_confidence: f64 = env_or_default("ANALYZER_MIN_ACCEPT_CONFIDENCE", "0.6")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ANALYZER_MIN_ACCEPT_CONFIDENCE".to_string(),
                details: format!("{e}"),
            })?;

        let discard_uncertain: bool = env_or_default("ANALYZER_DISCARD_UNCERTAIN", "false")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ANALYZER_DISCARD_UNCERTAIN".to_string(),
                details: format!("{e}"),
            })?;

        let remote_text_url = std::env::var("ANALYZER_REMOTE_TEXT_URL").ok();

        let remote_text_timeout_ms: u64 = env_or_default("ANALYZER_REMOTE_TEXT_TIMEOUT_MS", "3000")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ANALYZER_REMOTE_TEXT_TIMEOUT_MS".to_string(),
                details: format!("{e}"),
            })?;

        Ok(Self {
            provider,
            min_accept_confidence,
            discard_uncertain,
            remote_text_url,
            remote_text_timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_heuristic_provider() {
        assert_eq!(AnalyzerProvider::parse("heuristic"), AnalyzerProvider::Heuristic);
        assert_eq!(AnalyzerProvider::parse("bogus"), AnalyzerProvider::Heuristic);
        assert_eq!(AnalyzerProvider::parse("remote_text"), AnalyzerProvider::RemoteText);
        assert_eq!(AnalyzerProvider::parse("REMOTE_TEXT"), AnalyzerProvider::RemoteText);
    }
}
