//! Config - 環境変数（と任意の `.env`）からの設定読み込み
//!
//! | variable | default |
//! |---|---|
//! | `GEMINI_API_KEY` / `VITE_GEMINI_API_KEY` | none (unconfigured) |
//! | `DIGEST_MODEL` | `gemini-2.5-flash` |
//! | `DIGEST_ENDPOINT` | `https://generativelanguage.googleapis.com` |
//! | `DIGEST_TIMEOUT_SECS` | 30 |
//! | `DIGEST_ARTICLES` | none (built-in mock articles) |
//! | `DIGEST_SOURCE_LATENCY_MS` | 500 |
//! | `DIGEST_PREVIEW_COUNT` | 3 |
//! | `DIGEST_PAGE_SIZE` | 4 |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{DEFAULT_PAGE_SIZE, DEFAULT_PREVIEW_COUNT};
use crate::impls::gemini::GeminiConfig;
use crate::impls::mock_source::DEFAULT_LATENCY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// JSON article file; the built-in mock set when `None`.
    pub articles_path: Option<PathBuf>,
    /// Simulated latency of the mock source.
    pub latency: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            articles_path: None,
            latency: DEFAULT_LATENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    pub service: GeminiConfig,
    pub source: SourceConfig,
    pub preview_count: usize,
    pub page_size: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            service: GeminiConfig::default(),
            source: SourceConfig::default(),
            preview_count: DEFAULT_PREVIEW_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DigestConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "ignoring unreadable .env"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.service.api_key = get("GEMINI_API_KEY").or_else(|| get("VITE_GEMINI_API_KEY"));
        if config.service.api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; summaries and rewrites will fail as unconfigured");
        }
        if let Some(model) = get("DIGEST_MODEL") {
            config.service.model = model;
        }
        if let Some(endpoint) = get("DIGEST_ENDPOINT") {
            config.service.endpoint = endpoint;
        }
        if let Some(secs) = parse::<u64>(&get, "DIGEST_TIMEOUT_SECS")? {
            config.service.timeout = Duration::from_secs(secs);
        }

        config.source.articles_path = get("DIGEST_ARTICLES").map(PathBuf::from);
        if let Some(ms) = parse::<u64>(&get, "DIGEST_SOURCE_LATENCY_MS")? {
            config.source.latency = Duration::from_millis(ms);
        }

        if let Some(count) = parse::<usize>(&get, "DIGEST_PREVIEW_COUNT")? {
            config.preview_count = count;
        }
        if let Some(size) = parse::<usize>(&get, "DIGEST_PAGE_SIZE")? {
            if size == 0 {
                return Err(ConfigError::Invalid {
                    name: "DIGEST_PAGE_SIZE",
                    value: size.to_string(),
                });
            }
            config.page_size = size;
        }

        Ok(config)
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<DigestConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DigestConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, DigestConfig::default());
        assert_eq!(config.service.api_key, None);
        assert_eq!(config.preview_count, 3);
        assert_eq!(config.page_size, 4);
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("GEMINI_API_KEY", "k-123"),
            ("DIGEST_MODEL", "gemini-2.0-flash"),
            ("DIGEST_ENDPOINT", "http://localhost:9000"),
            ("DIGEST_TIMEOUT_SECS", "5"),
            ("DIGEST_ARTICLES", "/tmp/articles.json"),
            ("DIGEST_SOURCE_LATENCY_MS", "0"),
            ("DIGEST_PREVIEW_COUNT", "2"),
            ("DIGEST_PAGE_SIZE", "10"),
        ])
        .unwrap();

        assert_eq!(config.service.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.service.model, "gemini-2.0-flash");
        assert_eq!(config.service.endpoint, "http://localhost:9000");
        assert_eq!(config.service.timeout, Duration::from_secs(5));
        assert_eq!(
            config.source.articles_path,
            Some(PathBuf::from("/tmp/articles.json"))
        );
        assert_eq!(config.source.latency, Duration::ZERO);
        assert_eq!(config.preview_count, 2);
        assert_eq!(config.page_size, 10);
    }

    #[rstest]
    #[case::blank(&[("GEMINI_API_KEY", "   ")], None)]
    #[case::vite_fallback(&[("VITE_GEMINI_API_KEY", "vite-key")], Some("vite-key"))]
    #[case::primary_wins(&[("GEMINI_API_KEY", "main"), ("VITE_GEMINI_API_KEY", "vite")], Some("main"))]
    fn api_key_resolution(#[case] vars: &[(&str, &str)], #[case] expected: Option<&str>) {
        let config = load(vars).unwrap();
        assert_eq!(config.service.api_key.as_deref(), expected);
    }

    #[rstest]
    #[case::timeout("DIGEST_TIMEOUT_SECS", "soon")]
    #[case::page_size_zero("DIGEST_PAGE_SIZE", "0")]
    #[case::preview_negative("DIGEST_PREVIEW_COUNT", "-1")]
    fn rejects_invalid_numbers(#[case] name: &'static str, #[case] value: &str) {
        let err = load(&[(name, value)]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: n, .. } if n == name));
    }
}
