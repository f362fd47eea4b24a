//! Configuration management for the question answering service
//!
//! Settings come from environment variables with documented defaults.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::search::ScorerKind;

pub const DEFAULT_PORT: u16 = 8090;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_CORPUS_PATH: &str = "./corpus.json";
pub const DEFAULT_MATCH_COUNT: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path of the persisted corpus file
    pub corpus_path: PathBuf,
    /// Number of answers returned per question
    pub match_count: usize,
    /// Similarity scorer used for ranking
    pub scorer: ScorerKind,
    /// Deadline for a whole HTTP request
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            match_count: DEFAULT_MATCH_COUNT,
            scorer: ScorerKind::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - PORT: Listen port (default: 8090)
    /// - HOST: Bind address (default: "0.0.0.0")
    /// - CORPUS_PATH: Corpus file (default: "./corpus.json")
    /// - MATCH_COUNT: Answers per question, must be a positive integer (default: 5)
    /// - SCORER: "jaccard" or "edit_distance" (default: "jaccard")
    /// - REQUEST_TIMEOUT_MS: HTTP request deadline (default: 10000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| anyhow!("Invalid PORT: {}", value))?,
            None => defaults.port,
        };

        let host = lookup("HOST").unwrap_or(defaults.host);

        let corpus_path = lookup("CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.corpus_path);

        let match_count = match lookup("MATCH_COUNT") {
            Some(value) => parse_match_count(&value)?,
            None => defaults.match_count,
        };

        let scorer = match lookup("SCORER") {
            Some(value) => value.parse::<ScorerKind>().map_err(|e| anyhow!(e))?,
            None => defaults.scorer,
        };

        let request_timeout_ms = match lookup("REQUEST_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("Invalid REQUEST_TIMEOUT_MS: {}", value))?,
            None => defaults.request_timeout_ms,
        };

        Ok(Self {
            host,
            port,
            corpus_path,
            match_count,
            scorer,
            request_timeout_ms,
        })
    }
}

/// Parse a match count, rejecting non-numeric and non-positive values
pub fn parse_match_count(value: &str) -> Result<usize> {
    let count: i64 = value
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid match count: {}", value))?;

    if count <= 0 {
        return Err(anyhow!("Invalid match count: {} (must be positive)", count));
    }

    usize::try_from(count).map_err(|_| anyhow!("Invalid match count: {}", count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServiceConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.port, 8090);
        assert_eq!(config.corpus_path, PathBuf::from("./corpus.json"));
        assert_eq!(config.match_count, 5);
        assert_eq!(config.scorer, ScorerKind::Jaccard);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("CORPUS_PATH", "/data/qa.json"),
            ("MATCH_COUNT", "3"),
            ("SCORER", "edit_distance"),
            ("REQUEST_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.corpus_path, PathBuf::from("/data/qa.json"));
        assert_eq!(config.match_count, 3);
        assert_eq!(config.scorer, ScorerKind::EditDistance);
        assert_eq!(config.request_timeout_ms, 250);
    }

    #[test]
    fn test_invalid_match_count_is_fatal() {
        for value in ["abc", "0", "-2", ""] {
            assert!(
                config_from(&[("MATCH_COUNT", value)]).is_err(),
                "MATCH_COUNT={:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_invalid_port_and_scorer() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("SCORER", "cosine")]).is_err());
    }

    #[test]
    fn test_parse_match_count() {
        assert_eq!(parse_match_count(" 7 ").unwrap(), 7);
        assert!(parse_match_count("1.5").is_err());
    }
}
