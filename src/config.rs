//! Configuration for the recognition-service client, the corpus source, and
//! the match engine.
//!
//! Everything here is serde-friendly with per-field defaults so deployments
//! can override only what they need. Endpoints are explicit constructor
//! inputs for the clients; nothing reads ambient global state except the
//! optional [`FacegateConfig::from_env`] helper, which applies a small set of
//! environment overrides on top of the defaults.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment override for the recognition service base URL.
pub const SERVICE_URL_ENV: &str = "FACEGATE_SERVICE_URL";
/// Environment override for the corpus store base URL.
pub const STORE_URL_ENV: &str = "FACEGATE_STORE_URL";
/// Environment override for the similarity threshold (0–100).
pub const THRESHOLD_ENV: &str = "FACEGATE_SIMILARITY_THRESHOLD";

/// Errors produced while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FacegateConfig {
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl FacegateConfig {
    /// Defaults with environment overrides applied, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Ok(url) = env::var(SERVICE_URL_ENV) {
            cfg.recognizer.base_url = url;
        }
        if let Ok(url) = env::var(STORE_URL_ENV) {
            cfg.corpus.base_url = url;
        }
        if let Ok(raw) = env::var(THRESHOLD_ENV) {
            cfg.engine.similarity_threshold = raw.trim().parse::<f32>().map_err(|_| {
                ConfigError::Invalid(format!("{THRESHOLD_ENV} must be a number, got '{raw}'"))
            })?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recognizer.validate()?;
        self.corpus.validate()?;
        self.engine.validate()
    }
}

/// Recognition-service client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizerConfig {
    /// Base URL of the recognition service.
    #[serde(default = "default_service_url")]
    pub base_url: String,
    /// Wall-clock cap for a single request; a timed-out comparator call is
    /// treated like any other per-call failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl RecognizerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "recognizer.base_url must not be empty".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "recognizer.request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Corpus store client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusConfig {
    /// Base URL of the document store's read API.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    #[serde(default = "default_corpus_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl CorpusConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "corpus.base_url must not be empty".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "corpus.request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            request_timeout_secs: default_corpus_timeout_secs(),
        }
    }
}

/// Match engine policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Similarity percentage (0–100) a candidate must reach to qualify.
    ///
    /// The default of 70 leaves headroom against false positives while
    /// tolerating lighting and pose variance: the delegated comparator
    /// reports 85–95% for true matches and meaningfully lower otherwise.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "engine.similarity_threshold must be within 0–100, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_service_url() -> String {
    "http://localhost:5000".into()
}

fn default_store_url() -> String {
    "http://localhost:8080".into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_corpus_timeout_secs() -> u64 {
    10
}

fn default_similarity_threshold() -> f32 {
    70.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = FacegateConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.recognizer.base_url, "http://localhost:5000");
        assert_eq!(cfg.recognizer.request_timeout_secs, 30);
        assert_eq!(cfg.recognizer.connect_timeout_secs, 10);
        assert_eq!(cfg.engine.similarity_threshold, 70.0);
    }

    #[test]
    fn empty_json_object_uses_defaults() {
        let cfg: FacegateConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, FacegateConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg: FacegateConfig = serde_json::from_str(
            r#"{ "engine": { "similarity_threshold": 85.0 },
                 "recognizer": { "base_url": "http://faces:5000" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.engine.similarity_threshold, 85.0);
        assert_eq!(cfg.recognizer.base_url, "http://faces:5000");
        assert_eq!(cfg.recognizer.request_timeout_secs, 30);
        assert_eq!(cfg.corpus, CorpusConfig::default());
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        let cfg = FacegateConfig {
            engine: EngineConfig {
                similarity_threshold: 120.0,
            },
            ..Default::default()
        };
        let err = cfg.validate().expect_err("config should be invalid");
        assert!(err.to_string().contains("similarity_threshold"));

        let cfg = FacegateConfig {
            engine: EngineConfig {
                similarity_threshold: -1.0,
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_base_url_rejected() {
        let cfg = FacegateConfig {
            recognizer: RecognizerConfig {
                base_url: "  ".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = cfg.validate().expect_err("config should be invalid");
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = FacegateConfig {
            corpus: CorpusConfig {
                request_timeout_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        // All FACEGATE_* mutations live in this single test so parallel test
        // threads never race on the process environment.
        unsafe {
            env::set_var(SERVICE_URL_ENV, "http://recognizer:5000");
            env::set_var(STORE_URL_ENV, "http://store:8080");
            env::set_var(THRESHOLD_ENV, "82.5");
        }

        let cfg = FacegateConfig::from_env().expect("overrides should validate");
        assert_eq!(cfg.recognizer.base_url, "http://recognizer:5000");
        assert_eq!(cfg.corpus.base_url, "http://store:8080");
        assert_eq!(cfg.engine.similarity_threshold, 82.5);

        unsafe {
            env::set_var(THRESHOLD_ENV, "not-a-number");
        }
        let err = FacegateConfig::from_env().expect_err("bad threshold should fail");
        assert!(err.to_string().contains(THRESHOLD_ENV));

        unsafe {
            env::set_var(THRESHOLD_ENV, "150");
        }
        assert!(FacegateConfig::from_env().is_err());

        unsafe {
            env::remove_var(SERVICE_URL_ENV);
            env::remove_var(STORE_URL_ENV);
            env::remove_var(THRESHOLD_ENV);
        }
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = FacegateConfig {
            recognizer: RecognizerConfig {
                base_url: "http://faces:5000".into(),
                request_timeout_secs: 15,
                connect_timeout_secs: 5,
            },
            corpus: CorpusConfig {
                base_url: "http://store:9000".into(),
                request_timeout_secs: 5,
            },
            engine: EngineConfig {
                similarity_threshold: 75.0,
            },
        };

        let serialized = serde_json::to_string(&cfg).unwrap();
        let back: FacegateConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, cfg);
    }
}
