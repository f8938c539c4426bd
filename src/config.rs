//! Configuration types for mugimugi-image

use crate::error::{Error, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Image client configuration (server location, sharding, concurrency, retries)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the image server (default: "https://img.doujinshi.org")
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Divisor applied to an image id to get its bucket path segment (default: 2000)
    #[serde(default = "default_image_modulo")]
    pub image_modulo: u64,

    /// Maximum number of fetches in flight at once (default: 10)
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Retry policy applied to each fetch
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            image_modulo: default_image_modulo(),
            parallel: default_parallel(),
            request_timeout: default_request_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Check the settings that would otherwise fail later at request time
    pub fn validate(&self) -> Result<()> {
        if self.parallel == 0 {
            return Err(Error::config("parallel must be at least 1", "parallel"));
        }
        if self.image_modulo == 0 {
            return Err(Error::config(
                "image_modulo must be at least 1",
                "image_modulo",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::config(
                "request_timeout must be greater than zero",
                "request_timeout",
            ));
        }
        url::Url::parse(&self.api_url).map_err(|e| {
            Error::config(format!("invalid api_url '{}': {e}", self.api_url), "api_url")
        })?;
        self.retry.validate()
    }

    /// Pool settings derived from this configuration
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            concurrency: self.parallel,
            retry: self.retry.clone(),
        }
    }
}

/// Retry policy for a single item's attempt sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts per item, first one included (default: 2)
    #[serde(default = "default_try_limit")]
    pub try_limit: u32,

    /// Error kinds eligible for retry; an empty list disables retrying
    #[serde(default = "default_retry_on")]
    pub retry_on: Vec<ErrorKind>,

    /// Delay before the first retry (default: 0, retry immediately)
    #[serde(default, with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            try_limit: default_try_limit(),
            retry_on: default_retry_on(),
            initial_delay: Duration::ZERO,
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Reject backoff settings that cannot produce a delay
    pub fn validate(&self) -> Result<()> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(Error::config(
                format!(
                    "backoff_multiplier must be a finite number >= 1.0, got {}",
                    self.backoff_multiplier
                ),
                "backoff_multiplier",
            ));
        }
        Ok(())
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            try_limit: 1,
            retry_on: Vec::new(),
            ..Self::default()
        }
    }
}

/// Settings for one task pool
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of tasks in flight at once
    pub concurrency: usize,
    /// Retry policy wrapped around every task
    pub retry: RetryConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: default_parallel(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_api_url() -> String {
    "https://img.doujinshi.org".to_string()
}

fn default_image_modulo() -> u64 {
    2000
}

fn default_parallel() -> usize {
    10
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_try_limit() -> u32 {
    2
}

fn default_retry_on() -> Vec<ErrorKind> {
    vec![ErrorKind::Timeout, ErrorKind::Connect, ErrorKind::HttpStatus]
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (seconds, fractional part kept)
mod duration_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid duration {secs}: {e}")))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.image_modulo, 2000);
        assert_eq!(config.parallel, 10);
        assert_eq!(config.retry.try_limit, 2);
        assert_eq!(
            config.retry.retry_on,
            vec![ErrorKind::Timeout, ErrorKind::Connect, ErrorKind::HttpStatus]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize failed");
        assert_eq!(config.api_url, "https://img.doujinshi.org");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.retry.initial_delay, Duration::ZERO);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "api_url": "http://localhost:8080",
            "parallel": 4,
            "retry": {"try_limit": 5, "retry_on": ["timeout"], "initial_delay": 1}
        }"#;
        let config: Config = serde_json::from_str(json).expect("deserialize failed");

        assert_eq!(config.parallel, 4);
        assert_eq!(config.image_modulo, 2000);
        assert_eq!(config.retry.try_limit, 5);
        assert_eq!(config.retry.retry_on, vec![ErrorKind::Timeout]);
        assert_eq!(config.retry.initial_delay, Duration::from_secs(1));
        assert!(config.retry.jitter);
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let config = Config {
            request_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        let json = serde_json::to_value(&config).expect("serialize failed");
        assert_eq!(json["request_timeout"], 5);
        assert_eq!(json["retry"]["max_delay"], 10);
        assert_eq!(json["retry"]["retry_on"][2], "http_status");
    }

    #[test]
    fn validate_rejects_zero_parallel() {
        let config = Config {
            parallel: 0,
            ..Config::default()
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("parallel")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_zero_modulo_and_bad_url() {
        let config = Config {
            image_modulo: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            api_url: "not a url".to_string(),
            ..Config::default()
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("api_url")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn pool_config_follows_parallel_and_retry() {
        let config = Config {
            parallel: 3,
            retry: RetryConfig::none(),
            ..Config::default()
        };
        let pool = config.pool_config();
        assert_eq!(pool.concurrency, 3);
        assert_eq!(pool.retry.try_limit, 1);
        assert!(pool.retry.retry_on.is_empty());
    }

    #[test]
    fn validate_rejects_zero_request_timeout() {
        let config = Config {
            request_timeout: Duration::ZERO,
            ..Config::default()
        };
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("request_timeout")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_unusable_backoff_multiplier() {
        for multiplier in [-1.0, 0.5, f64::NAN, f64::INFINITY] {
            let config = RetryConfig {
                backoff_multiplier: multiplier,
                ..RetryConfig::default()
            };
            match config.validate() {
                Err(Error::Config { key, .. }) => {
                    assert_eq!(key.as_deref(), Some("backoff_multiplier"))
                }
                other => panic!("multiplier {multiplier}: expected config error, got {other:?}"),
            }
        }
        assert!(RetryConfig::default().validate().is_ok());
        assert!(RetryConfig::none().validate().is_ok());
    }

    #[test]
    fn negative_multiplier_from_json_fails_validation() {
        let config: Config = serde_json::from_str(r#"{"retry":{"backoff_multiplier":-1.0}}"#)
            .expect("deserialize failed");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn sub_second_durations_round_trip() {
        let config = Config {
            request_timeout: Duration::from_millis(500),
            retry: RetryConfig {
                initial_delay: Duration::from_millis(250),
                ..RetryConfig::default()
            },
            ..Config::default()
        };
        let json = serde_json::to_string(&config).expect("serialize failed");
        let back: Config = serde_json::from_str(&json).expect("deserialize failed");

        assert_eq!(back.request_timeout, Duration::from_millis(500));
        assert_eq!(back.retry.initial_delay, Duration::from_millis(250));
        assert_eq!(back.retry.max_delay, Duration::from_secs(10));
        assert!(back.validate().is_ok());
    }

    #[test]
    fn negative_duration_is_rejected_on_load() {
        let result = serde_json::from_str::<Config>(r#"{"request_timeout": -1}"#);
        assert!(result.is_err());
    }
}
