//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::{Ecosystem, RepositoryEndpoint};
use crate::infrastructure::resilience::RetryConfig;

/// Retry configuration (serializable version)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfigSerializable {
    /// Total attempts per endpoint, including the first
    pub max_attempts: u32,
    /// Initial delay between retries (in milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Randomize delays by up to 25%
    pub jitter: bool,
}

impl Default for RetryConfigSerializable {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfigSerializable {
    /// Convert to the runtime RetryConfig
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub worker: WorkerConfig,
    pub http: HttpConfig,
    pub dispatch: DispatchConfig,
    /// Repository endpoint table. Replaces the public defaults when set.
    pub repositories: Vec<RepositoryEndpoint>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            worker: WorkerConfig::default(),
            http: HttpConfig::default(),
            dispatch: DispatchConfig::default(),
            repositories: Ecosystem::ALL
                .into_iter()
                .map(RepositoryEndpoint::public_default)
                .collect(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Requests processed concurrently
    pub concurrency: usize,
    /// Capacity of the in-process request/result buffers
    pub queue_capacity: usize,
    /// Time allowed for in-flight requests to finish on shutdown
    pub shutdown_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            queue_capacity: 64,
            shutdown_timeout_seconds: 10,
        }
    }
}

/// Shared HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub connect_timeout_seconds: u64,
    pub pool_idle_timeout_seconds: u64,
    /// Upper bound on a response body; larger bodies are rejected
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("repometa/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_seconds: 5,
            pool_idle_timeout_seconds: 90,
            max_response_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Dispatch engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Deadline of a single resolver attempt (in seconds)
    pub attempt_timeout_seconds: u64,
    /// Overall per-request deadline; derived from the endpoint budgets when unset
    pub request_deadline_seconds: Option<u64>,
    pub retry: RetryConfigSerializable,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_seconds: 10,
            request_deadline_seconds: None,
            retry: RetryConfigSerializable::default(),
        }
    }
}

impl DispatchConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_seconds)
    }

    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_seconds.map(Duration::from_secs)
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.worker.validate()?;
        self.http.validate()?;
        self.dispatch.validate()?;
        validation::validate_repositories(&self.repositories)?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("REPOMETA")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config: Config = builder.build()?.try_deserialize()?;

        // Validate the loaded configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a single file, without environment overrides.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigLoadError> {
        let config: Config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
