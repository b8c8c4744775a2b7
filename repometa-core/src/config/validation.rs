//! Configuration validation module

use std::collections::HashSet;

use crate::config::{DispatchConfig, HttpConfig, LoggingConfig, WorkerConfig};
use crate::domain::RepositoryEndpoint;

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Worker configuration error: {message}")]
    Worker { message: String },

    #[error("HTTP configuration error: {message}")]
    Http { message: String },

    #[error("Dispatch configuration error: {message}")]
    Dispatch { message: String },

    #[error("Repository configuration error: {message}")]
    Repository { message: String },
}

impl ValidationError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::Dispatch {
            message: message.into(),
        }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::logging("Log level cannot be empty"));
        }
        if !matches!(self.format.as_str(), "json" | "pretty") {
            return Err(ValidationError::logging(format!(
                "Log format must be 'json' or 'pretty', got '{}'",
                self.format
            )));
        }
        Ok(())
    }
}

impl Validate for WorkerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.concurrency == 0 {
            return Err(ValidationError::worker(
                "Worker concurrency must be greater than 0",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::worker(
                "Queue capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validate for HttpConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.user_agent.trim().is_empty() {
            return Err(ValidationError::http("User agent cannot be empty"));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(ValidationError::http(
                "Connect timeout must be greater than 0",
            ));
        }
        if self.max_response_bytes == 0 {
            return Err(ValidationError::http(
                "Maximum response size must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.attempt_timeout_seconds == 0 {
            return Err(ValidationError::dispatch(
                "Attempt timeout must be greater than 0",
            ));
        }
        if self.request_deadline_seconds == Some(0) {
            return Err(ValidationError::dispatch(
                "Request deadline must be greater than 0 when set",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ValidationError::dispatch(
                "Retry max_attempts must be at least 1",
            ));
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ValidationError::dispatch(format!(
                "Backoff multiplier must be >= 1.0, got {}",
                self.retry.backoff_multiplier
            )));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(ValidationError::dispatch(
                "Initial retry delay cannot exceed the maximum delay",
            ));
        }
        Ok(())
    }
}

/// Endpoint URLs must be absolute http(s) URLs; identifiers non-empty and
/// unique per ecosystem.
pub fn validate_repositories(repositories: &[RepositoryEndpoint]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for repository in repositories {
        if repository.identifier.trim().is_empty() {
            return Err(ValidationError::repository(format!(
                "Repository for {} has an empty identifier",
                repository.ecosystem
            )));
        }

        match url::Url::parse(&repository.url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(ValidationError::repository(format!(
                    "Repository '{}' uses unsupported scheme '{}'",
                    repository.identifier,
                    parsed.scheme()
                )));
            }
            Err(e) => {
                return Err(ValidationError::repository(format!(
                    "Repository '{}' has an invalid URL '{}': {}",
                    repository.identifier, repository.url, e
                )));
            }
        }

        if !seen.insert((repository.ecosystem, repository.identifier.as_str())) {
            return Err(ValidationError::repository(format!(
                "Duplicate repository identifier '{}' for {}",
                repository.identifier, repository.ecosystem
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfigSerializable;
    use crate::domain::{Ecosystem, RepositoryEndpoint};

    #[test]
    fn test_worker_config_validation() {
        let valid = WorkerConfig::default();
        assert!(valid.validate().is_ok());

        let invalid = WorkerConfig {
            concurrency: 0,
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        let invalid = WorkerConfig {
            queue_capacity: 0,
            ..valid
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_http_config_validation() {
        assert!(HttpConfig::default().validate().is_ok());

        let invalid = HttpConfig {
            max_response_bytes: 0,
            ..HttpConfig::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_dispatch_config_validation() {
        let valid = DispatchConfig::default();
        assert!(valid.validate().is_ok());

        let invalid = DispatchConfig {
            attempt_timeout_seconds: 0,
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        let invalid = DispatchConfig {
            retry: RetryConfigSerializable {
                max_attempts: 0,
                ..RetryConfigSerializable::default()
            },
            ..valid.clone()
        };
        assert!(invalid.validate().is_err());

        let invalid = DispatchConfig {
            retry: RetryConfigSerializable {
                backoff_multiplier: 0.5,
                ..RetryConfigSerializable::default()
            },
            ..valid
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_logging_format_validation() {
        let invalid = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_repository_validation() {
        let valid = vec![
            RepositoryEndpoint::new(Ecosystem::Maven, "central", "https://repo1.maven.org/maven2", 2),
            RepositoryEndpoint::new(Ecosystem::Maven, "internal", "http://nexus.local/maven", 1),
            RepositoryEndpoint::new(Ecosystem::Npm, "central", "https://registry.npmjs.org", 1),
        ];
        assert!(validate_repositories(&valid).is_ok());

        let duplicate = vec![
            RepositoryEndpoint::new(Ecosystem::Maven, "central", "https://a.example.com", 1),
            RepositoryEndpoint::new(Ecosystem::Maven, "central", "https://b.example.com", 2),
        ];
        assert!(validate_repositories(&duplicate).is_err());

        let bad_url = vec![RepositoryEndpoint::new(Ecosystem::Gem, "gems", "not-a-url", 1)];
        assert!(validate_repositories(&bad_url).is_err());

        let bad_scheme = vec![RepositoryEndpoint::new(Ecosystem::Gem, "gems", "ftp://gems.local", 1)];
        assert!(validate_repositories(&bad_scheme).is_err());

        let empty_identifier = vec![RepositoryEndpoint::new(Ecosystem::Gem, " ", "https://rubygems.org", 1)];
        assert!(validate_repositories(&empty_identifier).is_err());
    }
}
