//! Per-endpoint attempt records
//!
//! One [`ResolverAttemptOutcome`] is produced for every endpoint a request
//! visits. They live only for the duration of a single dispatch.

use chrono::{DateTime, Utc};
use std::fmt;

use repometa_core::domain::{AnalysisOutcome, PackageMeta, ResolveError};

/// Why an endpoint did not produce a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotFound,
    Unreachable,
    Timeout,
    UpstreamError,
    MalformedResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Unreachable => "unreachable",
            FailureKind::Timeout => "timeout",
            FailureKind::UpstreamError => "upstream_error",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ResolveError> for FailureKind {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::NotFound => FailureKind::NotFound,
            ResolveError::Unreachable(_) => FailureKind::Unreachable,
            ResolveError::Timeout { .. } => FailureKind::Timeout,
            ResolveError::UpstreamError { .. } => FailureKind::UpstreamError,
            ResolveError::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Result of trying one endpoint, after its retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverAttemptOutcome {
    /// Identifier of the endpoint that was tried.
    pub endpoint: String,
    pub succeeded: bool,
    pub latest_version: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub failure_kind: Option<FailureKind>,
    /// Number of requests issued against this endpoint.
    pub attempts: u32,
}

impl ResolverAttemptOutcome {
    pub fn success(endpoint: impl Into<String>, meta: PackageMeta, attempts: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            succeeded: true,
            latest_version: Some(meta.latest_version),
            published_at: meta.published_at,
            failure_kind: None,
            attempts,
        }
    }

    pub fn failure(endpoint: impl Into<String>, error: &ResolveError, attempts: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            succeeded: false,
            latest_version: None,
            published_at: None,
            failure_kind: Some(FailureKind::from(error)),
            attempts,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.failure_kind == Some(FailureKind::NotFound)
    }

    /// Resolved data of a successful attempt.
    pub fn meta(&self) -> Option<PackageMeta> {
        match (&self.latest_version, self.succeeded) {
            (Some(version), true) => Some(PackageMeta::new(version.clone(), self.published_at)),
            _ => None,
        }
    }
}

/// Outcome of a request whose endpoints were all exhausted without success.
///
/// `NotFound` only when at least one endpoint was tried and every one of them
/// explicitly reported the package as unknown.
pub fn aggregate_outcome(outcomes: &[ResolverAttemptOutcome]) -> AnalysisOutcome {
    if !outcomes.is_empty() && outcomes.iter().all(ResolverAttemptOutcome::is_not_found) {
        AnalysisOutcome::NotFound
    } else {
        AnalysisOutcome::UpstreamFailure
    }
}
