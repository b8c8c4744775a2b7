//! Analysis request / result records exchanged with the message channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized answer of a resolver: the latest version and when it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub latest_version: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl PackageMeta {
    pub fn new(latest_version: impl Into<String>, published_at: Option<DateTime<Utc>>) -> Self {
        Self {
            latest_version: latest_version.into(),
            published_at,
        }
    }
}

/// A request to resolve one coordinate, created on message arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Opaque identifier linking this request to its result.
    pub correlation_key: String,
    /// Raw package coordinate as received.
    pub purl: String,
}

impl AnalysisRequest {
    pub fn new(correlation_key: impl Into<String>, purl: impl Into<String>) -> Self {
        Self {
            correlation_key: correlation_key.into(),
            purl: purl.into(),
        }
    }
}

/// Terminal outcome of one analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisOutcome {
    Resolved,
    NotFound,
    UnsupportedEcosystem,
    MalformedCoordinate,
    UpstreamFailure,
}

impl AnalysisOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::Resolved => "RESOLVED",
            AnalysisOutcome::NotFound => "NOT_FOUND",
            AnalysisOutcome::UnsupportedEcosystem => "UNSUPPORTED_ECOSYSTEM",
            AnalysisOutcome::MalformedCoordinate => "MALFORMED_COORDINATE",
            AnalysisOutcome::UpstreamFailure => "UPSTREAM_FAILURE",
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result emitted per [`AnalysisRequest`].
///
/// Serializes to the outbound payload. The correlation key travels as the
/// message key and is not part of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(skip)]
    pub correlation_key: String,
    pub purl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Identifier of the endpoint that produced the resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub outcome: AnalysisOutcome,
}

impl AnalysisResult {
    pub fn resolved(request: &AnalysisRequest, meta: PackageMeta, repository: &str) -> Self {
        Self {
            correlation_key: request.correlation_key.clone(),
            purl: request.purl.clone(),
            latest_version: Some(meta.latest_version),
            published_at: meta.published_at,
            repository: Some(repository.to_string()),
            outcome: AnalysisOutcome::Resolved,
        }
    }

    /// A result without resolution data for any non-`Resolved` outcome.
    pub fn unresolved(request: &AnalysisRequest, outcome: AnalysisOutcome) -> Self {
        Self {
            correlation_key: request.correlation_key.clone(),
            purl: request.purl.clone(),
            latest_version: None,
            published_at: None,
            repository: None,
            outcome,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome == AnalysisOutcome::Resolved
    }
}
