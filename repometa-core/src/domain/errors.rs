//! Error taxonomy for coordinate parsing and per-endpoint resolution.

/// Error returned by the coordinate parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    /// The raw string does not follow `pkg:type/[namespace/]name@version`.
    #[error("malformed coordinate: {0}")]
    Malformed(String),

    /// The package type is not one of the supported ecosystems.
    #[error("unsupported ecosystem: {0}")]
    UnsupportedEcosystem(String),
}

impl CoordinateError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Failure of a single resolution attempt against one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The coordinate is unknown at this endpoint. A valid negative result.
    #[error("package not found")]
    NotFound,

    /// Connection or DNS failure.
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The attempt did not complete within its deadline.
    #[error("request timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Non-2xx status other than "not found".
    #[error("upstream error: status={status}, {message}")]
    UpstreamError { status: u16, message: String },

    /// 2xx response whose body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ResolveError {
    /// Only infrastructural failures are retried against the same endpoint.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::Unreachable(_) | ResolveError::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout {
            millis: duration.as_millis() as u64,
        }
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::MalformedResponse(format!("JSON parse error: {}", err))
    }
}
