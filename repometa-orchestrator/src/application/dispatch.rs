//! Dispatch Engine
//!
//! Drives a single [`AnalysisRequest`] from parsing to its one terminal
//! [`AnalysisResult`]:
//!
//! ```text
//! PARSING -> RESOLVING(endpoint i of N) -> { RESOLVED | EXHAUSTED } -> EMITTED
//! ```
//!
//! Endpoints are tried strictly one after another in resolution order. The
//! first success wins; every other per-endpoint outcome falls through to the
//! next endpoint. Only `Unreachable` and `Timeout` are retried against the
//! same endpoint.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use repometa_analyzers::domain::Resolver;
use repometa_analyzers::infrastructure::ResolverRegistry;
use repometa_core::config::DispatchConfig;
use repometa_core::domain::{
    AnalysisOutcome, AnalysisRequest, AnalysisResult, Coordinate, CoordinateError,
    RepositoryEndpoint, ResolveError,
};
use repometa_core::infrastructure::{EndpointSelector, RetryConfig, retry_with_backoff};

use crate::domain::{ResolverAttemptOutcome, aggregate_outcome};

/// Timing policy applied to every request.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Upper bound for a single resolver call.
    pub attempt_timeout: Duration,
    /// Per-endpoint retry policy for `Unreachable` / `Timeout`.
    pub retry: RetryConfig,
    /// Fixed per-request deadline. Derived from the endpoint budgets when unset.
    pub request_deadline: Option<Duration>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl DispatchSettings {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            attempt_timeout: config.attempt_timeout(),
            retry: config.retry.to_retry_config(),
            request_deadline: config.request_deadline(),
        }
    }

    /// Worst-case time one endpoint can consume: every attempt timing out
    /// plus the longest possible backoff sleeps.
    pub fn endpoint_budget(&self) -> Duration {
        self.attempt_timeout
            .saturating_mul(self.retry.max_attempts.max(1))
            .saturating_add(self.retry.max_total_backoff())
    }

    /// Deadline for a request that will visit `endpoint_count` endpoints.
    pub fn deadline_for(&self, endpoint_count: usize) -> Duration {
        self.request_deadline.unwrap_or_else(|| {
            let count = u32::try_from(endpoint_count).unwrap_or(u32::MAX);
            self.endpoint_budget().saturating_mul(count)
        })
    }
}

/// Runs analysis requests against the resolver registry and endpoint table.
///
/// Holds only immutable, shareable state; one engine serves every concurrent
/// request.
pub struct DispatchEngine {
    registry: Arc<ResolverRegistry>,
    selector: EndpointSelector,
    settings: DispatchSettings,
}

impl DispatchEngine {
    pub fn new(
        registry: Arc<ResolverRegistry>,
        selector: EndpointSelector,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            registry,
            selector,
            settings,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Produce the single result for `request`. Never fails: every failure is
    /// expressed through the result's outcome.
    pub async fn dispatch(&self, request: &AnalysisRequest) -> AnalysisResult {
        let coordinate = match Coordinate::parse(&request.purl) {
            Ok(coordinate) => coordinate,
            Err(err) => {
                let outcome = match err {
                    CoordinateError::UnsupportedEcosystem(_) => AnalysisOutcome::UnsupportedEcosystem,
                    CoordinateError::Malformed(_) => AnalysisOutcome::MalformedCoordinate,
                };
                warn!(
                    correlation_key = %request.correlation_key,
                    purl = %request.purl,
                    error = %err,
                    "Rejecting coordinate"
                );
                return AnalysisResult::unresolved(request, outcome);
            }
        };

        let ecosystem = coordinate.ecosystem();
        let Some(resolver) = self.registry.resolver_for(ecosystem) else {
            warn!(
                correlation_key = %request.correlation_key,
                ecosystem = %ecosystem,
                "No resolver registered for ecosystem"
            );
            return AnalysisResult::unresolved(request, AnalysisOutcome::UnsupportedEcosystem);
        };

        let endpoints = self.selector.endpoints_for(ecosystem);
        if endpoints.is_empty() {
            warn!(
                correlation_key = %request.correlation_key,
                ecosystem = %ecosystem,
                "No enabled repository endpoint configured"
            );
            return AnalysisResult::unresolved(request, AnalysisOutcome::UpstreamFailure);
        }

        let deadline = self.settings.deadline_for(endpoints.len());
        match tokio::time::timeout(
            deadline,
            self.resolve_in_order(request, &coordinate, resolver.as_ref(), &endpoints),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    correlation_key = %request.correlation_key,
                    purl = %request.purl,
                    deadline_ms = deadline.as_millis() as u64,
                    "Request deadline exceeded"
                );
                AnalysisResult::unresolved(request, AnalysisOutcome::UpstreamFailure)
            }
        }
    }

    async fn resolve_in_order(
        &self,
        request: &AnalysisRequest,
        coordinate: &Coordinate,
        resolver: &dyn Resolver,
        endpoints: &[RepositoryEndpoint],
    ) -> AnalysisResult {
        let mut outcomes = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            let outcome = self.try_endpoint(coordinate, resolver, endpoint).await;

            if let Some(meta) = outcome.meta() {
                info!(
                    correlation_key = %request.correlation_key,
                    purl = %request.purl,
                    endpoint = %endpoint.identifier,
                    latest_version = %meta.latest_version,
                    attempts = outcome.attempts,
                    "Coordinate resolved"
                );
                return AnalysisResult::resolved(request, meta, &endpoint.identifier);
            }

            if outcome.is_not_found() {
                debug!(
                    correlation_key = %request.correlation_key,
                    endpoint = %endpoint.identifier,
                    "Package not found at endpoint, trying next"
                );
            } else {
                warn!(
                    correlation_key = %request.correlation_key,
                    endpoint = %endpoint.identifier,
                    failure = ?outcome.failure_kind,
                    attempts = outcome.attempts,
                    "Endpoint failed, trying next"
                );
            }
            outcomes.push(outcome);
        }

        let outcome = aggregate_outcome(&outcomes);
        info!(
            correlation_key = %request.correlation_key,
            purl = %request.purl,
            outcome = %outcome,
            endpoints_tried = outcomes.len(),
            "All endpoints exhausted"
        );
        AnalysisResult::unresolved(request, outcome)
    }

    /// One endpoint, with its retry budget.
    async fn try_endpoint(
        &self,
        coordinate: &Coordinate,
        resolver: &dyn Resolver,
        endpoint: &RepositoryEndpoint,
    ) -> ResolverAttemptOutcome {
        let attempt_timeout = self.settings.attempt_timeout;
        let mut attempts = 0u32;

        let result = retry_with_backoff(&self.settings.retry, ResolveError::is_retryable, |attempt| {
            attempts = attempt;
            async move {
                match tokio::time::timeout(
                    attempt_timeout,
                    resolver.resolve(coordinate, endpoint, attempt_timeout),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ResolveError::timeout(attempt_timeout)),
                }
            }
        })
        .await;

        match result {
            Ok(meta) => ResolverAttemptOutcome::success(&endpoint.identifier, meta, attempts),
            Err(err) => ResolverAttemptOutcome::failure(&endpoint.identifier, &err, attempts),
        }
    }
}
