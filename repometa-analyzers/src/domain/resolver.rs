//! Resolver capability shared by every ecosystem variant

use async_trait::async_trait;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};

/// Ecosystem-specific strategy that queries one endpoint and normalizes its
/// answer into [`PackageMeta`].
///
/// Implementations issue their HTTP requests to `endpoint.url`, attach
/// `endpoint.credentials` when present and never take longer than `deadline`
/// per request. Each variant applies exactly one "latest" rule, documented on
/// the type.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Ecosystem this resolver is registered under.
    fn ecosystem(&self) -> Ecosystem;

    fn supports(&self, ecosystem: Ecosystem) -> bool {
        self.ecosystem() == ecosystem
    }

    /// Resolve the latest version of `coordinate` at `endpoint`.
    ///
    /// A package unknown to the endpoint is [`ResolveError::NotFound`], which
    /// callers treat as a negative answer rather than a failure.
    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError>;
}
