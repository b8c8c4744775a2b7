//! RubyGems resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// RubyGems answers unknown gems with this placeholder instead of a 404.
const UNKNOWN_VERSION: &str = "unknown";

/// Resolves gems through the RubyGems `latest.json` API.
///
/// Latest rule: the `version` field as reported by the server.
pub struct GemResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct LatestVersion {
    version: String,
}

impl GemResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Resolver for GemResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Gem
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/api/v1/versions/{}/latest.json",
            endpoint.base_url(),
            support::encode_segment(coordinate.name())
        );

        let latest: LatestVersion =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        if latest.version.is_empty() || latest.version == UNKNOWN_VERSION {
            return Err(ResolveError::NotFound);
        }

        Ok(PackageMeta::new(latest.version, None))
    }
}
