//! Hackage resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Haskell packages from a Hackage server.
///
/// Latest rule: the first entry of `normal-version` in the package's
/// preferred-versions document (Hackage lists them newest first). Hackage
/// does not expose a publish time there.
pub struct HackageResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct PreferredVersions {
    #[serde(rename = "normal-version", default)]
    normal_version: Vec<String>,
}

impl HackageResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Resolver for HackageResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Hackage
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/package/{}/preferred",
            endpoint.base_url(),
            support::encode_segment(coordinate.name())
        );
        let request = support::get(endpoint, url, deadline).with_header("Accept", "application/json");

        let preferred: PreferredVersions = support::fetch_json(self.http.as_ref(), request).await?;
        let latest = preferred
            .normal_version
            .into_iter()
            .next()
            .ok_or(ResolveError::NotFound)?;

        Ok(PackageMeta::new(latest, None))
    }
}
