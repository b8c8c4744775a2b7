//! Hex resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Erlang/Elixir packages through the Hex API. A namespace selects
/// the organisation repository.
///
/// Latest rule: `latest_stable_version`, else `latest_version`.
pub struct HexResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    latest_version: Option<String>,
    latest_stable_version: Option<String>,
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    version: String,
    inserted_at: Option<String>,
}

impl HexResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Resolver for HexResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Hex
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let name = support::encode_segment(coordinate.name());
        let url = match coordinate.namespace() {
            Some(organisation) => format!(
                "{}/api/repos/{}/packages/{}",
                endpoint.base_url(),
                support::encode_segment(organisation),
                name
            ),
            None => format!("{}/api/packages/{}", endpoint.base_url(), name),
        };

        let document: PackageDocument =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let latest = document
            .latest_stable_version
            .or(document.latest_version)
            .filter(|version| !version.is_empty())
            .ok_or(ResolveError::NotFound)?;

        let published_at = document
            .releases
            .iter()
            .find(|release| release.version == latest)
            .and_then(|release| release.inserted_at.as_deref())
            .and_then(support::parse_timestamp);

        Ok(PackageMeta::new(latest, published_at))
    }
}
