//! crates.io resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Rust crates through the crates.io web API.
///
/// Latest rule: `crate.max_stable_version`, else `crate.max_version`.
pub struct CargoResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct CrateDocument {
    #[serde(rename = "crate")]
    krate: CrateInfo,
    #[serde(default)]
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    max_version: Option<String>,
    max_stable_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    created_at: Option<String>,
}

impl CargoResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Resolver for CargoResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/api/v1/crates/{}",
            endpoint.base_url(),
            support::encode_segment(coordinate.name())
        );

        let document: CrateDocument =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let latest = document
            .krate
            .max_stable_version
            .or(document.krate.max_version)
            .filter(|version| !version.is_empty())
            .ok_or_else(|| ResolveError::malformed("crate has no max_version"))?;

        let published_at = document
            .versions
            .iter()
            .find(|version| version.num == latest)
            .and_then(|version| version.created_at.as_deref())
            .and_then(support::parse_timestamp);

        Ok(PackageMeta::new(latest, published_at))
    }
}
