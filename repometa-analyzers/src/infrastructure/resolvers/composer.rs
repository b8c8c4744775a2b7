//! Composer (Packagist) resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves PHP packages through the Composer v2 metadata API.
///
/// Latest rule: the first non-development entry of the package's version list,
/// which Packagist serves newest first.
pub struct ComposerResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    #[serde(default)]
    packages: HashMap<String, Vec<PackageVersion>>,
}

#[derive(Debug, Deserialize)]
struct PackageVersion {
    version: String,
    time: Option<String>,
}

impl ComposerResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

fn is_dev_version(version: &str) -> bool {
    version.starts_with("dev-") || version.ends_with("-dev")
}

#[async_trait]
impl Resolver for ComposerResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Composer
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let vendor = coordinate.namespace().unwrap_or_default().to_lowercase();
        let name = coordinate.name().to_lowercase();
        let url = format!(
            "{}/p2/{}/{}.json",
            endpoint.base_url(),
            support::encode_segment(&vendor),
            support::encode_segment(&name)
        );

        let mut document: PackageDocument =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let versions = document
            .packages
            .remove(&format!("{}/{}", vendor, name))
            .ok_or(ResolveError::NotFound)?;

        let latest = versions
            .into_iter()
            .find(|entry| !is_dev_version(&entry.version))
            .ok_or(ResolveError::NotFound)?;
        let published_at = latest.time.as_deref().and_then(support::parse_timestamp);

        Ok(PackageMeta::new(latest.version, published_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dev_version() {
        assert!(is_dev_version("dev-main"));
        assert!(is_dev_version("2.x-dev"));
        assert!(!is_dev_version("v2.3.1"));
        assert!(!is_dev_version("2.0.0-RC1"));
    }
}
