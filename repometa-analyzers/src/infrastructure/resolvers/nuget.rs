//! NuGet resolver

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Unlisted packages carry this year as their `published` value.
const UNLISTED_YEAR: i32 = 1900;

/// Resolves NuGet packages through the V3 flat container.
///
/// Latest rule: the last non-prerelease entry of the ascending `versions`
/// list, or the last entry when every version is a prerelease. The publish
/// time comes from a best-effort lookup of the registration leaf.
pub struct NugetResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct VersionIndex {
    #[serde(default)]
    versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegistrationLeaf {
    published: Option<String>,
}

impl NugetResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    async fn published_at(
        &self,
        endpoint: &RepositoryEndpoint,
        id: &str,
        version: &str,
        deadline: Duration,
    ) -> Option<DateTime<Utc>> {
        let url = format!(
            "{}/v3/registration5-semver1/{}/{}.json",
            endpoint.base_url(),
            support::encode_segment(id),
            support::encode_segment(&version.to_lowercase())
        );

        match support::fetch_json::<RegistrationLeaf>(
            self.http.as_ref(),
            support::get(endpoint, url, deadline),
        )
        .await
        {
            Ok(leaf) => leaf
                .published
                .as_deref()
                .and_then(support::parse_timestamp)
                .filter(|published| published.year() > UNLISTED_YEAR),
            Err(e) => {
                debug!(package = id, version, error = %e, "NuGet registration lookup failed");
                None
            }
        }
    }
}

fn select_latest(versions: &[String]) -> Option<&str> {
    versions
        .iter()
        .rev()
        .find(|version| !version.contains('-'))
        .or_else(|| versions.last())
        .map(String::as_str)
}

#[async_trait]
impl Resolver for NugetResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Nuget
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let id = coordinate.name().to_lowercase();
        let url = format!(
            "{}/v3-flatcontainer/{}/index.json",
            endpoint.base_url(),
            support::encode_segment(&id)
        );

        let index: VersionIndex =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let latest = select_latest(&index.versions)
            .ok_or(ResolveError::NotFound)?
            .to_string();

        let published_at = self.published_at(endpoint, &id, &latest, deadline).await;
        Ok(PackageMeta::new(latest, published_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_select_latest_prefers_stable() {
        let list = versions(&["1.0.0", "2.0.0", "2.1.0-beta.1"]);
        assert_eq!(select_latest(&list), Some("2.0.0"));
    }

    #[test]
    fn test_select_latest_falls_back_to_prerelease() {
        let list = versions(&["1.0.0-alpha", "1.0.0-rc.1"]);
        assert_eq!(select_latest(&list), Some("1.0.0-rc.1"));
    }

    #[test]
    fn test_select_latest_empty() {
        assert_eq!(select_latest(&[]), None);
    }
}
