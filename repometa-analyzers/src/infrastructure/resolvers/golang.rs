//! Go module proxy resolver

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Go modules through the module proxy protocol.
///
/// Latest rule: whatever the proxy's `@latest` endpoint reports.
pub struct GoModulesResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Time")]
    time: Option<String>,
}

impl GoModulesResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

/// Module path case-encoding: every upper-case letter becomes `!` followed by
/// its lower-case form.
fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

#[async_trait]
impl Resolver for GoModulesResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Golang
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/{}/@latest",
            endpoint.base_url(),
            escape_module_path(&coordinate.qualified_name())
        );

        let info: LatestInfo =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        if info.version.trim().is_empty() {
            return Err(ResolveError::malformed("empty Version in @latest response"));
        }

        let published_at = info.time.as_deref().and_then(support::parse_timestamp);
        Ok(PackageMeta::new(info.version, published_at))
    }
}
