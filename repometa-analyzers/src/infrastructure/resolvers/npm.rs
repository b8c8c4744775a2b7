//! npm registry resolver

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves npm packages (scoped or not).
///
/// Latest rule: the `latest` dist-tag.
pub struct NpmResolver {
    http: Arc<dyn HttpClient>,
}

impl NpmResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Resolver for NpmResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/-/package/{}/dist-tags",
            endpoint.base_url(),
            support::encode_segment(&coordinate.qualified_name())
        );

        let mut tags: HashMap<String, String> =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let latest = tags
            .remove("latest")
            .ok_or_else(|| ResolveError::malformed("dist-tags has no 'latest' entry"))?;

        Ok(PackageMeta::new(latest, None))
    }
}
