//! PyPI JSON API resolver

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Python distributions from a PyPI-compatible JSON API.
///
/// Latest rule: `info.version`. The publish time is the most recent upload
/// among that release's files.
pub struct PypiResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    info: ProjectInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    upload_time_iso_8601: Option<String>,
    upload_time: Option<String>,
}

impl PypiResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

fn latest_upload(files: &[ReleaseFile]) -> Option<DateTime<Utc>> {
    files
        .iter()
        .filter_map(|file| {
            file.upload_time_iso_8601
                .as_deref()
                .or(file.upload_time.as_deref())
                .and_then(support::parse_timestamp)
        })
        .max()
}

#[async_trait]
impl Resolver for PypiResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pypi
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let url = format!(
            "{}/pypi/{}/json",
            endpoint.base_url(),
            support::encode_segment(coordinate.name())
        );

        let document: ProjectDocument =
            support::fetch_json(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let version = document.info.version;
        if version.trim().is_empty() {
            return Err(ResolveError::malformed("empty info.version"));
        }

        let files = document
            .releases
            .get(&version)
            .filter(|files| !files.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&document.urls);
        let published_at = latest_upload(files);

        Ok(PackageMeta::new(version, published_at))
    }
}
