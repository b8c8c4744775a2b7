//! Maven repository resolver

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::sync::Arc;
use std::time::Duration;

use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::HttpClient;

use super::support;
use crate::domain::Resolver;

/// Resolves Maven artifacts from a repository's `maven-metadata.xml`.
///
/// Latest rule: `<release>`, falling back to `<latest>`. The publish time is
/// `<lastUpdated>` (`yyyyMMddHHmmss`, UTC).
pub struct MavenResolver {
    http: Arc<dyn HttpClient>,
}

#[derive(Debug, Default, PartialEq)]
struct Versioning {
    latest: Option<String>,
    release: Option<String>,
    last_updated: Option<String>,
}

impl MavenResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

fn parse_metadata(content: &str) -> Result<Versioning, ResolveError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut in_versioning = false;
    let mut current_tag: Option<String> = None;
    let mut versioning = Versioning::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "versioning" {
                    in_versioning = true;
                } else if in_versioning {
                    current_tag = Some(name);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"versioning" {
                    in_versioning = false;
                }
                current_tag = None;
            }
            Ok(Event::Text(t)) => {
                if let Some(tag) = current_tag.as_deref() {
                    let text = t
                        .unescape()
                        .map_err(|e| ResolveError::malformed(format!("XML text error: {}", e)))?
                        .trim()
                        .to_string();
                    if !text.is_empty() {
                        match tag {
                            "latest" => versioning.latest = Some(text),
                            "release" => versioning.release = Some(text),
                            "lastUpdated" => versioning.last_updated = Some(text),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ResolveError::malformed(format!("XML parse error: {}", e)));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(versioning)
}

fn parse_last_updated(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl Resolver for MavenResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    async fn resolve(
        &self,
        coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        let group_path = coordinate
            .namespace()
            .unwrap_or_default()
            .split(['.', '/'])
            .filter(|part| !part.is_empty())
            .map(support::encode_segment)
            .collect::<Vec<_>>()
            .join("/");
        let url = format!(
            "{}/{}/{}/maven-metadata.xml",
            endpoint.base_url(),
            group_path,
            support::encode_segment(coordinate.name())
        );

        let response =
            support::fetch(self.http.as_ref(), support::get(endpoint, url, deadline)).await?;
        let versioning = parse_metadata(&response.text())?;

        let latest = versioning
            .release
            .or(versioning.latest)
            .ok_or_else(|| ResolveError::malformed("metadata has neither <release> nor <latest>"))?;
        let published_at = versioning.last_updated.as_deref().and_then(parse_last_updated);

        Ok(PackageMeta::new(latest, published_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>com.acme</groupId>
  <artifactId>acme-lib</artifactId>
  <versioning>
    <latest>2.1.0-SNAPSHOT</latest>
    <release>2.0.0</release>
    <versions>
      <version>1.0.0</version>
      <version>2.0.0</version>
    </versions>
    <lastUpdated>20230415093011</lastUpdated>
  </versioning>
</metadata>"#;

    #[test]
    fn test_parse_metadata() {
        let versioning = parse_metadata(METADATA).unwrap();
        assert_eq!(
            versioning,
            Versioning {
                latest: Some("2.1.0-SNAPSHOT".to_string()),
                release: Some("2.0.0".to_string()),
                last_updated: Some("20230415093011".to_string()),
            }
        );
    }

    #[test]
    fn test_entities_in_versions_are_unescaped() {
        let versioning = parse_metadata(
            "<metadata><versioning><release>2&#46;0&#46;0</release>\
             <latest>2.1&amp;rc</latest></versioning></metadata>",
        )
        .unwrap();
        assert_eq!(versioning.release.as_deref(), Some("2.0.0"));
        assert_eq!(versioning.latest.as_deref(), Some("2.1&rc"));
    }

    #[test]
    fn test_version_elements_outside_versioning_are_ignored() {
        let versioning = parse_metadata("<metadata><version>9.9</version></metadata>").unwrap();
        assert_eq!(versioning, Versioning::default());
    }

    #[test]
    fn test_parse_last_updated() {
        let parsed = parse_last_updated("20230415093011").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-04-15T09:30:11+00:00");
        assert!(parse_last_updated("2023-04-15").is_none());
    }

    #[test]
    fn test_broken_xml_is_malformed() {
        let err = parse_metadata("<metadata><versioning></metadata>").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
    }
}
