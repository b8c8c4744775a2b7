//! Shared request and response handling for HTTP resolvers

use chrono::{DateTime, NaiveDateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use repometa_core::domain::{RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::{HttpClient, HttpRequest, HttpResponse, TransportError};

/// Unreserved characters stay literal, everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const MAX_ERROR_BODY: usize = 256;

/// Percent-encode a single URL path segment (also escapes `/` and `@`).
pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// GET request against `url` carrying the endpoint's credentials.
pub(crate) fn get(endpoint: &RepositoryEndpoint, url: String, deadline: Duration) -> HttpRequest {
    HttpRequest::get(url, deadline).with_credentials(endpoint.credentials.clone())
}

/// Execute `request` and classify the response.
///
/// 404 and 410 are [`ResolveError::NotFound`]; any other non-2xx status is
/// [`ResolveError::UpstreamError`].
pub(crate) async fn fetch(
    http: &dyn HttpClient,
    request: HttpRequest,
) -> Result<HttpResponse, ResolveError> {
    let timeout = request.timeout;
    let url = request.url.clone();

    let response = http.execute(request).await.map_err(|err| match err {
        TransportError::Timeout => ResolveError::timeout(timeout),
        TransportError::Unreachable(message) | TransportError::InvalidRequest(message) => {
            ResolveError::Unreachable(message)
        }
        TransportError::BodyTooLarge { limit } => {
            ResolveError::malformed(format!("response body exceeds {limit} bytes"))
        }
    })?;

    match response.status {
        status if (200..300).contains(&status) => Ok(response),
        404 | 410 => {
            debug!(url = %url, status = response.status, "Package not present at endpoint");
            Err(ResolveError::NotFound)
        }
        status => {
            let mut message = response.text();
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            Err(ResolveError::UpstreamError { status, message })
        }
    }
}

/// [`fetch`] and deserialize a JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http: &dyn HttpClient,
    request: HttpRequest,
) -> Result<T, ResolveError> {
    let response = fetch(http, request).await?;
    Ok(response.json::<T>()?)
}

/// Parse a registry timestamp. RFC 3339 first, then a naive ISO-8601 form
/// interpreted as UTC. Unparseable values yield `None`.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(_) => {
            debug!(timestamp = raw, "Ignoring unparseable publish timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedClient(Result<HttpResponse, TransportError>);

    #[async_trait]
    impl HttpClient for FixedClient {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.0.clone()
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::get("http://registry.test/pkg", Duration::from_millis(250))
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("@angular/core"), "%40angular%2Fcore");
        assert_eq!(encode_segment("left-pad_1.0~x"), "left-pad_1.0~x");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = "2022-09-28T21:59:32Z";
        assert_eq!(
            parse_timestamp("2022-09-28T21:59:32Z").unwrap().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            expected
        );
        assert_eq!(
            parse_timestamp("2022-09-28T23:59:32+02:00").unwrap().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            expected
        );
        assert_eq!(
            parse_timestamp("2022-09-28T21:59:32").unwrap().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            expected
        );
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_fetch_classifies_status() {
        let not_found = FixedClient(Ok(HttpResponse::new(404, "")));
        assert_eq!(fetch(&not_found, request()).await.unwrap_err(), ResolveError::NotFound);

        let unavailable = FixedClient(Ok(HttpResponse::new(503, "maintenance")));
        assert_eq!(
            fetch(&unavailable, request()).await.unwrap_err(),
            ResolveError::UpstreamError {
                status: 503,
                message: "maintenance".to_string()
            }
        );

        let ok = FixedClient(Ok(HttpResponse::new(200, "{}")));
        assert!(fetch(&ok, request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_maps_transport_errors() {
        let timeout = FixedClient(Err(TransportError::Timeout));
        assert_eq!(
            fetch(&timeout, request()).await.unwrap_err(),
            ResolveError::Timeout { millis: 250 }
        );

        let refused = FixedClient(Err(TransportError::Unreachable("refused".to_string())));
        assert!(fetch(&refused, request()).await.unwrap_err().is_retryable());

        let oversized = FixedClient(Err(TransportError::BodyTooLarge { limit: 1024 }));
        let err = fetch(&oversized, request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_json_reports_malformed_body() {
        let client = FixedClient(Ok(HttpResponse::new(200, "<html>")));
        let err = fetch_json::<serde_json::Value>(&client, request()).await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
    }
}
