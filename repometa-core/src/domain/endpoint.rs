//! Repository endpoint descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ecosystem::Ecosystem;

/// One configured repository instance for an ecosystem.
///
/// Supplied by configuration and read-only to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEndpoint {
    pub ecosystem: Ecosystem,
    pub identifier: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub resolution_order: i32,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_enabled() -> bool {
    true
}

impl RepositoryEndpoint {
    /// Create an enabled, public endpoint without credentials.
    pub fn new(
        ecosystem: Ecosystem,
        identifier: impl Into<String>,
        url: impl Into<String>,
        resolution_order: i32,
    ) -> Self {
        Self {
            ecosystem,
            identifier: identifier.into(),
            url: url.into(),
            enabled: true,
            internal: false,
            resolution_order,
            credentials: None,
        }
    }

    /// The public registry endpoint for an ecosystem.
    pub fn public_default(ecosystem: Ecosystem) -> Self {
        Self::new(
            ecosystem,
            ecosystem.as_str(),
            ecosystem.default_repository_url(),
            1,
        )
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Base URL without trailing slashes, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Authentication material for an endpoint.
///
/// A username selects HTTP Basic; a bare secret is sent as a Bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    pub secret: String,
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            secret: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            username: None,
            secret: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::basic("deploy", "hunter2");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("deploy"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let endpoint =
            RepositoryEndpoint::new(Ecosystem::Hackage, "hackage", "https://hackage.haskell.org/", 1);
        assert_eq!(endpoint.base_url(), "https://hackage.haskell.org");
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let endpoint: RepositoryEndpoint = serde_json::from_value(serde_json::json!({
            "ecosystem": "golang",
            "identifier": "goproxy",
            "url": "https://goproxy.example.com"
        }))
        .unwrap();
        assert!(endpoint.enabled);
        assert!(!endpoint.internal);
        assert_eq!(endpoint.resolution_order, 0);
        assert!(endpoint.credentials.is_none());
    }
}
