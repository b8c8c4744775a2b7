//! Common test utilities for resolver integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use repometa_core::config::HttpConfig;
use repometa_core::domain::{Coordinate, Ecosystem, RepositoryEndpoint};
use repometa_core::infrastructure::{HttpClient, ReqwestHttpClient};

pub const DEADLINE: Duration = Duration::from_secs(5);

pub fn http_client() -> Arc<dyn HttpClient> {
    Arc::new(ReqwestHttpClient::new(&HttpConfig::default()).expect("client should build"))
}

pub fn endpoint(ecosystem: Ecosystem, url: &str) -> RepositoryEndpoint {
    RepositoryEndpoint::new(ecosystem, "test", url, 1)
}

pub fn coordinate(raw: &str) -> Coordinate {
    Coordinate::parse(raw).expect("valid coordinate")
}
