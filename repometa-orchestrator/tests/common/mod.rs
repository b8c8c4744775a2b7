//! Common test utilities: scripted resolvers, counting HTTP clients and
//! engine builders.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use repometa_analyzers::domain::Resolver;
use repometa_analyzers::infrastructure::ResolverRegistry;
use repometa_core::domain::{Coordinate, Ecosystem, PackageMeta, RepositoryEndpoint, ResolveError};
use repometa_core::infrastructure::{
    EndpointSelector, HttpClient, HttpRequest, HttpResponse, RetryConfig, TransportError,
};
use repometa_orchestrator::{DispatchEngine, DispatchSettings};

/// What a [`StubResolver`] does for a given endpoint.
#[derive(Clone)]
pub enum Script {
    Respond(Result<PackageMeta, ResolveError>),
    Hang,
}

/// Resolver answering from a per-endpoint script and recording every call.
pub struct StubResolver {
    ecosystem: Ecosystem,
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl StubResolver {
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, endpoint: &str, result: Result<PackageMeta, ResolveError>) -> Self {
        self.scripts
            .insert(endpoint.to_string(), Script::Respond(result));
        self
    }

    pub fn resolves(self, endpoint: &str, version: &str) -> Self {
        self.respond(endpoint, Ok(PackageMeta::new(version, None)))
    }

    pub fn hangs(mut self, endpoint: &str) -> Self {
        self.scripts.insert(endpoint.to_string(), Script::Hang);
        self
    }

    /// Endpoint identifiers in the order they were called.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|call| *call == endpoint).count()
    }
}

#[async_trait]
impl Resolver for StubResolver {
    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    async fn resolve(
        &self,
        _coordinate: &Coordinate,
        endpoint: &RepositoryEndpoint,
        _deadline: Duration,
    ) -> Result<PackageMeta, ResolveError> {
        self.calls.lock().unwrap().push(endpoint.identifier.clone());
        match self.scripts.get(&endpoint.identifier).cloned() {
            Some(Script::Respond(result)) => result,
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ResolveError::NotFound)
            }
            None => Err(ResolveError::NotFound),
        }
    }
}

/// HTTP client that counts requests and always answers 404.
#[derive(Default)]
pub struct CountingHttpClient {
    calls: AtomicUsize,
}

impl CountingHttpClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for CountingHttpClient {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse::new(404, ""))
    }
}

/// Millisecond-scale timings so retry tests run quickly.
pub fn fast_settings(max_attempts: u32) -> DispatchSettings {
    DispatchSettings {
        attempt_timeout: Duration::from_millis(200),
        retry: RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        },
        request_deadline: None,
    }
}

pub fn endpoint(ecosystem: Ecosystem, identifier: &str, order: i32) -> RepositoryEndpoint {
    RepositoryEndpoint::new(
        ecosystem,
        identifier,
        format!("https://{}.example.com", identifier),
        order,
    )
}

pub fn engine_with_stub(
    stub: Arc<StubResolver>,
    endpoints: Vec<RepositoryEndpoint>,
    settings: DispatchSettings,
) -> DispatchEngine {
    let registry = ResolverRegistry::builder().register(stub).build();
    DispatchEngine::new(
        Arc::new(registry),
        EndpointSelector::from_endpoints(endpoints),
        settings,
    )
}

pub fn engine_with_http(
    http: Arc<dyn HttpClient>,
    endpoints: Vec<RepositoryEndpoint>,
    settings: DispatchSettings,
) -> DispatchEngine {
    DispatchEngine::new(
        Arc::new(ResolverRegistry::with_defaults(http)),
        EndpointSelector::from_endpoints(endpoints),
        settings,
    )
}
