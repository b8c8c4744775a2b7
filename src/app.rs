//! Application setup and wiring

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use repometa_analyzers::infrastructure::ResolverRegistry;
use repometa_core::Config;
use repometa_core::infrastructure::{EndpointSelector, ReqwestHttpClient, TransportError};
use repometa_orchestrator::infrastructure::transport::{MessageSink, MessageSource};
use repometa_orchestrator::infrastructure::PoolSummary;
use repometa_orchestrator::{ChannelAdapter, DispatchEngine, DispatchSettings, WorkerPool};

/// Errors raised while assembling the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] TransportError),
}

/// Fully wired worker, ready to consume a message source.
pub struct AppHandle {
    pub engine: Arc<DispatchEngine>,
    pub pool: WorkerPool,
    pub shutdown_token: CancellationToken,
}

impl AppHandle {
    /// Run the worker pool until `source` is exhausted or shutdown is requested.
    pub async fn run(&self, source: Arc<dyn MessageSource>) -> PoolSummary {
        self.pool.run(source, self.shutdown_token.clone()).await
    }
}

/// Build the dispatch engine from configuration.
///
/// One HTTP client (and connection pool) is shared by every resolver.
pub fn build_engine(config: &Config) -> Result<Arc<DispatchEngine>, AppError> {
    let http = Arc::new(ReqwestHttpClient::new(&config.http)?);
    let registry = Arc::new(ResolverRegistry::with_defaults(http));
    let selector = EndpointSelector::from_endpoints(config.repositories.clone());
    let settings = DispatchSettings::from_config(&config.dispatch);

    info!(
        ecosystems = registry.len(),
        repositories = config.repositories.len(),
        attempt_timeout_ms = settings.attempt_timeout.as_millis() as u64,
        max_attempts = settings.retry.max_attempts,
        "Dispatch engine initialized"
    );

    Ok(Arc::new(DispatchEngine::new(registry, selector, settings)))
}

/// Wire the engine, channel adapter and worker pool publishing to `sink`.
pub fn create_app(config: &Config, sink: Arc<dyn MessageSink>) -> Result<AppHandle, AppError> {
    let engine = build_engine(config)?;
    let adapter = Arc::new(ChannelAdapter::new(engine.clone(), sink));
    let pool = WorkerPool::new(adapter, &config.worker);

    Ok(AppHandle {
        engine,
        pool,
        shutdown_token: CancellationToken::new(),
    })
}
