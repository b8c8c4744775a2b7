//! Worker pool
//!
//! Pulls messages from a [`MessageSource`] and runs each one on its own task,
//! bounded by a semaphore. Requests share no mutable state, so completions
//! arrive in no particular order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use repometa_core::config::WorkerConfig;
use repometa_core::domain::AnalysisRequest;

use super::channel::{ChannelAdapter, Delivery};
use super::transport::MessageSource;

/// Counters reported when the pool stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    /// Messages taken from the source.
    pub received: u64,
    /// Results handed to the sink, including those of abandoned requests.
    pub emitted: u64,
    /// Results that could not be encoded or sent.
    pub unpublished: u64,
    /// Messages dropped as malformed.
    pub rejected: u64,
    /// Requests aborted when the drain timeout expired.
    pub abandoned: u64,
}

impl PoolSummary {
    fn record(&mut self, delivery: &Delivery) {
        match delivery {
            Delivery::Published(_) => self.emitted += 1,
            Delivery::Unpublished(_) => self.unpublished += 1,
            Delivery::Rejected => self.rejected += 1,
        }
    }
}

pub struct WorkerPool {
    adapter: Arc<ChannelAdapter>,
    concurrency: usize,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    pub fn new(adapter: Arc<ChannelAdapter>, config: &WorkerConfig) -> Self {
        Self {
            adapter,
            concurrency: config.concurrency.max(1),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_seconds),
        }
    }

    /// Consume `source` until it is exhausted or `shutdown` is cancelled, then
    /// wait up to the shutdown timeout for in-flight requests.
    ///
    /// Requests still running at the timeout are aborted and answered with
    /// `UPSTREAM_FAILURE`, so every accepted request yields exactly one result.
    pub async fn run(
        &self,
        source: Arc<dyn MessageSource>,
        shutdown: CancellationToken,
    ) -> PoolSummary {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Delivery> = JoinSet::new();
        let mut in_flight: HashMap<Id, AnalysisRequest> = HashMap::new();
        let mut summary = PoolSummary::default();

        info!(concurrency = self.concurrency, "Worker pool started");

        loop {
            while let Some(joined) = tasks.try_join_next_with_id() {
                self.settle(&mut summary, &mut in_flight, joined).await;
            }

            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(err) => {
                        error!(error = %err, "Failed to acquire worker permit");
                        break;
                    }
                },
            };

            let message = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = source.recv() => received,
            };

            match message {
                Ok(Some(message)) => {
                    summary.received += 1;
                    let Some(request) = ChannelAdapter::accept(&message) else {
                        summary.rejected += 1;
                        continue;
                    };

                    let adapter = self.adapter.clone();
                    let task_request = request.clone();
                    let handle = tasks.spawn(async move {
                        let delivery = adapter.process(task_request).await;
                        drop(permit);
                        delivery
                    });
                    in_flight.insert(handle.id(), request);
                }
                Ok(None) => {
                    info!("Message source exhausted");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to receive message, stopping intake");
                    break;
                }
            }
        }

        info!(in_flight = tasks.len(), "Draining in-flight requests");
        let drain_deadline = tokio::time::Instant::now() + self.shutdown_timeout;
        loop {
            match tokio::time::timeout_at(drain_deadline, tasks.join_next_with_id()).await {
                Ok(Some(joined)) => self.settle(&mut summary, &mut in_flight, joined).await,
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        in_flight = tasks.len(),
                        timeout_seconds = self.shutdown_timeout.as_secs(),
                        "Shutdown timeout reached, aborting in-flight requests"
                    );
                    tasks.abort_all();
                    while let Some(joined) = tasks.join_next_with_id().await {
                        self.settle(&mut summary, &mut in_flight, joined).await;
                    }
                    break;
                }
            }
        }

        info!(
            received = summary.received,
            emitted = summary.emitted,
            unpublished = summary.unpublished,
            rejected = summary.rejected,
            abandoned = summary.abandoned,
            "Worker pool stopped"
        );
        summary
    }

    /// Account for a finished task. A task that was aborted or panicked never
    /// published its result, so its request is answered here instead.
    async fn settle(
        &self,
        summary: &mut PoolSummary,
        in_flight: &mut HashMap<Id, AnalysisRequest>,
        joined: Result<(Id, Delivery), JoinError>,
    ) {
        match joined {
            Ok((id, delivery)) => {
                in_flight.remove(&id);
                summary.record(&delivery);
            }
            Err(err) => {
                let Some(request) = in_flight.remove(&err.id()) else {
                    error!(error = %err, "Request task failed with no tracked request");
                    return;
                };
                if err.is_cancelled() {
                    summary.abandoned += 1;
                } else {
                    error!(
                        correlation_key = %request.correlation_key,
                        error = %err,
                        "Request task failed"
                    );
                }
                let delivery = self.adapter.abandon(&request).await;
                summary.record(&delivery);
            }
        }
    }
}
