//! Request/Result Channel Adapter
//!
//! Decodes inbound messages into [`AnalysisRequest`]s, runs them through the
//! [`DispatchEngine`] and publishes the encoded [`AnalysisResult`] under the
//! same correlation key. Malformed messages are logged and dropped; they never
//! stop the worker.

use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use repometa_core::domain::{AnalysisOutcome, AnalysisRequest, AnalysisResult};

use super::transport::MessageSink;
use crate::application::DispatchEngine;
use crate::domain::{InboundMessage, OutboundMessage};

/// Errors raised while moving messages through a channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("message has no correlation key")]
    MissingKey,

    #[error("invalid message payload: {0}")]
    InvalidPayload(String),

    #[error("failed to encode result: {0}")]
    Encode(String),

    #[error("failed to receive message: {0}")]
    Receive(String),

    #[error("channel closed")]
    Closed,
}

/// What became of one inbound message.
#[derive(Debug)]
pub enum Delivery {
    /// The result was handed to the sink.
    Published(AnalysisResult),
    /// A result was produced but could not be encoded or sent.
    Unpublished(AnalysisResult),
    /// The message was malformed and dropped.
    Rejected,
}

#[derive(Debug, Deserialize)]
struct RequestPayload {
    #[serde(alias = "coordinate")]
    purl: String,
}

/// Bridges a transport to the dispatch engine.
pub struct ChannelAdapter {
    engine: Arc<DispatchEngine>,
    sink: Arc<dyn MessageSink>,
}

impl ChannelAdapter {
    pub fn new(engine: Arc<DispatchEngine>, sink: Arc<dyn MessageSink>) -> Self {
        Self { engine, sink }
    }

    /// Turn an inbound message into a request.
    pub fn decode(message: &InboundMessage) -> Result<AnalysisRequest, ChannelError> {
        let key = message
            .key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ChannelError::MissingKey)?;

        let payload: RequestPayload = serde_json::from_slice(&message.payload)
            .map_err(|e| ChannelError::InvalidPayload(e.to_string()))?;
        if payload.purl.trim().is_empty() {
            return Err(ChannelError::InvalidPayload("empty coordinate".to_string()));
        }

        Ok(AnalysisRequest::new(key, payload.purl))
    }

    /// Serialize a result for the outbound channel, keyed by its correlation key.
    pub fn encode(result: &AnalysisResult) -> Result<OutboundMessage, ChannelError> {
        let payload = serde_json::to_vec(result).map_err(|e| ChannelError::Encode(e.to_string()))?;
        Ok(OutboundMessage {
            key: result.correlation_key.clone(),
            payload,
        })
    }

    /// Decode `message`, logging and returning `None` when it is malformed.
    pub fn accept(message: &InboundMessage) -> Option<AnalysisRequest> {
        match Self::decode(message) {
            Ok(request) => Some(request),
            Err(e) => {
                error!(
                    error = %e,
                    key = ?message.key,
                    payload = %String::from_utf8_lossy(&message.payload),
                    "Dropping malformed inbound message"
                );
                None
            }
        }
    }

    /// Process one inbound message end to end.
    pub async fn handle(&self, message: InboundMessage) -> Delivery {
        match Self::accept(&message) {
            Some(request) => self.process(request).await,
            None => Delivery::Rejected,
        }
    }

    /// Dispatch a decoded request and publish its result.
    pub async fn process(&self, request: AnalysisRequest) -> Delivery {
        let result = self.engine.dispatch(&request).await;
        self.publish(result).await
    }

    /// Publish the terminal `UPSTREAM_FAILURE` result for a request whose
    /// dispatch never completed.
    pub async fn abandon(&self, request: &AnalysisRequest) -> Delivery {
        warn!(
            correlation_key = %request.correlation_key,
            purl = %request.purl,
            "Request abandoned before completion"
        );
        self.publish(AnalysisResult::unresolved(
            request,
            AnalysisOutcome::UpstreamFailure,
        ))
        .await
    }

    async fn publish(&self, result: AnalysisResult) -> Delivery {
        let outbound = match Self::encode(&result) {
            Ok(outbound) => outbound,
            Err(e) => {
                error!(
                    correlation_key = %result.correlation_key,
                    error = %e,
                    "Failed to encode analysis result"
                );
                return Delivery::Unpublished(result);
            }
        };

        if let Err(e) = self.sink.send(outbound).await {
            error!(
                correlation_key = %result.correlation_key,
                error = %e,
                "Failed to publish analysis result"
            );
            return Delivery::Unpublished(result);
        }

        info!(
            correlation_key = %result.correlation_key,
            purl = %result.purl,
            outcome = %result.outcome,
            "Analysis result emitted"
        );
        Delivery::Published(result)
    }
}
