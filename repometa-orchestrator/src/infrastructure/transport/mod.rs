//! Message transports
//!
//! The worker consumes requests from a [`MessageSource`] and publishes results
//! to a [`MessageSink`]. Implementations decide what the channel is: an
//! in-process queue, JSON lines on stdio, or a message broker.

pub mod jsonl;
pub mod memory;

use async_trait::async_trait;

use crate::domain::{InboundMessage, OutboundMessage};
use crate::infrastructure::channel::ChannelError;

pub use jsonl::{JsonLinesSink, JsonLinesSource};
pub use memory::{MemorySink, MemorySource};

/// Inbound side of the request channel.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Next message, or `None` once the channel is closed and drained.
    async fn recv(&self) -> Result<Option<InboundMessage>, ChannelError>;
}

/// Outbound side of the result channel.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError>;
}
