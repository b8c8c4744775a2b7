//! In-process transport over tokio channels

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use super::{MessageSink, MessageSource};
use crate::domain::{InboundMessage, OutboundMessage};
use crate::infrastructure::channel::ChannelError;

/// [`MessageSource`] fed through an `mpsc::Sender`.
pub struct MemorySource {
    receiver: Mutex<mpsc::Receiver<InboundMessage>>,
}

impl MemorySource {
    /// Bounded source and the sender that feeds it. The source reports end of
    /// stream once every sender is dropped.
    pub fn channel(capacity: usize) -> (mpsc::Sender<InboundMessage>, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            sender,
            Self {
                receiver: Mutex::new(receiver),
            },
        )
    }
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn recv(&self) -> Result<Option<InboundMessage>, ChannelError> {
        Ok(self.receiver.lock().await.recv().await)
    }
}

/// [`MessageSink`] drained through an `mpsc::Receiver`.
#[derive(Clone)]
pub struct MemorySink {
    sender: mpsc::Sender<OutboundMessage>,
}

impl MemorySink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}
