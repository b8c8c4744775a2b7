//! JSON-lines transport
//!
//! One message per line, in both directions:
//!
//! ```text
//! {"key":"<correlation key>","payload":{...}}
//! ```
//!
//! Lines that are not such an envelope are still handed to the channel
//! adapter, without a key, so that they are rejected and logged in one place.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{MessageSink, MessageSource};
use crate::domain::{InboundMessage, OutboundMessage};
use crate::infrastructure::channel::ChannelError;

#[derive(Debug, Deserialize)]
struct InboundLine {
    key: Option<String>,
    payload: Option<serde_json::Value>,
}

fn parse_line(line: &str) -> InboundMessage {
    match serde_json::from_str::<InboundLine>(line) {
        Ok(envelope) => InboundMessage {
            key: envelope.key,
            payload: envelope
                .payload
                .map(|payload| payload.to_string().into_bytes())
                .unwrap_or_default(),
        },
        Err(e) => {
            debug!(error = %e, "Inbound line is not a message envelope");
            InboundMessage::without_key(line.as_bytes().to_vec())
        }
    }
}

fn render_line(message: &OutboundMessage) -> Result<String, ChannelError> {
    let payload = std::str::from_utf8(&message.payload)
        .map_err(|e| ChannelError::Encode(format!("payload is not UTF-8: {}", e)))?;
    let key = serde_json::to_string(&message.key).map_err(|e| ChannelError::Encode(e.to_string()))?;
    Ok(format!("{{\"key\":{},\"payload\":{}}}", key, payload))
}

/// [`MessageSource`] reading newline-delimited envelopes.
pub struct JsonLinesSource<R> {
    lines: Mutex<Lines<R>>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

impl JsonLinesSource<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MessageSource for JsonLinesSource<R> {
    async fn recv(&self) -> Result<Option<InboundMessage>, ChannelError> {
        let mut lines = self.lines.lock().await;
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| ChannelError::Receive(e.to_string()))?;
            match line {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(parse_line(&line))),
            }
        }
    }
}

/// [`MessageSink`] writing newline-delimited envelopes from a dedicated
/// writer task, so concurrent workers never interleave partial lines.
#[derive(Clone)]
pub struct JsonLinesSink {
    sender: mpsc::Sender<String>,
}

impl JsonLinesSink {
    /// Start the writer task. It finishes, flushing `writer`, once every clone
    /// of the returned sink has been dropped.
    pub fn spawn<W>(mut writer: W, capacity: usize) -> (Self, JoinHandle<std::io::Result<()>>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<String>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(line) = receiver.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            writer.flush().await
        });
        (Self { sender }, handle)
    }

    pub fn stdout(capacity: usize) -> (Self, JoinHandle<std::io::Result<()>>) {
        Self::spawn(tokio::io::stdout(), capacity)
    }
}

#[async_trait]
impl MessageSink for JsonLinesSink {
    async fn send(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        let line = render_line(&message)?;
        self.sender.send(line).await.map_err(|_| ChannelError::Closed)
    }
}
