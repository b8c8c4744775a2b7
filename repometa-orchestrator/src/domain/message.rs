//! Transport-level messages

/// A message as received from the inbound channel.
///
/// The key is the correlation key; the payload is an opaque byte body that the
/// channel adapter decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(key: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: Some(key.into()),
            payload: payload.into(),
        }
    }

    pub fn without_key(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: None,
            payload: payload.into(),
        }
    }
}

/// A message bound for the outbound channel, routed by `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: String,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
