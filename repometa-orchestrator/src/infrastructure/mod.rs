//! Infrastructure layer: channel adapter, transports and worker pool

pub mod channel;
pub mod transport;
pub mod worker_pool;

pub use channel::{ChannelAdapter, ChannelError, Delivery};
pub use transport::{MessageSink, MessageSource};
pub use worker_pool::{PoolSummary, WorkerPool};
