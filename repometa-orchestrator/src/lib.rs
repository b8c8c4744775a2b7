//! Repometa Orchestrator
//!
//! Runs analysis requests to completion: the dispatch engine walks the
//! configured endpoints of a coordinate's ecosystem in priority order, the
//! channel adapter translates transport messages to and from analysis
//! records, and the worker pool runs many requests concurrently.
//!
//! ```text
//! repometa-orchestrator/
//! ├── domain/            # per-endpoint attempt records, wire messages
//! ├── application/
//! │   └── dispatch       # Dispatch Engine
//! └── infrastructure/
//!     ├── channel        # Channel Adapter
//!     ├── transport/     # MessageSource / MessageSink implementations
//!     └── worker_pool    # semaphore-bounded request workers
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{DispatchEngine, DispatchSettings};
pub use infrastructure::{ChannelAdapter, ChannelError, WorkerPool};
