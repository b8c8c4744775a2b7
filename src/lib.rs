//! Repometa - repository meta analysis worker
//!
//! Wires the workspace crates into a runnable worker: configuration and
//! logging from `repometa-core`, resolvers from `repometa-analyzers`, and the
//! dispatch engine, channel adapter and worker pool from
//! `repometa-orchestrator`.

mod app;

pub use app::{AppError, AppHandle, build_engine, create_app};
pub use repometa_core::{Config, init_tracing};

// Re-export for convenience
pub use repometa_analyzers;
pub use repometa_core;
pub use repometa_orchestrator;
