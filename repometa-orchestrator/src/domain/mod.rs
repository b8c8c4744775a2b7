//! Orchestrator domain types

pub mod attempt;
pub mod message;

pub use attempt::{FailureKind, ResolverAttemptOutcome, aggregate_outcome};
pub use message::{InboundMessage, OutboundMessage};
