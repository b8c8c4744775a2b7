//! Application layer

pub mod dispatch;

pub use dispatch::{DispatchEngine, DispatchSettings};
