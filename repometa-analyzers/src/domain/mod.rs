//! Resolver domain layer

pub mod resolver;

pub use resolver::Resolver;
