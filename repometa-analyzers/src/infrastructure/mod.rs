//! Infrastructure layer: registry and HTTP-backed resolvers

pub mod registry;
pub mod resolvers;

pub use registry::{ResolverRegistry, ResolverRegistryBuilder};
