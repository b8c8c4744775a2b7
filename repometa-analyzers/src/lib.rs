//! Repometa Analyzers
//!
//! One [`Resolver`](domain::Resolver) per supported ecosystem, each turning a
//! parsed coordinate and a repository endpoint into the latest published
//! version of the package, plus the immutable
//! [`ResolverRegistry`](infrastructure::ResolverRegistry) that maps ecosystems
//! to resolvers.
//!
//! ```text
//! repometa-analyzers/
//! ├── domain/
//! │   └── resolver     # Resolver capability
//! └── infrastructure/
//!     ├── registry     # ecosystem -> resolver table, built once
//!     └── resolvers/   # cargo, composer, gem, golang, hackage, hex,
//!                      # maven, npm, nuget, pypi
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::Resolver;
pub use infrastructure::ResolverRegistry;
