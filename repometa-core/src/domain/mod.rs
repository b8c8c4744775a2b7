//! Domain model shared by every repometa crate.

pub mod analysis;
pub mod coordinate;
pub mod ecosystem;
pub mod endpoint;
pub mod errors;

pub use analysis::{AnalysisOutcome, AnalysisRequest, AnalysisResult, PackageMeta};
pub use coordinate::Coordinate;
pub use ecosystem::{Ecosystem, NamespacePolicy};
pub use endpoint::{Credentials, RepositoryEndpoint};
pub use errors::{CoordinateError, ResolveError};
