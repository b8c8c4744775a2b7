//! Repometa Core - Foundation crate for the repository meta analysis worker
//!
//! This crate provides shared functionality used by the resolver and dispatch crates:
//!
//! # Modules
//!
//! - [`config`]: Strongly-typed configuration with file and environment variable support
//! - [`domain`]: Coordinates, ecosystems, repository endpoints and analysis records
//! - [`infrastructure`]: HTTP client contract, retry with backoff, endpoint selection
//! - [`logging`]: Structured logging with tracing
//!
//! # Architecture
//!
//! ```text
//! repometa-core/
//! ├── domain/           # Pure data model and the coordinate parser
//! │   ├── coordinate    # pkg:type/[namespace/]name@version
//! │   ├── ecosystem     # Closed set of supported ecosystems
//! │   ├── endpoint      # RepositoryEndpoint + credentials
//! │   ├── analysis      # AnalysisRequest / AnalysisResult
//! │   └── errors        # Coordinate and resolution error taxonomy
//! ├── infrastructure/   # External integrations
//! │   ├── http          # HttpClient trait + reqwest implementation
//! │   ├── resilience    # Retry with exponential backoff and jitter
//! │   └── endpoints     # Endpoint Selector over a configuration snapshot
//! └── config/           # Configuration management
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use repometa_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `REPOMETA__` prefix with double underscore separators:
//!
//! ```bash
//! REPOMETA__WORKER__CONCURRENCY=8
//! REPOMETA__DISPATCH__RETRY__MAX_ATTEMPTS=5
//! ```

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
