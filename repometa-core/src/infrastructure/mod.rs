//! Infrastructure: HTTP transport, resilience and endpoint selection.

pub mod endpoints;
pub mod http;
pub mod resilience;

pub use endpoints::{EndpointSelector, EndpointSource, StaticEndpointSource};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient, TransportError};
pub use resilience::{RetryConfig, retry_with_backoff};
