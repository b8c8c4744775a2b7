//! Endpoint Selector
//!
//! Turns the externally supplied repository table into the ordered list of
//! endpoints a request iterates: same ecosystem, enabled only, sorted by
//! `resolution_order` ascending with `identifier` as a stable tie-breaker.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Ecosystem, RepositoryEndpoint};

/// Read-only lookup of configured repository endpoints keyed by ecosystem.
pub trait EndpointSource: Send + Sync {
    fn endpoints(&self, ecosystem: Ecosystem) -> Vec<RepositoryEndpoint>;
}

/// Immutable snapshot of the repository table, shared without locking.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpointSource {
    by_ecosystem: Arc<HashMap<Ecosystem, Vec<RepositoryEndpoint>>>,
}

impl StaticEndpointSource {
    pub fn new(endpoints: impl IntoIterator<Item = RepositoryEndpoint>) -> Self {
        let mut by_ecosystem: HashMap<Ecosystem, Vec<RepositoryEndpoint>> = HashMap::new();
        for endpoint in endpoints {
            by_ecosystem
                .entry(endpoint.ecosystem)
                .or_default()
                .push(endpoint);
        }
        Self {
            by_ecosystem: Arc::new(by_ecosystem),
        }
    }

    pub fn len(&self) -> usize {
        self.by_ecosystem.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EndpointSource for StaticEndpointSource {
    fn endpoints(&self, ecosystem: Ecosystem) -> Vec<RepositoryEndpoint> {
        self.by_ecosystem
            .get(&ecosystem)
            .cloned()
            .unwrap_or_default()
    }
}

/// Filter + sort over an [`EndpointSource`]. Holds no cache of its own.
#[derive(Clone)]
pub struct EndpointSelector {
    source: Arc<dyn EndpointSource>,
}

impl EndpointSelector {
    pub fn new(source: Arc<dyn EndpointSource>) -> Self {
        Self { source }
    }

    pub fn from_endpoints(endpoints: impl IntoIterator<Item = RepositoryEndpoint>) -> Self {
        Self::new(Arc::new(StaticEndpointSource::new(endpoints)))
    }

    /// Enabled endpoints for `ecosystem` in resolution order. Empty when none apply.
    pub fn endpoints_for(&self, ecosystem: Ecosystem) -> Vec<RepositoryEndpoint> {
        let mut endpoints: Vec<RepositoryEndpoint> = self
            .source
            .endpoints(ecosystem)
            .into_iter()
            .filter(|endpoint| endpoint.enabled && endpoint.ecosystem == ecosystem)
            .collect();
        endpoints.sort_by(|a, b| {
            a.resolution_order
                .cmp(&b.resolution_order)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(ecosystem: Ecosystem, identifier: &str, order: i32) -> RepositoryEndpoint {
        RepositoryEndpoint::new(
            ecosystem,
            identifier,
            format!("https://{identifier}.example.com"),
            order,
        )
    }

    #[test]
    fn test_sorted_by_resolution_order() {
        let selector = EndpointSelector::from_endpoints(vec![
            endpoint(Ecosystem::Maven, "central", 3),
            endpoint(Ecosystem::Maven, "internal", 1),
            endpoint(Ecosystem::Maven, "mirror", 2),
        ]);

        let identifiers: Vec<_> = selector
            .endpoints_for(Ecosystem::Maven)
            .into_iter()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(identifiers, vec!["internal", "mirror", "central"]);
    }

    #[test]
    fn test_ties_broken_by_identifier() {
        let selector = EndpointSelector::from_endpoints(vec![
            endpoint(Ecosystem::Npm, "zeta", 1),
            endpoint(Ecosystem::Npm, "alpha", 1),
        ]);

        let identifiers: Vec<_> = selector
            .endpoints_for(Ecosystem::Npm)
            .into_iter()
            .map(|e| e.identifier)
            .collect();
        assert_eq!(identifiers, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_disabled_and_foreign_endpoints_excluded() {
        let selector = EndpointSelector::from_endpoints(vec![
            endpoint(Ecosystem::Pypi, "pypi", 1).disabled(),
            endpoint(Ecosystem::Cargo, "crates", 1),
        ]);

        assert!(selector.endpoints_for(Ecosystem::Pypi).is_empty());
        assert!(selector.endpoints_for(Ecosystem::Hackage).is_empty());
        assert_eq!(selector.endpoints_for(Ecosystem::Cargo).len(), 1);
    }
}
