//! Resolver Registry
//!
//! Immutable ecosystem -> resolver table. Built once at startup and shared
//! behind an `Arc` for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use repometa_core::domain::Ecosystem;
use repometa_core::infrastructure::HttpClient;

use super::resolvers::{
    CargoResolver, ComposerResolver, GemResolver, GoModulesResolver, HackageResolver, HexResolver,
    MavenResolver, NpmResolver, NugetResolver, PypiResolver,
};
use crate::domain::Resolver;

/// Lookup table from ecosystem to its resolver.
pub struct ResolverRegistry {
    resolvers: HashMap<Ecosystem, Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn builder() -> ResolverRegistryBuilder {
        ResolverRegistryBuilder::default()
    }

    /// Registry with every built-in resolver sharing one HTTP client.
    pub fn with_defaults(http: Arc<dyn HttpClient>) -> Self {
        Self::builder()
            .register(Arc::new(CargoResolver::new(http.clone())))
            .register(Arc::new(ComposerResolver::new(http.clone())))
            .register(Arc::new(GemResolver::new(http.clone())))
            .register(Arc::new(GoModulesResolver::new(http.clone())))
            .register(Arc::new(HackageResolver::new(http.clone())))
            .register(Arc::new(HexResolver::new(http.clone())))
            .register(Arc::new(MavenResolver::new(http.clone())))
            .register(Arc::new(NpmResolver::new(http.clone())))
            .register(Arc::new(NugetResolver::new(http.clone())))
            .register(Arc::new(PypiResolver::new(http)))
            .build()
    }

    pub fn resolver_for(&self, ecosystem: Ecosystem) -> Option<Arc<dyn Resolver>> {
        self.resolvers
            .get(&ecosystem)
            .filter(|resolver| resolver.supports(ecosystem))
            .cloned()
    }

    /// Registered ecosystems in a stable order.
    pub fn ecosystems(&self) -> Vec<Ecosystem> {
        let mut ecosystems: Vec<Ecosystem> = self.resolvers.keys().copied().collect();
        ecosystems.sort();
        ecosystems
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

/// Collects resolvers before the registry is frozen.
#[derive(Default)]
pub struct ResolverRegistryBuilder {
    resolvers: HashMap<Ecosystem, Arc<dyn Resolver>>,
}

impl ResolverRegistryBuilder {
    /// Register `resolver` under its ecosystem, replacing any earlier entry.
    pub fn register(mut self, resolver: Arc<dyn Resolver>) -> Self {
        let ecosystem = resolver.ecosystem();
        if self.resolvers.insert(ecosystem, resolver).is_some() {
            debug!(ecosystem = %ecosystem, "Replacing previously registered resolver");
        }
        self
    }

    pub fn build(self) -> ResolverRegistry {
        ResolverRegistry {
            resolvers: self.resolvers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repometa_core::infrastructure::{HttpRequest, HttpResponse, TransportError};

    struct OfflineClient;

    #[async_trait]
    impl HttpClient for OfflineClient {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Unreachable("offline".to_string()))
        }
    }

    #[test]
    fn test_defaults_cover_every_ecosystem() {
        let registry = ResolverRegistry::with_defaults(Arc::new(OfflineClient));

        assert_eq!(registry.len(), Ecosystem::ALL.len());
        assert_eq!(registry.ecosystems(), Ecosystem::ALL.to_vec());
        for ecosystem in Ecosystem::ALL {
            let resolver = registry.resolver_for(ecosystem).expect("resolver registered");
            assert_eq!(resolver.ecosystem(), ecosystem);
            assert!(resolver.supports(ecosystem));
        }
    }

    #[test]
    fn test_empty_registry_has_no_resolvers() {
        let registry = ResolverRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.resolver_for(Ecosystem::Npm).is_none());
    }

    #[test]
    fn test_partial_registry() {
        let registry = ResolverRegistry::builder()
            .register(Arc::new(NpmResolver::new(Arc::new(OfflineClient))))
            .build();
        assert!(registry.resolver_for(Ecosystem::Npm).is_some());
        assert!(registry.resolver_for(Ecosystem::Pypi).is_none());
    }
}
