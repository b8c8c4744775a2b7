//! Supported package ecosystems

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CoordinateError;

/// Package-repository family, keyed by its package URL type.
///
/// The set is closed: a coordinate whose type is not listed here is rejected
/// by the parser before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Cargo,
    Composer,
    Gem,
    Golang,
    Hackage,
    Hex,
    Maven,
    Npm,
    Nuget,
    Pypi,
}

/// Whether a coordinate of a given ecosystem carries a namespace segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespacePolicy {
    /// Maven groupId, Composer vendor, Go module path prefix
    Required,
    /// npm scope, Hex organisation
    Optional,
    Forbidden,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 10] = [
        Ecosystem::Cargo,
        Ecosystem::Composer,
        Ecosystem::Gem,
        Ecosystem::Golang,
        Ecosystem::Hackage,
        Ecosystem::Hex,
        Ecosystem::Maven,
        Ecosystem::Npm,
        Ecosystem::Nuget,
        Ecosystem::Pypi,
    ];

    /// The package URL type string for this ecosystem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Cargo => "cargo",
            Ecosystem::Composer => "composer",
            Ecosystem::Gem => "gem",
            Ecosystem::Golang => "golang",
            Ecosystem::Hackage => "hackage",
            Ecosystem::Hex => "hex",
            Ecosystem::Maven => "maven",
            Ecosystem::Npm => "npm",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Pypi => "pypi",
        }
    }

    pub fn namespace_policy(&self) -> NamespacePolicy {
        match self {
            Ecosystem::Maven | Ecosystem::Composer | Ecosystem::Golang => NamespacePolicy::Required,
            Ecosystem::Npm | Ecosystem::Hex => NamespacePolicy::Optional,
            Ecosystem::Cargo
            | Ecosystem::Gem
            | Ecosystem::Hackage
            | Ecosystem::Nuget
            | Ecosystem::Pypi => NamespacePolicy::Forbidden,
        }
    }

    /// Public registry used when no repositories are configured.
    pub fn default_repository_url(&self) -> &'static str {
        match self {
            Ecosystem::Cargo => "https://crates.io",
            Ecosystem::Composer => "https://repo.packagist.org",
            Ecosystem::Gem => "https://rubygems.org",
            Ecosystem::Golang => "https://proxy.golang.org",
            Ecosystem::Hackage => "https://hackage.haskell.org",
            Ecosystem::Hex => "https://hex.pm",
            Ecosystem::Maven => "https://repo1.maven.org/maven2",
            Ecosystem::Npm => "https://registry.npmjs.org",
            Ecosystem::Nuget => "https://api.nuget.org",
            Ecosystem::Pypi => "https://pypi.org",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Ecosystem::ALL
            .into_iter()
            .find(|ecosystem| ecosystem.as_str() == lowered)
            .ok_or(CoordinateError::UnsupportedEcosystem(lowered))
    }
}
