//! HTTP-backed resolvers, one per supported ecosystem

pub mod cargo;
pub mod composer;
pub mod gem;
pub mod golang;
pub mod hackage;
pub mod hex;
pub mod maven;
pub mod npm;
pub mod nuget;
pub mod pypi;
mod support;

pub use cargo::CargoResolver;
pub use composer::ComposerResolver;
pub use gem::GemResolver;
pub use golang::GoModulesResolver;
pub use hackage::HackageResolver;
pub use hex::HexResolver;
pub use maven::MavenResolver;
pub use npm::NpmResolver;
pub use nuget::NugetResolver;
pub use pypi::PypiResolver;
