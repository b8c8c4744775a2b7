//! Coordinate Parser
//!
//! Decodes package URL strings of the form
//! `pkg:<type>/[<namespace>/]<name>@<version>[?qualifiers][#subpath]`
//! into an immutable [`Coordinate`]. Parsing is pure: no I/O, no allocation
//! beyond the decoded fields.
//!
//! Qualifiers and subpath are accepted and discarded; only the ecosystem,
//! namespace, name and version take part in resolution.

use percent_encoding::percent_decode_str;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ecosystem::{Ecosystem, NamespacePolicy};
use super::errors::CoordinateError;

const SCHEME: &str = "pkg";

/// A parsed package identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    ecosystem: Ecosystem,
    namespace: Option<String>,
    name: String,
    version: String,
}

impl Coordinate {
    /// Parse a raw coordinate string.
    ///
    /// Structural problems are reported as [`CoordinateError::Malformed`]; a
    /// structurally valid coordinate with an unknown type is reported as
    /// [`CoordinateError::UnsupportedEcosystem`].
    pub fn parse(raw: &str) -> Result<Self, CoordinateError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoordinateError::malformed("empty coordinate"));
        }

        let without_subpath = raw.split_once('#').map_or(raw, |(head, _)| head);
        let without_qualifiers = without_subpath
            .split_once('?')
            .map_or(without_subpath, |(head, _)| head);

        let (scheme, remainder) = without_qualifiers
            .split_once(':')
            .ok_or_else(|| CoordinateError::malformed(format!("missing scheme in '{raw}'")))?;
        if !scheme.eq_ignore_ascii_case(SCHEME) {
            return Err(CoordinateError::malformed(format!(
                "unexpected scheme '{scheme}', expected '{SCHEME}'"
            )));
        }

        let remainder = remainder.trim_start_matches('/');
        let (package_type, path_and_version) = remainder
            .split_once('/')
            .ok_or_else(|| CoordinateError::malformed(format!("missing name in '{raw}'")))?;
        if package_type.is_empty()
            || !package_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
        {
            return Err(CoordinateError::malformed(format!(
                "invalid package type '{package_type}'"
            )));
        }

        let (path, version) = path_and_version
            .rsplit_once('@')
            .ok_or_else(|| CoordinateError::malformed(format!("missing version in '{raw}'")))?;
        let version = decode(version)?;
        if version.is_empty() {
            return Err(CoordinateError::malformed(format!("empty version in '{raw}'")));
        }

        let mut segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;
        let name = segments
            .pop()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CoordinateError::malformed(format!("missing name in '{raw}'")))?;
        let namespace = if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        };

        let ecosystem: Ecosystem = package_type.parse()?;
        match (ecosystem.namespace_policy(), &namespace) {
            (NamespacePolicy::Required, None) => {
                return Err(CoordinateError::malformed(format!(
                    "{ecosystem} coordinates require a namespace"
                )));
            }
            (NamespacePolicy::Forbidden, Some(ns)) => {
                return Err(CoordinateError::malformed(format!(
                    "{ecosystem} coordinates do not take a namespace, got '{ns}'"
                )));
            }
            _ => {}
        }

        Ok(Self {
            ecosystem,
            namespace,
            name,
            version,
        })
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `namespace/name`, or just `name` when there is no namespace.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}/{}", namespace, self.name),
            None => self.name.clone(),
        }
    }
}

fn decode(segment: &str) -> Result<String, CoordinateError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CoordinateError::malformed(format!("invalid percent-encoding: {e}")))
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}@{}",
            SCHEME,
            self.ecosystem,
            self.qualified_name(),
            self.version
        )
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_golang_with_module_path_namespace() {
        let coordinate = Coordinate::parse("pkg:golang/github.com/acme/acme-lib@9.1.1").unwrap();
        assert_eq!(coordinate.ecosystem(), Ecosystem::Golang);
        assert_eq!(coordinate.namespace(), Some("github.com/acme"));
        assert_eq!(coordinate.name(), "acme-lib");
        assert_eq!(coordinate.version(), "9.1.1");
    }

    #[test]
    fn test_parse_hackage_without_namespace() {
        let coordinate = Coordinate::parse("pkg:hackage/singletons-th@3.1").unwrap();
        assert_eq!(coordinate.ecosystem(), Ecosystem::Hackage);
        assert_eq!(coordinate.namespace(), None);
        assert_eq!(coordinate.name(), "singletons-th");
        assert_eq!(coordinate.version(), "3.1");
    }

    #[test]
    fn test_parse_npm_scope_encoded_and_literal() {
        let encoded = Coordinate::parse("pkg:npm/%40angular/core@16.0.0").unwrap();
        let literal = Coordinate::parse("pkg:npm/@angular/core@16.0.0").unwrap();
        assert_eq!(encoded, literal);
        assert_eq!(encoded.namespace(), Some("@angular"));
        assert_eq!(encoded.qualified_name(), "@angular/core");
    }

    #[test]
    fn test_parse_discards_qualifiers_and_subpath() {
        let coordinate =
            Coordinate::parse("pkg:maven/org.apache.commons/commons-lang3@3.12.0?type=jar#src")
                .unwrap();
        assert_eq!(coordinate.namespace(), Some("org.apache.commons"));
        assert_eq!(coordinate.name(), "commons-lang3");
        assert_eq!(coordinate.version(), "3.12.0");
    }

    #[test]
    fn test_scheme_and_type_are_case_insensitive() {
        let coordinate = Coordinate::parse("PKG:PyPI/requests@2.31.0").unwrap();
        assert_eq!(coordinate.ecosystem(), Ecosystem::Pypi);
    }

    #[test]
    fn test_missing_version_is_malformed() {
        let err = Coordinate::parse("pkg:cargo/serde").unwrap_err();
        assert!(matches!(err, CoordinateError::Malformed(_)));
        let err = Coordinate::parse("pkg:cargo/serde@").unwrap_err();
        assert!(matches!(err, CoordinateError::Malformed(_)));
    }

    #[test]
    fn test_wrong_scheme_is_malformed() {
        let err = Coordinate::parse("cpe:cargo/serde@1.0.0").unwrap_err();
        assert!(matches!(err, CoordinateError::Malformed(_)));
        let err = Coordinate::parse("just some text").unwrap_err();
        assert!(matches!(err, CoordinateError::Malformed(_)));
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        let err = Coordinate::parse("pkg:deb/debian/curl@7.50.3-1").unwrap_err();
        assert_eq!(err, CoordinateError::UnsupportedEcosystem("deb".to_string()));
    }

    #[test]
    fn test_namespace_policy_enforced() {
        assert!(matches!(
            Coordinate::parse("pkg:maven/commons-lang3@3.12.0"),
            Err(CoordinateError::Malformed(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:pypi/someone/requests@2.31.0"),
            Err(CoordinateError::Malformed(_))
        ));
        assert!(Coordinate::parse("pkg:npm/left-pad@1.3.0").is_ok());
        assert!(Coordinate::parse("pkg:hex/acme/phoenix@1.7.0").is_ok());
    }

    #[test]
    fn test_display_is_canonical() {
        let coordinate = Coordinate::parse("PKG:Golang/github.com/acme/acme-lib@9.1.1?x=y").unwrap();
        assert_eq!(
            coordinate.to_string(),
            "pkg:golang/github.com/acme/acme-lib@9.1.1"
        );
    }
}
