//! Capability registry and token resolution.
//!
//! Configuration authors name host constants by string (`"MildFiltering"`,
//! `"RasterFormatGeoTIFF"`, ...). The registry is the single place where that
//! vocabulary meets the host: it is built once when a host is bound and
//! looked up by name with an explicit present/absent answer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, Result};

/// Name of the constructor capability used to build coordinate systems.
pub const COORDINATE_SYSTEM: &str = "CoordinateSystem";

/// One entry of a host's declared surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// Enumeration value passed to host operations.
    Constant(i64),
    /// Structural factory (e.g. coordinate system construction).
    Constructor,
}

/// A resolved host enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConstant {
    pub name: String,
    pub code: i64,
}

/// Operation parameter that names a host constant.
///
/// Non-string configuration values are taken as already concrete and kept
/// as literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Constant(HostConstant),
    Literal(Value),
}

impl Token {
    /// Numeric code of the token, if it has one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Token::Constant(c) => Some(c.code),
            Token::Literal(v) => v.as_i64(),
        }
    }

    /// Constant name, for registry-backed tokens.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Constant(c) => Some(&c.name),
            Token::Literal(_) => None,
        }
    }
}

/// Name → capability map for one host binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a declared surface table.
    pub fn from_surface<'a>(surface: impl IntoIterator<Item = &'a (&'a str, Capability)>) -> Self {
        let entries = surface
            .into_iter()
            .map(|(name, cap)| (name.to_string(), *cap))
            .collect();
        Self { entries }
    }

    pub fn with_constant(mut self, name: impl Into<String>, code: i64) -> Self {
        self.entries.insert(name.into(), Capability::Constant(code));
        self
    }

    pub fn with_constructor(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Capability::Constructor);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<Capability> {
        self.entries.get(name).copied()
    }

    /// Resolve a configuration value that may name a host constant.
    ///
    /// Strings are looked up and fall back to `default` when unknown; `None`
    /// yields `default`; anything else passes through as a literal.
    pub fn resolve_optional(&self, value: Option<&Value>, default: Token) -> Token {
        match value {
            None | Some(Value::Null) => default,
            Some(Value::String(name)) => match self.lookup(name) {
                Some(Capability::Constant(code)) => Token::Constant(HostConstant {
                    name: name.clone(),
                    code,
                }),
                Some(Capability::Constructor) | None => {
                    log::debug!("token {name:?} not declared by host, using default");
                    default
                }
            },
            Some(other) => Token::Literal(other.clone()),
        }
    }

    /// Look up a capability that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingCapability`] if `name` is not declared.
    pub fn resolve_required(&self, name: &str) -> Result<Capability> {
        self.lookup(name)
            .ok_or_else(|| PipelineError::MissingCapability(name.to_string()))
    }

    /// Like [`resolve_required`](Self::resolve_required) but the entry must be a constant.
    pub fn require_constant(&self, name: &str) -> Result<HostConstant> {
        match self.resolve_required(name)? {
            Capability::Constant(code) => Ok(HostConstant {
                name: name.to_string(),
                code,
            }),
            Capability::Constructor => Err(PipelineError::MissingCapability(format!(
                "{name} (declared as a constructor, not a constant)"
            ))),
        }
    }

    /// Require a constructor capability such as [`COORDINATE_SYSTEM`].
    pub fn require_constructor(&self, name: &str) -> Result<()> {
        match self.resolve_required(name)? {
            Capability::Constructor => Ok(()),
            Capability::Constant(_) => Err(PipelineError::MissingCapability(format!(
                "{name} (declared as a constant, not a constructor)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new()
            .with_constant("MildFiltering", 2)
            .with_constant("AggressiveFiltering", 3)
            .with_constructor(COORDINATE_SYSTEM)
    }

    fn fallback() -> Token {
        Token::Literal(json!("fallback"))
    }

    #[test]
    fn string_token_resolves_to_registered_constant() {
        let token = registry().resolve_optional(Some(&json!("MildFiltering")), fallback());
        assert_eq!(token.code(), Some(2));
        assert_eq!(token.name(), Some("MildFiltering"));
    }

    #[test]
    fn unknown_string_falls_back_to_default() {
        let token = registry().resolve_optional(Some(&json!("NotARealToken")), fallback());
        assert_eq!(token, fallback());
    }

    #[test]
    fn absent_and_null_fall_back_to_default() {
        let reg = registry();
        assert_eq!(reg.resolve_optional(None, fallback()), fallback());
        assert_eq!(reg.resolve_optional(Some(&Value::Null), fallback()), fallback());
    }

    #[test]
    fn non_string_values_pass_through() {
        let token = registry().resolve_optional(Some(&json!(7)), fallback());
        assert_eq!(token, Token::Literal(json!(7)));
        assert_eq!(token.code(), Some(7));
    }

    #[test]
    fn constructor_name_is_not_a_token() {
        let token = registry().resolve_optional(Some(&json!(COORDINATE_SYSTEM)), fallback());
        assert_eq!(token, fallback());
    }

    #[test]
    fn required_lookup_fails_when_absent() {
        let err = registry().resolve_required("ReferenceFormatCSV").unwrap_err();
        assert!(matches!(err, PipelineError::MissingCapability(name) if name == "ReferenceFormatCSV"));
    }

    #[test]
    fn require_constant_and_constructor_check_kind() {
        let reg = registry();
        assert_eq!(reg.require_constant("AggressiveFiltering").unwrap().code, 3);
        assert!(reg.require_constant(COORDINATE_SYSTEM).is_err());
        assert!(reg.require_constructor(COORDINATE_SYSTEM).is_ok());
        assert!(reg.require_constructor("MildFiltering").is_err());
    }
}
