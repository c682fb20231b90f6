//! Decorator definitions
//!
//! Decorators are recorded exactly as written in the source. They are
//! never evaluated; the extractor only inspects their names to recognise
//! properties, accessors and `@overload` variants.

use serde::{Deserialize, Serialize};

/// Decorator definition
///
/// Represents a Python decorator like:
/// - `@property`
/// - `@functools.lru_cache(maxsize=None)`
/// - `@typing.overload`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorDef {
    /// Dotted decorator name without `@` and call arguments
    pub name: String,

    /// Source text of the decorator expression (without `@`)
    pub text: String,
}

impl DecoratorDef {
    /// Create a decorator from the expression text following `@`
    pub fn from_source(text: impl Into<String>) -> Self {
        let text = text.into();
        let name = text
            .split('(')
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .collect::<String>();
        Self { name, text }
    }

    /// Whether the decorator is called with arguments
    pub fn is_factory(&self) -> bool {
        self.text.contains('(')
    }

    /// Check if this is a specific decorator by its final name segment
    pub fn is(&self, name: &str) -> bool {
        self.name == name || self.name.ends_with(&format!(".{}", name))
    }

    /// `@overload` / `@typing.overload`
    pub fn is_overload(&self) -> bool {
        self.is("overload")
    }

    /// `@property`, `@cached_property` and `@functools.cached_property`
    pub fn is_property(&self) -> bool {
        self.is("property") || self.is("cached_property")
    }

    /// `@<name>.setter` / `@<name>.deleter`
    pub fn is_accessor(&self) -> bool {
        self.name.ends_with(".setter") || self.name.ends_with(".deleter")
    }

    /// Python decorator syntax
    pub fn to_python(&self) -> String {
        format!("@{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_decorator() {
        let dec = DecoratorDef::from_source("property");
        assert_eq!(dec.name, "property");
        assert!(dec.is_property());
        assert!(!dec.is_factory());
        assert_eq!(dec.to_python(), "@property");
    }

    #[test]
    fn test_factory_decorator() {
        let dec = DecoratorDef::from_source("functools.lru_cache(maxsize=None)");
        assert_eq!(dec.name, "functools.lru_cache");
        assert!(dec.is_factory());
        assert!(dec.is("lru_cache"));
        assert_eq!(dec.to_python(), "@functools.lru_cache(maxsize=None)");
    }

    #[test]
    fn test_overload_and_accessors() {
        assert!(DecoratorDef::from_source("overload").is_overload());
        assert!(DecoratorDef::from_source("typing.overload").is_overload());
        assert!(!DecoratorDef::from_source("overloaded").is_overload());
        assert!(DecoratorDef::from_source("value.setter").is_accessor());
        assert!(DecoratorDef::from_source("value.deleter").is_accessor());
        assert!(DecoratorDef::from_source("functools.cached_property").is_property());
    }
}
