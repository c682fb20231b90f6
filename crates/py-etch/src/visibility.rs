//! Visibility handling
//!
//! This module provides types for tracking symbol visibility
//! (public, private, excluded) in documentation.

use serde::{Deserialize, Serialize};

/// Symbol visibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// Public name (documented)
    #[default]
    Public,

    /// A path segment starts with an underscore
    Private,

    /// Matched an exclusion entry
    Excluded,
}

impl Visibility {
    /// Visibility implied by a dotted path: private when any segment
    /// starts with `_`.
    pub fn from_path(path: &str) -> Self {
        if path.split('.').any(|segment| segment.starts_with('_')) {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    /// Check if this is publicly visible
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }

    /// Check if this should be included in documentation
    pub fn should_document(&self, include_private: bool) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Private => include_private,
            Visibility::Excluded => false,
        }
    }

    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Excluded => "excluded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_path() {
        assert_eq!(Visibility::from_path("Client.connect"), Visibility::Public);
        assert_eq!(Visibility::from_path("_helper"), Visibility::Private);
        assert_eq!(Visibility::from_path("Client._reset"), Visibility::Private);
        assert_eq!(Visibility::from_path("Client.__init__"), Visibility::Private);
    }

    #[test]
    fn test_should_document() {
        assert!(Visibility::Public.should_document(false));
        assert!(!Visibility::Private.should_document(false));
        assert!(Visibility::Private.should_document(true));
        assert!(!Visibility::Excluded.should_document(true));
    }
}
