//! Parameter definition types
//!
//! This module provides types for representing function parameters
//! in documentation. Annotations and defaults are the literal source
//! text; nothing is evaluated or resolved.

use serde::{Deserialize, Serialize};

/// Position of a parameter in a Python signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamKind {
    /// Before `/`
    PositionalOnly,
    /// Ordinary positional-or-keyword parameter
    #[default]
    Regular,
    /// `*args`
    VarPositional,
    /// After `*` or `*args`
    KeywordOnly,
    /// `**kwargs`
    VarKeyword,
}

/// Parameter definition for functions and methods
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDef {
    /// Parameter name
    pub name: String,

    /// Parameter kind
    #[serde(default)]
    pub kind: ParamKind,

    /// Annotation as written in the source
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub annotation: Option<String>,

    /// Default value as written in the source
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default: Option<String>,
}

impl ParamDef {
    /// Create a regular parameter with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the parameter kind
    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the annotation text
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Set the default value text
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Whether the caller may omit this parameter
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
            || matches!(self.kind, ParamKind::VarPositional | ParamKind::VarKeyword)
    }

    /// Python parameter declaration, e.g. `timeout: float = 5.0` or `**kwargs`
    pub fn to_python(&self) -> String {
        let prefix = match self.kind {
            ParamKind::VarPositional => "*",
            ParamKind::VarKeyword => "**",
            _ => "",
        };

        let mut result = format!("{}{}", prefix, self.name);
        if let Some(ref annotation) = self.annotation {
            result.push_str(": ");
            result.push_str(annotation);
        }
        if let Some(ref default) = self.default {
            result.push_str(" = ");
            result.push_str(default);
        }
        result
    }
}

/// Format a parameter list in declaration order.
///
/// Inserts the `/` separator after positional-only parameters and a bare
/// `*` before keyword-only parameters when there is no `*args`.
pub fn format_params(params: &[ParamDef]) -> String {
    let mut parts = Vec::with_capacity(params.len() + 2);
    let has_var_positional = params.iter().any(|p| p.kind == ParamKind::VarPositional);
    let mut previous: Option<ParamKind> = None;

    for param in params {
        if previous == Some(ParamKind::PositionalOnly) && param.kind != ParamKind::PositionalOnly {
            parts.push("/".to_string());
        }
        if param.kind == ParamKind::KeywordOnly
            && !has_var_positional
            && previous != Some(ParamKind::KeywordOnly)
        {
            parts.push("*".to_string());
        }
        parts.push(param.to_python());
        previous = Some(param.kind);
    }

    if previous == Some(ParamKind::PositionalOnly) {
        parts.push("/".to_string());
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_param_to_python() {
        let p = ParamDef::named("timeout")
            .with_annotation("float")
            .with_default("5.0");
        assert_eq!(p.to_python(), "timeout: float = 5.0");
        assert!(p.is_optional());

        let p = ParamDef::named("flag").with_default("True");
        assert_eq!(p.to_python(), "flag = True");

        let p = ParamDef::named("kwargs")
            .with_kind(ParamKind::VarKeyword)
            .with_annotation("Any");
        assert_eq!(p.to_python(), "**kwargs: Any");
    }

    #[test]
    fn test_format_params_separators() {
        let params = vec![
            ParamDef::named("a").with_kind(ParamKind::PositionalOnly),
            ParamDef::named("b"),
            ParamDef::named("c")
                .with_kind(ParamKind::KeywordOnly)
                .with_default("None"),
            ParamDef::named("kw").with_kind(ParamKind::VarKeyword),
        ];
        assert_eq!(format_params(&params), "a, /, b, *, c = None, **kw");
    }

    #[test]
    fn test_format_params_with_varargs() {
        let params = vec![
            ParamDef::named("self"),
            ParamDef::named("args").with_kind(ParamKind::VarPositional),
            ParamDef::named("key").with_kind(ParamKind::KeywordOnly),
        ];
        assert_eq!(format_params(&params), "self, *args, key");
    }

    #[test]
    fn test_format_params_trailing_positional_only() {
        let params = vec![
            ParamDef::named("x").with_kind(ParamKind::PositionalOnly),
            ParamDef::named("y").with_kind(ParamKind::PositionalOnly),
        ];
        assert_eq!(format_params(&params), "x, y, /");
        assert_eq!(format_params(&[]), "");
    }
}
