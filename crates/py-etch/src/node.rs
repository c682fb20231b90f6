//! Core documentation node types
//!
//! This module provides `Symbol`, the central data structure representing
//! any documented item of a Python module, and `SymbolTable`, the ordered
//! collection of symbols extracted from one module.

use crate::decorators::DecoratorDef;
use crate::docstring::Docstring;
use crate::params::{format_params, ParamDef};
use crate::resolver::ModuleId;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source location for a documented item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Source filename, as given to the extractor
    pub filename: String,
    /// 1-indexed first line (the `def`/`class` line, after decorators)
    pub line: usize,
    /// 1-indexed last line
    pub end_line: usize,
}

impl Location {
    /// Create a new location
    pub fn new(filename: impl Into<String>, line: usize, end_line: usize) -> Self {
        Self {
            filename: filename.into(),
            line,
            end_line: end_line.max(line),
        }
    }

    /// Whether the item spans a single line
    pub fn is_single_line(&self) -> bool {
        self.line == self.end_line
    }
}

/// Kind of documented symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Module,
    Class,
    Function,
    Method,
    Property,
}

/// Class definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    /// Base class expressions as written
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,

    /// Class decorators
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorDef>,
}

/// Function or method definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    /// Parameters in declaration order
    pub params: Vec<ParamDef>,

    /// Return annotation as written
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<String>,

    /// `async def`
    #[serde(default)]
    pub is_async: bool,

    /// Body contains `yield`
    #[serde(default)]
    pub is_generator: bool,

    /// Decorators (excluding `@overload`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorDef>,

    /// Number of `@overload` variants folded into this definition
    #[serde(default)]
    pub overloads: usize,
}

impl FunctionDef {
    /// Signature line without decorators, e.g. `async fetch(url: str) -> bytes`
    pub fn signature(&self, name: &str) -> String {
        let mut sig = String::new();
        if self.is_async {
            sig.push_str("async ");
        }
        sig.push_str(name);
        sig.push('(');
        sig.push_str(&format_params(&self.params));
        sig.push(')');
        if let Some(ref returns) = self.returns {
            sig.push_str(" -> ");
            sig.push_str(returns);
        }
        sig
    }
}

/// Property definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    /// Getter return annotation
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub returns: Option<String>,

    /// A `.setter` accessor exists
    #[serde(default)]
    pub settable: bool,

    /// A `.deleter` accessor exists
    #[serde(default)]
    pub deletable: bool,

    /// Getter decorators other than the property decorator itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorDef>,
}

/// Specific definition for each symbol kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SymbolDef {
    /// Module-level documentation (no definition)
    Module,

    #[serde(rename_all = "camelCase")]
    Class { class_def: ClassDef },

    #[serde(rename_all = "camelCase")]
    Function { function_def: FunctionDef },

    #[serde(rename_all = "camelCase")]
    Method { function_def: FunctionDef },

    #[serde(rename_all = "camelCase")]
    Property { property_def: PropertyDef },
}

/// A documented symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// Local name (empty for the module symbol)
    pub name: String,

    /// Path inside the module, e.g. `Client.Options.merge`
    pub path: String,

    /// Fully qualified name, e.g. `pkg.client.Client.Options.merge`
    pub qualified_name: String,

    /// Path of the enclosing class, when nested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<String>,

    /// Source location
    pub location: Location,

    /// Visibility (public, private, excluded)
    pub visibility: Visibility,

    /// Docstring (raw text plus parsed sections)
    #[serde(skip_serializing_if = "Docstring::is_empty", default)]
    pub doc: Docstring,

    /// Kind-specific definition
    #[serde(flatten)]
    pub def: SymbolDef,
}

impl Symbol {
    /// Create the module symbol
    pub fn module(module: &ModuleId, location: Location, doc: Docstring) -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            qualified_name: module.to_string(),
            parent: None,
            location,
            visibility: Visibility::Public,
            doc,
            def: SymbolDef::Module,
        }
    }

    /// Create a symbol nested at `path` inside `module`
    pub fn new(module: &ModuleId, path: impl Into<String>, location: Location, def: SymbolDef) -> Self {
        let path = path.into();
        let (parent, name) = match path.rsplit_once('.') {
            Some((parent, name)) => (Some(parent.to_string()), name.to_string()),
            None => (None, path.clone()),
        };
        Self {
            name,
            qualified_name: format!("{}.{}", module, path),
            visibility: Visibility::from_path(&path),
            path,
            parent,
            location,
            doc: Docstring::default(),
            def,
        }
    }

    /// Attach a docstring
    pub fn with_doc(mut self, doc: Docstring) -> Self {
        self.doc = doc;
        self
    }

    /// Get the symbol kind
    pub fn kind(&self) -> SymbolKind {
        match &self.def {
            SymbolDef::Module => SymbolKind::Module,
            SymbolDef::Class { .. } => SymbolKind::Class,
            SymbolDef::Function { .. } => SymbolKind::Function,
            SymbolDef::Method { .. } => SymbolKind::Method,
            SymbolDef::Property { .. } => SymbolKind::Property,
        }
    }

    /// Nesting depth inside the module: 0 for the module, 1 for top-level
    /// symbols, 2 for class members and so on
    pub fn depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.split('.').count()
        }
    }

    /// Check if this is a class
    pub fn is_class(&self) -> bool {
        matches!(self.def, SymbolDef::Class { .. })
    }

    /// Decorators declared on this symbol
    pub fn decorators(&self) -> &[DecoratorDef] {
        match &self.def {
            SymbolDef::Module => &[],
            SymbolDef::Class { class_def } => &class_def.decorators,
            SymbolDef::Function { function_def } | SymbolDef::Method { function_def } => {
                &function_def.decorators
            }
            SymbolDef::Property { property_def } => &property_def.decorators,
        }
    }

    /// Python signature line, `None` for the module symbol
    pub fn signature(&self) -> Option<String> {
        match &self.def {
            SymbolDef::Module => None,
            SymbolDef::Class { class_def } => {
                if class_def.bases.is_empty() {
                    Some(format!("class {}", self.name))
                } else {
                    Some(format!("class {}({})", self.name, class_def.bases.join(", ")))
                }
            }
            SymbolDef::Function { function_def } | SymbolDef::Method { function_def } => {
                Some(function_def.signature(&self.name))
            }
            SymbolDef::Property { property_def } => Some(match property_def.returns {
                Some(ref returns) => format!("{}: {}", self.name, returns),
                None => self.name.clone(),
            }),
        }
    }
}

/// Ordered symbols of one module, in declaration order.
///
/// The first entry is always the module symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTable {
    /// Module the symbols were extracted from
    pub module: ModuleId,

    /// Source file path
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_path: Option<PathBuf>,

    /// Symbols in declaration order
    pub symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a table holding only the module symbol
    pub fn new(module: ModuleId, module_symbol: Symbol) -> Self {
        Self {
            module,
            source_path: None,
            symbols: vec![module_symbol],
        }
    }

    /// The module symbol
    pub fn module_symbol(&self) -> Option<&Symbol> {
        self.symbols
            .first()
            .filter(|s| matches!(s.def, SymbolDef::Module))
    }

    /// Every symbol except the module symbol
    pub fn members(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|s| !matches!(s.def, SymbolDef::Module))
    }

    /// Look up a symbol by its in-module path
    pub fn get(&self, path: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.path == path)
    }

    /// No module docstring and no documented members
    pub fn is_empty_module(&self) -> bool {
        let has_doc = self
            .module_symbol()
            .map(|s| !s.doc.is_empty())
            .unwrap_or(false);
        !has_doc && self.members().next().is_none()
    }

    /// Number of symbols, module symbol included
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table holds no symbols at all
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamKind;

    fn module() -> ModuleId {
        ModuleId::new("pkg.client")
    }

    #[test]
    fn test_nested_symbol_paths() {
        let sym = Symbol::new(
            &module(),
            "Client.Options.merge",
            Location::new("client.py", 10, 12),
            SymbolDef::Method {
                function_def: FunctionDef::default(),
            },
        );
        assert_eq!(sym.name, "merge");
        assert_eq!(sym.parent.as_deref(), Some("Client.Options"));
        assert_eq!(sym.qualified_name, "pkg.client.Client.Options.merge");
        assert_eq!(sym.depth(), 3);
        assert_eq!(sym.kind(), SymbolKind::Method);
    }

    #[test]
    fn test_function_signature() {
        let def = FunctionDef {
            params: vec![
                ParamDef::named("url").with_annotation("str"),
                ParamDef::named("timeout")
                    .with_kind(ParamKind::KeywordOnly)
                    .with_default("5"),
            ],
            returns: Some("bytes".into()),
            is_async: true,
            ..Default::default()
        };
        let sym = Symbol::new(
            &module(),
            "fetch",
            Location::new("client.py", 1, 3),
            SymbolDef::Function { function_def: def },
        );
        assert_eq!(
            sym.signature().as_deref(),
            Some("async fetch(url: str, *, timeout = 5) -> bytes")
        );
    }

    #[test]
    fn test_class_and_property_signatures() {
        let class = Symbol::new(
            &module(),
            "Client",
            Location::new("client.py", 1, 30),
            SymbolDef::Class {
                class_def: ClassDef {
                    bases: vec!["Base".into(), "Generic[T]".into()],
                    decorators: vec![],
                },
            },
        );
        assert_eq!(class.signature().as_deref(), Some("class Client(Base, Generic[T])"));

        let prop = Symbol::new(
            &module(),
            "Client.host",
            Location::new("client.py", 5, 7),
            SymbolDef::Property {
                property_def: PropertyDef {
                    returns: Some("str".into()),
                    ..Default::default()
                },
            },
        );
        assert_eq!(prop.signature().as_deref(), Some("host: str"));
    }

    #[test]
    fn test_private_symbol_visibility() {
        let sym = Symbol::new(
            &module(),
            "Client._reset",
            Location::default(),
            SymbolDef::Method {
                function_def: FunctionDef::default(),
            },
        );
        assert_eq!(sym.visibility, Visibility::Private);
    }

    #[test]
    fn test_empty_module_table() {
        let m = module();
        let table = SymbolTable::new(m.clone(), Symbol::module(&m, Location::default(), Docstring::default()));
        assert!(table.is_empty_module());
        assert!(table.module_symbol().is_some());

        let documented = SymbolTable::new(
            m.clone(),
            Symbol::module(&m, Location::default(), Docstring::parse("Client helpers.")),
        );
        assert!(!documented.is_empty_module());
    }
}
