//! Test utilities and fixtures for py-etch.
//!
//! This module provides helpers for building package trees on disk and
//! mock symbols/tables for renderer tests.
//!
//! # Example
//!
//! ```
//! use py_etch::test::{mock_function, mock_table};
//!
//! let table = mock_table("pkg.core", "Core helpers.", vec![mock_function("pkg.core", "run")]);
//! assert_eq!(table.symbols.len(), 2);
//! ```

use std::fs;
use std::path::Path;

use crate::docstring::Docstring;
use crate::node::{ClassDef, FunctionDef, Location, Symbol, SymbolDef, SymbolTable};
use crate::params::ParamDef;
use crate::resolver::ModuleId;

/// Write `(relative path, contents)` pairs below `root`, creating directories.
///
/// Panics on I/O failure; intended for tests only.
pub fn write_package(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        fs::write(&path, contents).expect("write fixture file");
    }
}

/// Create a mock location in `<module>.py`.
pub fn mock_location(module: &str, line: usize) -> Location {
    Location::new(format!("{}.py", module.replace('.', "/")), line, line + 1)
}

/// Create a mock top-level function `name(value: str) -> None`.
pub fn mock_function(module: &str, name: &str) -> Symbol {
    let function_def = FunctionDef {
        params: vec![ParamDef::named("value").with_annotation("str")],
        returns: Some("None".into()),
        ..Default::default()
    };
    Symbol::new(
        &ModuleId::new(module),
        name,
        mock_location(module, 1),
        SymbolDef::Function { function_def },
    )
    .with_doc(Docstring::parse(&format!("Run {}.", name)))
}

/// Create a mock class with no bases.
pub fn mock_class(module: &str, name: &str) -> Symbol {
    Symbol::new(
        &ModuleId::new(module),
        name,
        mock_location(module, 1),
        SymbolDef::Class {
            class_def: ClassDef::default(),
        },
    )
}

/// Create a mock symbol table with a module docstring followed by `symbols`.
pub fn mock_table(module: &str, doc: &str, symbols: Vec<Symbol>) -> SymbolTable {
    let id = ModuleId::new(module);
    let mut table = SymbolTable::new(
        id.clone(),
        Symbol::module(&id, mock_location(module, 1), Docstring::parse(doc)),
    );
    table.symbols.extend(symbols);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SymbolKind;

    #[test]
    fn test_mock_table() {
        let table = mock_table(
            "pkg.core",
            "Core.",
            vec![mock_class("pkg.core", "Engine"), mock_function("pkg.core", "run")],
        );
        assert_eq!(table.symbols.len(), 3);
        assert_eq!(table.symbols[1].kind(), SymbolKind::Class);
        assert_eq!(table.symbols[2].qualified_name, "pkg.core.run");
        assert!(!table.is_empty_module());
    }

    #[test]
    fn test_write_package() {
        let dir = tempfile::TempDir::new().unwrap();
        write_package(dir.path(), &[("a/b/c.py", "x = 1\n")]);
        assert_eq!(fs::read_to_string(dir.path().join("a/b/c.py")).unwrap(), "x = 1\n");
    }
}
