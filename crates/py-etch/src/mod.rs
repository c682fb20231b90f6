//! py-etch: API reference generator for Python packages
//!
//! This crate generates documentation for a Python package by:
//! - Discovering the package's modules on disk
//! - Parsing each module with rustpython-parser (never importing it)
//! - Extracting classes, functions, methods and properties with their
//!   literal signatures and Google-style docstrings
//! - Rendering one MDX or Markdown page per module, in parallel
//! - Merging a generated navigation subtree into the site's `docs.json`
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ ModuleResolver  │  pkg/**/*.py → sorted ModuleEntry list
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────────────────────────────┐
//! │ Etcher (bounded worker pool, per module) │
//! │   Extractor → SymbolTable               │
//! │   MarkdownRenderer → document text      │
//! │   write_if_changed                      │
//! └────────┬────────────────────────────────┘
//!          ▼  join, sort succeeded ids
//! ┌─────────────────┐
//! │ build_navigation│ → merge into docs.json
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use py_etch::EtchBuilder;
//!
//! let output = EtchBuilder::new("mypkg")
//!     .output_dir("docs/python-sdk")
//!     .navigation("docs/docs.json", "SDK Reference")
//!     .build()
//!     .expect("Failed to generate docs");
//! println!("{} modules documented", output.documented_count());
//! ```

// Core types
pub mod decorators;
pub mod docstring;
pub mod node;
pub mod params;
pub mod visibility;

// Parsing and resolution
pub mod diagnostics;
pub mod parser;
pub mod resolver;

// Output
pub mod builder;
pub mod docgen;
pub mod nav;
pub mod printer;

// Test utilities - available for downstream crate testing
pub mod test;

// Re-exports for convenience
pub use builder::{BuildOutput, EtchBuilder, NavigationStatus};
pub use decorators::DecoratorDef;
pub use diagnostics::{Diagnostic, DiagnosticsCollector, EtchError, EtchResult};
pub use docstring::{DocSection, Docstring};
pub use node::{Location, Symbol, SymbolDef, SymbolKind, SymbolTable};
pub use params::{ParamDef, ParamKind};
pub use parser::{ExtractOptions, Extractor};
pub use resolver::{ModuleEntry, ModuleId, ModuleResolver, Resolution};
pub use visibility::Visibility;

pub use docgen::{
    normalize_github_remote, EtchConfig, Etcher, MarkdownRenderer, OutputFormat, RenderOptions,
    RunReport, SourceLinker,
};
pub use nav::{build_navigation, update_navigation_file, NavNode, NavPage};
pub use printer::EtchPrinter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
