//! Documentation generation core
//!
//! This module provides the per-module pipeline: rendering symbol tables to
//! MDX or Markdown, building source links, writing documents and running
//! all of it over a bounded worker pool.

mod etcher;
pub mod markdown;
pub mod output;
pub mod source_links;

pub use etcher::{
    run_units, EtchConfig, Etcher, RunReport, UnitOutcome, UnitSuccess, DEFAULT_WORKERS,
};
pub use markdown::{escape_mdx, MarkdownRenderer, OutputFormat, RenderOptions, EMPTY_MODULE_NOTICE};
pub use output::{
    document_stem, prune_stale, remove_excluded, write_if_changed, WriteStats, WriteStatus,
};
pub use source_links::{normalize_github_remote, SourceLinker};
