//! Etcher - Main documentation generation orchestrator
//!
//! This module provides the Etcher struct which runs extract, render and
//! write for every resolved module over a bounded worker pool. Units are
//! isolated from each other: a failing or panicking unit becomes a failure
//! record and never aborts its siblings.

use crate::diagnostics::{DiagnosticsCollector, EtchError, EtchResult};
use crate::docgen::markdown::{MarkdownRenderer, OutputFormat, RenderOptions};
use crate::docgen::output::{document_stem, is_landing, write_if_changed, WriteStats, WriteStatus};
use crate::docgen::source_links::SourceLinker;
use crate::parser::{ExtractOptions, Extractor};
use crate::resolver::{ModuleEntry, ModuleId, ModuleResolver, Resolution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default worker pool size
pub const DEFAULT_WORKERS: usize = 8;

/// Configuration for the Etcher
///
/// Every field has a default, so a `py-etch.toml` only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtchConfig {
    /// Root package to discover modules under
    pub root_module: Option<String>,
    /// Explicit module list; bypasses discovery when non-empty
    pub modules: Vec<String>,
    /// Module/symbol prefixes to exclude
    pub exclude: Vec<String>,
    /// Project directory holding the package (`src/` layout is detected)
    pub source_root: PathBuf,
    /// Output directory for rendered documents
    pub output_dir: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Navigation document to update
    pub navigation_file: PathBuf,
    /// Anchor or group name owning the generated navigation
    pub navigation_target: String,
    /// Whether to update the navigation document
    pub update_navigation: bool,
    /// Promote children of empty parent modules in the navigation
    pub collapse_empty_parents: bool,
    /// Page reference prefix; defaults to the output directory relative
    /// to the navigation document
    pub nav_prefix: Option<String>,
    /// Repository URL for source links
    pub repo_url: Option<String>,
    /// Branch for source links
    pub branch: String,
    /// Repository checkout root used to relativize source paths
    pub source_link_root: Option<PathBuf>,
    /// Custom source link label
    pub link_text: Option<String>,
    /// Document underscore-prefixed symbols
    pub include_private: bool,
    /// Worker pool size
    pub workers: usize,
    /// Delete documents of modules that no longer exist
    pub prune_stale: bool,
}

impl Default for EtchConfig {
    fn default() -> Self {
        Self {
            root_module: None,
            modules: Vec::new(),
            exclude: Vec::new(),
            source_root: PathBuf::from("."),
            output_dir: PathBuf::from("docs/python-sdk"),
            format: OutputFormat::Mdx,
            navigation_file: PathBuf::from("docs/docs.json"),
            navigation_target: "SDK Reference".to_string(),
            update_navigation: true,
            collapse_empty_parents: false,
            nav_prefix: None,
            repo_url: None,
            branch: "main".to_string(),
            source_link_root: None,
            link_text: None,
            include_private: false,
            workers: DEFAULT_WORKERS,
            prune_stale: true,
        }
    }
}

impl EtchConfig {
    /// Create a config documenting everything under `root_module`
    pub fn new(root_module: impl Into<String>) -> Self {
        Self {
            root_module: Some(root_module.into()),
            ..Default::default()
        }
    }

    /// Parse a TOML configuration
    pub fn from_toml_str(text: &str) -> EtchResult<Self> {
        toml::from_str(text).map_err(|e| EtchError::config(e.to_string()))
    }

    /// Load a `py-etch.toml` file
    pub fn from_toml_file(path: impl AsRef<Path>) -> EtchResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EtchError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Check option combinations before any work starts
    pub fn validate(&self) -> EtchResult<()> {
        if self.workers == 0 {
            return Err(EtchError::config("workers must be at least 1"));
        }
        if self.root_module.is_none() && self.modules.is_empty() {
            return Err(EtchError::config(
                "either a root module or an explicit module list is required",
            ));
        }
        if self.update_navigation && self.navigation_target.trim().is_empty() {
            return Err(EtchError::config("navigation target name is empty"));
        }
        Ok(())
    }

    /// Module resolver for this configuration
    pub fn resolver(&self) -> ModuleResolver {
        let mut resolver = ModuleResolver::new(&self.source_root)
            .modules(self.modules.iter().cloned())
            .exclude(self.exclude.iter().cloned());
        if let Some(ref root) = self.root_module {
            resolver = resolver.root(root.clone());
        }
        resolver
    }

    /// Extraction options for this configuration
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            include_private: self.include_private,
            exclude: self.exclude.clone(),
        }
    }

    /// Render options for this configuration
    pub fn render_options(&self) -> RenderOptions {
        let source_linker = self.repo_url.as_ref().map(|url| {
            let mut linker = SourceLinker::new(url.clone(), self.branch.clone());
            if let Some(ref root) = self.root_module {
                linker = linker.with_root_module(root.clone());
            }
            if let Some(ref link_root) = self.source_link_root {
                linker = linker.with_link_root(link_root.clone());
            }
            linker
        });

        RenderOptions {
            format: self.format,
            link_text: self.link_text.clone(),
            source_linker,
        }
    }
}

/// A successfully processed unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSuccess {
    /// Document file stem
    pub stem: String,
    /// Written path
    pub path: PathBuf,
    /// Write outcome
    pub status: WriteStatus,
    /// Module had no docstring and no documented symbols
    pub empty: bool,
}

/// Outcome of one unit
#[derive(Debug)]
pub struct UnitOutcome {
    /// Module identifier
    pub module: ModuleId,
    /// Time spent in the unit
    pub elapsed: Duration,
    /// Success payload or the unit's error
    pub result: EtchResult<UnitSuccess>,
}

impl UnitOutcome {
    /// Whether the unit succeeded
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of a run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Unit outcomes, sorted by module identifier
    pub outcomes: Vec<UnitOutcome>,
    /// Wall-clock time of the whole batch
    pub elapsed: Duration,
}

impl RunReport {
    /// Units processed
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Units failed
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    /// Whether every unit succeeded
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Succeeded units, sorted by module identifier
    pub fn succeeded(&self) -> impl Iterator<Item = (&ModuleId, &UnitSuccess)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (&o.module, s)))
    }

    /// Failed units with their errors, sorted by module identifier
    pub fn failures(&self) -> impl Iterator<Item = (&ModuleId, &EtchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.module, e)))
    }

    /// Write counters over succeeded units
    pub fn write_stats(&self) -> WriteStats {
        let mut stats = WriteStats::default();
        for (_, success) in self.succeeded() {
            stats.record(success.status);
        }
        stats
    }
}

/// Run `unit` for every module on at most `workers` blocking threads.
///
/// Results come back sorted by module identifier regardless of completion
/// order. A panicking unit is reported as a failure for its module.
pub async fn run_units<F, T>(
    modules: Vec<ModuleEntry>,
    workers: usize,
    unit: F,
) -> Vec<(ModuleId, Duration, EtchResult<T>)>
where
    F: Fn(&ModuleEntry) -> EtchResult<T> + Send + Sync + 'static,
    T: Send + 'static,
{
    let unit = Arc::new(unit);
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut pending: BTreeSet<ModuleId> = modules.iter().map(|m| m.id.clone()).collect();
    let mut join_set = JoinSet::new();

    for entry in modules {
        let unit = Arc::clone(&unit);
        let permits = Arc::clone(&semaphore);

        join_set.spawn(async move {
            let id = entry.id.clone();
            let Ok(_permit) = permits.acquire_owned().await else {
                return (id, Duration::ZERO, Err(EtchError::other("worker pool closed")));
            };

            let started = Instant::now();
            let span = tracing::info_span!("unit", module = %id);
            let joined = tokio::task::spawn_blocking(move || {
                let _guard = span.enter();
                unit(&entry)
            })
            .await;

            let result = match joined {
                Ok(result) => result,
                Err(join_err) => Err(EtchError::other(panic_message(join_err))),
            };
            (id, started.elapsed(), result)
        });
    }

    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(result) => {
                pending.remove(&result.0);
                results.push(result);
            }
            Err(join_err) => tracing::error!("unit task failed: {}", join_err),
        }
    }
    for id in pending {
        results.push((id, Duration::ZERO, Err(EtchError::other("unit task aborted"))));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return format!("unit cancelled: {}", err);
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("unit panicked: {}", message)
}

/// The main documentation generator
///
/// Etcher coordinates the per-module pipeline:
/// 1. Resolve the module set
/// 2. Extract each module's symbol table
/// 3. Render it for the configured format
/// 4. Write the document if its bytes changed
pub struct Etcher {
    /// Configuration
    config: EtchConfig,
    /// Diagnostics collector
    diagnostics: DiagnosticsCollector,
}

impl Etcher {
    /// Create a new Etcher with the given configuration
    pub fn new(config: EtchConfig) -> Self {
        Self {
            config,
            diagnostics: DiagnosticsCollector::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &EtchConfig {
        &self.config
    }

    /// Get the diagnostics
    pub fn diagnostics(&self) -> &DiagnosticsCollector {
        &self.diagnostics
    }

    /// Resolve the module set. Fatal errors abort before any unit starts.
    pub fn resolve(&mut self) -> EtchResult<Resolution> {
        self.config.validate()?;
        let resolution = self.config.resolver().resolve()?;
        self.diagnostics.extend(resolution.diagnostics.clone());
        Ok(resolution)
    }

    /// Process every resolved module
    pub async fn run(&self, resolution: &Resolution) -> RunReport {
        let started = Instant::now();
        let all_ids = Arc::new(resolution.ids());
        let extractor = Arc::new(Extractor::new(self.config.extract_options()));
        let renderer = Arc::new(MarkdownRenderer::new(self.config.render_options()));
        let output_dir = self.config.output_dir.clone();
        let extension = self.config.format.extension();

        tracing::info!(
            modules = all_ids.len(),
            workers = self.config.workers,
            "generating documentation"
        );

        let results = run_units(
            resolution.modules.clone(),
            self.config.workers,
            move |entry: &ModuleEntry| -> EtchResult<UnitSuccess> {
                let table = extractor.extract_file(entry)?;
                let landing = is_landing(&entry.id, &all_ids);
                let text = renderer.render(&table, landing)?;

                let stem = document_stem(&entry.id, &all_ids);
                let path = output_dir.join(format!("{}.{}", stem, extension));
                let status = write_if_changed(&path, &text)?;
                tracing::debug!(path = %path.display(), ?status, "wrote document");

                Ok(UnitSuccess {
                    stem,
                    path,
                    status,
                    empty: table.is_empty_module(),
                })
            },
        )
        .await;

        let outcomes: Vec<UnitOutcome> = results
            .into_iter()
            .map(|(module, elapsed, result)| {
                if let Err(ref err) = result {
                    tracing::warn!(module = %module, "{}", err);
                }
                UnitOutcome {
                    module,
                    elapsed,
                    result,
                }
            })
            .collect();

        RunReport {
            outcomes,
            elapsed: started.elapsed(),
        }
    }

    /// Run on a private runtime for synchronous callers
    pub fn run_blocking(&self, resolution: &Resolution) -> EtchResult<RunReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .max_blocking_threads(self.config.workers.max(1))
            .build()?;
        Ok(runtime.block_on(self.run(resolution)))
    }
}
