//! EtchBuilder - Main API for documentation generation
//!
//! This module provides the builder pattern API for configuring and
//! running a full generation pass: resolution, per-module documents,
//! cleanup of stale output and the navigation update.

use crate::diagnostics::{DiagnosticsCollector, EtchError, EtchResult};
use crate::docgen::output::{document_stem, prune_stale, remove_excluded};
use crate::docgen::{EtchConfig, Etcher, OutputFormat, RunReport};
use crate::nav::{
    build_navigation, documented_pages, nav_prefix, update_navigation_file, NavPage,
    NavUpdateResult,
};
use crate::resolver::{ModuleId, Resolution};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// What happened to the navigation document
#[derive(Debug)]
pub enum NavigationStatus {
    /// Updates are turned off
    Disabled,
    /// Nothing was generated, so the navigation was left alone
    NothingGenerated,
    /// The navigation file does not exist
    MissingFile(PathBuf),
    /// The generated subtree was merged
    Updated(NavUpdateResult),
    /// The target could not be located or the merge failed; the file is unchanged
    Failed(EtchError),
}

impl NavigationStatus {
    /// Whether this status makes the run fail
    pub fn is_failure(&self) -> bool {
        matches!(self, NavigationStatus::Failed(_))
    }
}

/// Build output of a full generation pass
#[derive(Debug)]
pub struct BuildOutput {
    /// Output directory
    pub output_dir: PathBuf,
    /// Per-module results
    pub report: RunReport,
    /// Documents deleted as excluded or stale
    pub removed: Vec<PathBuf>,
    /// Navigation update result
    pub navigation: NavigationStatus,
    /// Non-fatal conditions found along the way
    pub diagnostics: DiagnosticsCollector,
}

impl BuildOutput {
    /// Every module succeeded and the navigation (if enabled) was updated
    pub fn is_success(&self) -> bool {
        self.report.is_success() && !self.navigation.is_failure()
    }

    /// Number of documented modules
    pub fn documented_count(&self) -> usize {
        self.report.succeeded().count()
    }

    /// Paths of every document written this run
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.report.succeeded().map(|(_, s)| &s.path)
    }
}

/// Builder for configuring documentation generation
///
/// # Example
///
/// ```no_run
/// use py_etch::EtchBuilder;
///
/// let output = EtchBuilder::new("mypkg")
///     .source_root(".")
///     .output_dir("docs/python-sdk")
///     .exclude("mypkg.cli")
///     .repo_url("https://github.com/me/mypkg")
///     .build()
///     .expect("Failed to generate docs");
/// assert!(output.is_success());
/// ```
#[derive(Debug, Clone)]
pub struct EtchBuilder {
    config: EtchConfig,
}

impl EtchBuilder {
    /// Create a new builder documenting everything under `root_module`
    pub fn new(root_module: impl Into<String>) -> Self {
        Self {
            config: EtchConfig::new(root_module),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: EtchConfig) -> Self {
        Self { config }
    }

    /// Load the configuration from a `py-etch.toml` file
    pub fn from_toml_file(path: impl AsRef<Path>) -> EtchResult<Self> {
        Ok(Self::from_config(EtchConfig::from_toml_file(path)?))
    }

    /// Document exactly these modules instead of discovering them
    pub fn modules(mut self, modules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Add an exclusion prefix
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.config.exclude.push(prefix.into());
        self
    }

    /// Set the project directory
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_root = path.into();
        self
    }

    /// Set the output directory
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the navigation document and target anchor/group
    pub fn navigation(mut self, file: impl Into<PathBuf>, target: impl Into<String>) -> Self {
        self.config.navigation_file = file.into();
        self.config.navigation_target = target.into();
        self
    }

    /// Enable or disable the navigation update
    pub fn update_navigation(mut self, enable: bool) -> Self {
        self.config.update_navigation = enable;
        self
    }

    /// Promote children of empty parent modules in the navigation
    pub fn collapse_empty_parents(mut self, enable: bool) -> Self {
        self.config.collapse_empty_parents = enable;
        self
    }

    /// Set the repository URL used for source links
    pub fn repo_url(mut self, url: impl Into<String>) -> Self {
        self.config.repo_url = Some(url.into());
        self
    }

    /// Set the branch used for source links
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = branch.into();
        self
    }

    /// Set a custom source link label
    pub fn link_text(mut self, text: impl Into<String>) -> Self {
        self.config.link_text = Some(text.into());
        self
    }

    /// Include private symbols in documentation
    pub fn include_private(mut self, include: bool) -> Self {
        self.config.include_private = include;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Enable or disable deletion of stale documents
    pub fn prune_stale(mut self, enable: bool) -> Self {
        self.config.prune_stale = enable;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &EtchConfig {
        &self.config
    }

    /// Consume the builder, returning the configuration
    pub fn into_config(self) -> EtchConfig {
        self.config
    }

    /// Build the documentation
    ///
    /// This method:
    /// 1. Resolves the module set (fatal on failure)
    /// 2. Removes documents of excluded modules
    /// 3. Extracts, renders and writes every module in parallel
    /// 4. Removes documents of modules that no longer exist
    /// 5. Merges the navigation subtree into the navigation document
    pub fn build(self) -> EtchResult<BuildOutput> {
        let mut etcher = Etcher::new(self.config);
        let resolution = etcher.resolve()?;
        for diagnostic in etcher.diagnostics().diagnostics() {
            diagnostic.emit();
        }

        let config = etcher.config();
        let mut removed = remove_excluded(&config.output_dir, config.format, &config.exclude)?;

        let report = etcher.run_blocking(&resolution)?;

        if resolution.discovered && config.prune_stale {
            removed.extend(prune_stale_documents(config, &resolution)?);
        }

        let navigation = update_navigation(config, &resolution, &report);
        if let NavigationStatus::MissingFile(ref path) = navigation {
            tracing::warn!(path = %path.display(), "navigation file not found, skipping update");
        }

        Ok(BuildOutput {
            output_dir: config.output_dir.clone(),
            report,
            removed,
            navigation,
            diagnostics: etcher.diagnostics().clone(),
        })
    }
}

fn prune_stale_documents(config: &EtchConfig, resolution: &Resolution) -> EtchResult<Vec<PathBuf>> {
    let Some(ref root) = config.root_module else {
        return Ok(Vec::new());
    };
    let ids = resolution.ids();
    let keep: HashSet<String> = ids.iter().map(|id| document_stem(id, &ids)).collect();
    prune_stale(&config.output_dir, config.format, &ModuleId::new(root.clone()), &keep)
}

/// Pages for the navigation: this run's successes, plus (for an explicit
/// module list) documents left by earlier runs
fn navigation_pages(
    config: &EtchConfig,
    resolution: &Resolution,
    report: &RunReport,
) -> EtchResult<Vec<NavPage>> {
    let mut pages: BTreeMap<ModuleId, NavPage> = BTreeMap::new();

    if let (false, Some(root)) = (resolution.discovered, config.root_module.as_deref()) {
        for page in documented_pages(&config.output_dir, config.format, &ModuleId::new(root))? {
            if !config.exclude.iter().any(|e| page.module.matches_prefix(e)) {
                pages.insert(page.module.clone(), page);
            }
        }
    }
    for (id, success) in report.succeeded() {
        pages.insert(
            id.clone(),
            NavPage {
                module: id.clone(),
                stem: success.stem.clone(),
                empty: success.empty,
            },
        );
    }

    Ok(pages.into_values().collect())
}

fn update_navigation(
    config: &EtchConfig,
    resolution: &Resolution,
    report: &RunReport,
) -> NavigationStatus {
    if !config.update_navigation {
        return NavigationStatus::Disabled;
    }
    if report.succeeded().next().is_none() {
        return NavigationStatus::NothingGenerated;
    }
    if !config.navigation_file.is_file() {
        return NavigationStatus::MissingFile(config.navigation_file.clone());
    }

    let prefix = config
        .nav_prefix
        .clone()
        .unwrap_or_else(|| nav_prefix(&config.output_dir, &config.navigation_file));

    let result = navigation_pages(config, resolution, report).and_then(|pages| {
        let subtree = build_navigation(&pages, &prefix, config.collapse_empty_parents);
        update_navigation_file(&config.navigation_file, &config.navigation_target, &subtree)
    });

    match result {
        Ok(update) => NavigationStatus::Updated(update),
        Err(err) => {
            tracing::warn!("{}", err);
            NavigationStatus::Failed(err)
        }
    }
}
