//! Command-line interface definition for py-etch.
//!
//! Flags override values loaded from `py-etch.toml`; anything left unset
//! keeps the file's value or the built-in default.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use py_etch::{normalize_github_remote, EtchConfig, OutputFormat};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "py-etch.toml";

/// Output format flag
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// MDX with escaping and icon source links
    Mdx,
    /// Plain Markdown
    Md,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mdx => OutputFormat::Mdx,
            FormatArg::Md => OutputFormat::Md,
        }
    }
}

/// py-etch - API reference generator for Python packages
#[derive(Parser, Debug)]
#[command(
    name = "py-etch",
    version,
    about = "Generate MDX/Markdown API reference pages for a Python package",
    long_about = "py-etch parses a Python package without importing it, writes one page per\n\
                  module and merges a generated navigation tree into docs.json."
)]
pub struct Cli {
    /// Modules to document (e.g. mypkg.core); omit with --all
    #[arg(value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Document every module under the root module
    #[arg(long, conflicts_with = "modules")]
    pub all: bool,

    /// Root package to discover modules under
    #[arg(long, value_name = "NAME")]
    pub root_module: Option<String>,

    /// Project directory holding the package
    #[arg(long, value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Output directory for generated pages
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Update the navigation document
    #[arg(long, overrides_with = "no_update_nav")]
    pub update_nav: bool,

    /// Leave the navigation document alone
    #[arg(long, overrides_with = "update_nav")]
    pub no_update_nav: bool,

    /// Navigation document to update
    #[arg(long, value_name = "FILE")]
    pub navigation_file: Option<PathBuf>,

    /// Anchor or group owning the generated navigation
    #[arg(long, alias = "navigation-key", value_name = "NAME")]
    pub anchor_name: Option<String>,

    /// Module prefix to exclude (repeatable)
    #[arg(long, value_name = "MODULE", action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Repository URL for source links (detected from git when omitted)
    #[arg(long, value_name = "URL")]
    pub repo_url: Option<String>,

    /// Branch for source links
    #[arg(long)]
    pub branch: Option<String>,

    /// Promote children of empty parent modules in the navigation
    #[arg(long)]
    pub skip_empty_parents: bool,

    /// Document underscore-prefixed symbols
    #[arg(long)]
    pub include_internal: bool,

    /// Worker pool size
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Configuration file (defaults to ./py-etch.toml when present)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Load the configuration file (if any) and apply flags on top
    pub fn load_config(&self) -> Result<EtchConfig> {
        let base = match self.config {
            Some(ref path) => EtchConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                EtchConfig::from_toml_file(DEFAULT_CONFIG_FILE)
                    .with_context(|| format!("loading {}", DEFAULT_CONFIG_FILE))?
            }
            None => EtchConfig::default(),
        };
        self.apply(base)
    }

    /// Apply flags to `config`
    pub fn apply(&self, mut config: EtchConfig) -> Result<EtchConfig> {
        if let Some(ref root) = self.root_module {
            config.root_module = Some(root.clone());
        }
        if self.all {
            config.modules.clear();
        } else if !self.modules.is_empty() {
            config.modules = self.modules.clone();
        }
        if config.root_module.is_none() {
            config.root_module = config
                .modules
                .first()
                .and_then(|m| m.split('.').next())
                .map(str::to_string);
        }
        if self.all && config.root_module.is_none() {
            bail!("--all requires --root-module");
        }
        if config.root_module.is_none() && config.modules.is_empty() {
            bail!("nothing to document: pass module names or --all with --root-module");
        }

        if let Some(ref dir) = self.source_root {
            config.source_root = dir.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        if self.update_nav {
            config.update_navigation = true;
        }
        if self.no_update_nav {
            config.update_navigation = false;
        }
        if let Some(ref file) = self.navigation_file {
            config.navigation_file = file.clone();
        }
        if let Some(ref name) = self.anchor_name {
            config.navigation_target = name.clone();
        }
        config.exclude.extend(self.exclude.iter().cloned());
        if let Some(ref url) = self.repo_url {
            config.repo_url = Some(url.clone());
        }
        if let Some(ref branch) = self.branch {
            config.branch = branch.clone();
        }
        if self.skip_empty_parents {
            config.collapse_empty_parents = true;
        }
        if self.include_internal {
            config.include_private = true;
        }
        if let Some(workers) = self.workers {
            config.workers = usize::from(workers);
        }

        Ok(config)
    }
}

/// `origin` remote of the git checkout at `dir`, as a GitHub URL
pub fn detect_repo_url(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    normalize_github_remote(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("py-etch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_modules_imply_root() {
        let config = parse(&["pkg.core", "pkg.util"]).apply(EtchConfig::default()).unwrap();
        assert_eq!(config.modules, vec!["pkg.core", "pkg.util"]);
        assert_eq!(config.root_module.as_deref(), Some("pkg"));
    }

    #[test]
    fn test_all_requires_root() {
        assert!(parse(&["--all"]).apply(EtchConfig::default()).is_err());
        let config = parse(&["--all", "--root-module", "pkg"])
            .apply(EtchConfig::default())
            .unwrap();
        assert!(config.modules.is_empty());
        assert_eq!(config.root_module.as_deref(), Some("pkg"));
        assert!(Cli::try_parse_from(["py-etch", "--all", "pkg.core"]).is_err());
    }

    #[test]
    fn test_flags_override_file_values() {
        let file = EtchConfig {
            exclude: vec!["pkg.a".into()],
            workers: 2,
            branch: "dev".into(),
            ..EtchConfig::new("pkg")
        };
        let config = parse(&[
            "--all",
            "--exclude",
            "pkg.b",
            "--exclude",
            "pkg.c",
            "--no-update-nav",
            "--format",
            "md",
            "--navigation-key",
            "API",
            "-j",
            "4",
            "--skip-empty-parents",
        ])
        .apply(file)
        .unwrap();

        assert_eq!(config.exclude, vec!["pkg.a", "pkg.b", "pkg.c"]);
        assert!(!config.update_navigation);
        assert_eq!(config.format, OutputFormat::Md);
        assert_eq!(config.navigation_target, "API");
        assert_eq!(config.workers, 4);
        assert_eq!(config.branch, "dev");
        assert!(config.collapse_empty_parents);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Cli::try_parse_from(["py-etch", "--all", "--workers", "0"]).is_err());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("etch.toml");
        std::fs::write(&path, "root_module = \"pkg\"\noutput_dir = \"site/api\"\n").unwrap();

        let cli = parse(&["--all", "--config", path.to_str().unwrap()]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("site/api"));
        assert_eq!(config.root_module.as_deref(), Some("pkg"));
    }
}
