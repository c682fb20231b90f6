//! Source links
//!
//! Builds `{repo}/blob/{branch}/{path}#L{start}-L{end}` URLs from metadata
//! supplied up front. Link construction is pure string formatting; the
//! repository URL itself is detected (if at all) by the caller.

use crate::node::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Builds links to symbol definitions in a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLinker {
    /// Repository URL, e.g. `https://github.com/owner/repo`
    pub repo_url: String,
    /// Branch (or tag/commit) name
    pub branch: String,
    /// Repository checkout directory; paths are made relative to it
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub link_root: Option<PathBuf>,
    /// Root package name, used to locate the repository-relative path when
    /// no link root is known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub root_module: Option<String>,
}

impl SourceLinker {
    /// Create a linker for a repository and branch
    pub fn new(repo_url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into().trim_end_matches('/').to_string(),
            branch: branch.into(),
            link_root: None,
            root_module: None,
        }
    }

    /// Make paths relative to this directory
    pub fn with_link_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.link_root = Some(root.into());
        self
    }

    /// Set the root package name
    pub fn with_root_module(mut self, root: impl Into<String>) -> Self {
        self.root_module = Some(root.into());
        self
    }

    /// Repository-relative path of a source file, with `/` separators
    pub fn relative_path(&self, file: &Path) -> Option<String> {
        if let Some(ref root) = self.link_root {
            if let Ok(rel) = file.strip_prefix(root) {
                return Some(to_slash(rel));
            }
        }

        let path = format!("/{}", to_slash(file).trim_start_matches('/'));
        match self.root_module.as_deref() {
            Some(root) => {
                let top = root.split('.').next().unwrap_or(root);
                let src_pattern = format!("/src/{}/", top);
                let flat_pattern = format!("/{}/", top);
                if let Some(idx) = path.find(&src_pattern) {
                    Some(path[idx + 1..].to_string())
                } else {
                    path.find(&flat_pattern).map(|idx| path[idx + 1..].to_string())
                }
            }
            None => {
                let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
                parts
                    .iter()
                    .position(|p| *p == "src" || *p == "lib")
                    .map(|i| parts[i..].join("/"))
            }
        }
    }

    /// Link to the lines of `location` inside `file`
    pub fn url(&self, file: &Path, location: &Location) -> Option<String> {
        if self.repo_url.is_empty() || location.line == 0 {
            return None;
        }
        let rel = self.relative_path(file)?;
        let encoded = rel
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let anchor = if location.is_single_line() {
            format!("#L{}", location.line)
        } else {
            format!("#L{}-L{}", location.line, location.end_line)
        };

        Some(format!(
            "{}/blob/{}/{}{}",
            self.repo_url, self.branch, encoded, anchor
        ))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| c != "/" && c != "\\")
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize a git remote into a browsable GitHub URL.
///
/// Accepts `git@github.com:owner/repo(.git)`, `ssh://git@github.com/owner/repo`
/// and `https://github.com/owner/repo(.git)`; anything else yields `None`.
pub fn normalize_github_remote(remote: &str) -> Option<String> {
    let remote = remote.trim();
    let rest = remote
        .strip_prefix("git@github.com:")
        .or_else(|| remote.strip_prefix("ssh://git@github.com/"))
        .or_else(|| remote.strip_prefix("https://github.com/"))
        .or_else(|| remote.strip_prefix("http://github.com/"))?;

    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let segments: Vec<&str> = rest.split('/').collect();
    if segments.len() != 2 || segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(format!("https://github.com/{}", rest))
}
