//! Module discovery
//!
//! `ModuleResolver` turns a root package (or an explicit module list) and an
//! exclusion list into the sorted set of documentable modules. Discovery
//! walks the package directory; nothing is imported.

use crate::diagnostics::{Diagnostic, DiagnosticsCollector, EtchError, EtchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Dotted module identifier, ordered lexicographically
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Last path segment
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Enclosing package, if any
    pub fn parent(&self) -> Option<ModuleId> {
        self.0
            .rsplit_once('.')
            .map(|(parent, _)| ModuleId::new(parent))
    }

    /// Child module identifier
    pub fn child(&self, name: &str) -> ModuleId {
        if self.0.is_empty() {
            ModuleId::new(name)
        } else {
            ModuleId::new(format!("{}.{}", self.0, name))
        }
    }

    /// Strict descendant of `other`
    pub fn is_descendant_of(&self, other: &ModuleId) -> bool {
        self.0.len() > other.0.len()
            && self.0.starts_with(other.as_str())
            && self.0.as_bytes()[other.0.len()] == b'.'
    }

    /// Equal to `prefix` or nested below it
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        matches_prefix(&self.0, prefix)
    }

    /// Any segment starts with an underscore
    pub fn is_private(&self) -> bool {
        self.segments().any(|s| s.starts_with('_'))
    }

    /// File-name form: dots become dashes
    pub fn sanitized(&self) -> String {
        self.0.replace('.', "-")
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        ModuleId::new(id)
    }
}

/// Dotted-path prefix match: `name == prefix` or `name` is below `prefix`
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    name == prefix
        || (name.len() > prefix.len()
            && name.starts_with(prefix)
            && name.as_bytes()[prefix.len()] == b'.')
}

/// Python identifier check for path segments
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => chars.all(|c| c == '_' || c.is_alphanumeric()),
        _ => false,
    }
}

/// A resolved module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Module identifier
    pub id: ModuleId,
    /// Source file
    pub path: PathBuf,
    /// Source file is a package initializer
    pub is_package: bool,
}

/// Result of module resolution
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Modules to document, sorted by identifier
    pub modules: Vec<ModuleEntry>,
    /// Modules dropped by an exclusion entry
    pub excluded: Vec<ModuleId>,
    /// Non-fatal conditions (skipped entries, unmatched exclusions)
    pub diagnostics: DiagnosticsCollector,
    /// Whether the set came from directory discovery
    pub discovered: bool,
}

impl Resolution {
    /// Identifiers of the resolved modules
    pub fn ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }
}

/// Resolves the set of documentable modules
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: Option<String>,
    source_root: PathBuf,
    modules: Vec<String>,
    exclude: Vec<String>,
}

impl ModuleResolver {
    /// Resolver for `root` below `source_root`
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            root: None,
            source_root: source_root.into(),
            modules: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Set the root package
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Document exactly these modules instead of discovering them
    pub fn modules(mut self, modules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Exclusion entries, prefix-matched
    pub fn exclude(mut self, exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Directories searched for modules: `<source_root>/src` then `<source_root>`
    fn search_bases(&self) -> Vec<PathBuf> {
        vec![self.source_root.join("src"), self.source_root.clone()]
    }

    /// Resolve the module set.
    ///
    /// Fails when the root package (or an explicitly listed module) cannot
    /// be located; no unit runs in that case.
    pub fn resolve(&self) -> EtchResult<Resolution> {
        let mut resolution = if self.modules.is_empty() {
            let root = self
                .root
                .as_deref()
                .ok_or_else(|| EtchError::config("no root module and no module list given"))?;
            self.discover(root)?
        } else {
            self.resolve_explicit()?
        };

        self.apply_exclusions(&mut resolution);
        resolution.modules.sort_by(|a, b| a.id.cmp(&b.id));
        resolution.modules.dedup_by(|a, b| a.id == b.id);

        tracing::info!(
            modules = resolution.modules.len(),
            excluded = resolution.excluded.len(),
            "resolved modules"
        );
        Ok(resolution)
    }

    /// Walk the root package directory.
    pub fn discover(&self, root: &str) -> EtchResult<Resolution> {
        let rel: PathBuf = root.split('.').collect();
        let mut resolution = Resolution {
            discovered: true,
            ..Default::default()
        };

        for base in self.search_bases() {
            let dir = base.join(&rel);
            if dir.is_dir() {
                tracing::debug!(path = %dir.display(), "discovering package");
                self.walk_package(&ModuleId::new(root), &dir, &mut resolution);
                return Ok(resolution);
            }

            let file = dir.with_extension("py");
            if file.is_file() {
                resolution.modules.push(ModuleEntry {
                    id: ModuleId::new(root),
                    path: file,
                    is_package: false,
                });
                return Ok(resolution);
            }
        }

        Err(EtchError::resolution(
            root,
            format!(
                "no package directory or module file found under {}",
                self.source_root.display()
            ),
        ))
    }

    fn walk_package(&self, root: &ModuleId, dir: &Path, resolution: &mut Resolution) {
        let mut walker = WalkDir::new(dir).sort_by_file_name().into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let mut diag = Diagnostic::warning(format!("skipping unreadable entry: {}", err))
                        .with_code("unreadable-entry");
                    if let Some(path) = err.path() {
                        diag = diag.in_file(path);
                    }
                    resolution.diagnostics.add(diag);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let Some(parent) = entry
                .path()
                .parent()
                .and_then(|p| p.strip_prefix(dir).ok())
                .map(|p| module_for(root, p))
            else {
                continue;
            };

            if entry.file_type().is_dir() {
                if name == "__pycache__" || name.starts_with('.') || name.starts_with('_') {
                    walker.skip_current_dir();
                } else if !is_identifier(&name) {
                    resolution.diagnostics.add(
                        Diagnostic::warning(format!("skipping directory '{}': not a valid module name", name))
                            .in_file(entry.path())
                            .with_code("invalid-module-name"),
                    );
                    walker.skip_current_dir();
                }
                continue;
            }

            let Some(stem) = name.strip_suffix(".py") else {
                continue;
            };

            if stem == "__init__" {
                resolution.modules.push(ModuleEntry {
                    id: parent,
                    path: entry.path().to_path_buf(),
                    is_package: true,
                });
            } else if stem.starts_with('_') {
                tracing::trace!(path = %entry.path().display(), "skipping private module");
            } else if !is_identifier(stem) {
                resolution.diagnostics.add(
                    Diagnostic::warning(format!("skipping file '{}': not a valid module name", name))
                        .in_file(entry.path())
                        .with_code("invalid-module-name"),
                );
            } else {
                resolution.modules.push(ModuleEntry {
                    id: parent.child(stem),
                    path: entry.path().to_path_buf(),
                    is_package: false,
                });
            }
        }
    }

    fn resolve_explicit(&self) -> EtchResult<Resolution> {
        let mut resolution = Resolution::default();
        for id in &self.modules {
            let entry = self
                .locate_module(id)
                .ok_or_else(|| EtchError::resolution(id, "module source not found"))?;
            resolution.modules.push(entry);
        }
        Ok(resolution)
    }

    /// Find the source file of one module
    pub fn locate_module(&self, id: &str) -> Option<ModuleEntry> {
        if !id.split('.').all(is_identifier) {
            return None;
        }
        let rel: PathBuf = id.split('.').collect();
        self.search_bases().into_iter().find_map(|base| {
            let init = base.join(&rel).join("__init__.py");
            if init.is_file() {
                return Some(ModuleEntry {
                    id: ModuleId::new(id),
                    path: init,
                    is_package: true,
                });
            }
            let file = base.join(&rel).with_extension("py");
            file.is_file().then(|| ModuleEntry {
                id: ModuleId::new(id),
                path: file,
                is_package: false,
            })
        })
    }

    fn apply_exclusions(&self, resolution: &mut Resolution) {
        if self.exclude.is_empty() {
            return;
        }

        let mut matched = BTreeSet::new();
        let mut excluded = Vec::new();
        resolution.modules.retain(|entry| {
            let hits: Vec<&String> = self
                .exclude
                .iter()
                .filter(|e| entry.id.matches_prefix(e))
                .collect();
            if hits.is_empty() {
                return true;
            }
            matched.extend(hits.into_iter().cloned());
            excluded.push(entry.id.clone());
            false
        });

        for pattern in &self.exclude {
            if !matched.contains(pattern) {
                resolution.diagnostics.add(
                    Diagnostic::warning(format!("exclusion '{}' matched no module", pattern))
                        .with_code("unmatched-exclusion"),
                );
            }
        }

        excluded.sort();
        resolution.excluded = excluded;
    }
}

fn module_for(root: &ModuleId, rel_dir: &Path) -> ModuleId {
    rel_dir
        .components()
        .fold(root.clone(), |id, c| id.child(&c.as_os_str().to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::write_package;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn ids(resolution: &Resolution) -> Vec<String> {
        resolution.modules.iter().map(|m| m.id.to_string()).collect()
    }

    #[test]
    fn test_module_id_helpers() {
        let id = ModuleId::new("pkg.util.helpers");
        assert_eq!(id.last_segment(), "helpers");
        assert_eq!(id.parent(), Some(ModuleId::new("pkg.util")));
        assert!(id.is_descendant_of(&ModuleId::new("pkg")));
        assert!(!ModuleId::new("pkg2.x").is_descendant_of(&ModuleId::new("pkg")));
        assert!(id.matches_prefix("pkg.util"));
        assert!(!id.matches_prefix("pkg.ut"));
        assert_eq!(id.sanitized(), "pkg-util-helpers");
    }

    #[test]
    fn test_discover_drops_private_modules() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            &[
                ("pkg/__init__.py", ""),
                ("pkg/core.py", ""),
                ("pkg/util/_internal.py", ""),
                ("pkg/util/helpers.py", ""),
                ("pkg/_vendor/thing.py", ""),
                ("pkg/__pycache__/core.cpython-311.pyc", ""),
                ("pkg/notes.txt", ""),
            ],
        );

        let resolution = ModuleResolver::new(dir.path()).root("pkg").resolve().unwrap();
        assert_eq!(ids(&resolution), vec!["pkg", "pkg.core", "pkg.util.helpers"]);
        assert!(resolution.modules[0].is_package);
        assert!(resolution.discovered);
    }

    #[test]
    fn test_discover_prefers_src_layout() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            &[("src/pkg/__init__.py", ""), ("src/pkg/api.py", "")],
        );

        let resolution = ModuleResolver::new(dir.path()).root("pkg").resolve().unwrap();
        assert_eq!(ids(&resolution), vec!["pkg", "pkg.api"]);
        assert!(resolution.modules[1].path.ends_with("src/pkg/api.py"));
    }

    #[test]
    fn test_invalid_entries_are_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            &[
                ("pkg/__init__.py", ""),
                ("pkg/bad-name.py", ""),
                ("pkg/also-bad/mod.py", ""),
                ("pkg/good.py", ""),
            ],
        );

        let resolution = ModuleResolver::new(dir.path()).root("pkg").resolve().unwrap();
        assert_eq!(ids(&resolution), vec!["pkg", "pkg.good"]);
        assert_eq!(resolution.diagnostics.with_code("invalid-module-name").count(), 2);
    }

    #[test]
    fn test_exclusions_match_descendants() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            &[
                ("pkg/__init__.py", ""),
                ("pkg/core.py", ""),
                ("pkg/cli/__init__.py", ""),
                ("pkg/cli/main.py", ""),
                ("pkg/client.py", ""),
            ],
        );

        let resolution = ModuleResolver::new(dir.path())
            .root("pkg")
            .exclude(["pkg.cli", "pkg.nothing"])
            .resolve()
            .unwrap();

        assert_eq!(ids(&resolution), vec!["pkg", "pkg.client", "pkg.core"]);
        assert_eq!(
            resolution.excluded,
            vec![ModuleId::new("pkg.cli"), ModuleId::new("pkg.cli.main")]
        );
        assert_eq!(resolution.diagnostics.with_code("unmatched-exclusion").count(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = ModuleResolver::new(dir.path()).root("nowhere").resolve().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, EtchError::Resolution { .. }));
    }

    #[test]
    fn test_explicit_module_list() {
        let dir = TempDir::new().unwrap();
        write_package(
            dir.path(),
            &[("pkg/__init__.py", ""), ("pkg/core.py", ""), ("pkg/extra.py", "")],
        );

        let resolution = ModuleResolver::new(dir.path())
            .modules(["pkg.core", "pkg", "pkg.core"])
            .resolve()
            .unwrap();
        assert_eq!(ids(&resolution), vec!["pkg", "pkg.core"]);
        assert!(!resolution.discovered);

        let err = ModuleResolver::new(dir.path())
            .modules(["pkg.missing"])
            .resolve()
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
