//! Output files
//!
//! Document naming, write-if-changed persistence and removal of stale
//! documents. Every module maps to a distinct file name, so concurrent
//! units never write the same path.

use crate::diagnostics::{EtchError, EtchResult};
use crate::docgen::markdown::OutputFormat;
use crate::resolver::ModuleId;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of package landing pages
pub const LANDING_SUFFIX: &str = "-__init__";

/// File stem of a module's document: dots become dashes, and a module with
/// documented descendants gets the `-__init__` landing suffix
pub fn document_stem(id: &ModuleId, all: &[ModuleId]) -> String {
    if is_landing(id, all) {
        format!("{}{}", id.sanitized(), LANDING_SUFFIX)
    } else {
        id.sanitized()
    }
}

/// Whether any other module in `all` lives below `id`
pub fn is_landing(id: &ModuleId, all: &[ModuleId]) -> bool {
    all.iter().any(|other| other.is_descendant_of(id))
}

/// Outcome of a single write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
}

/// Per-run write counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl WriteStats {
    /// Count one write
    pub fn record(&mut self, status: WriteStatus) {
        match status {
            WriteStatus::Created => self.created += 1,
            WriteStatus::Updated => self.updated += 1,
            WriteStatus::Unchanged => self.unchanged += 1,
        }
    }

    /// Documents whose bytes changed on disk
    pub fn changed(&self) -> usize {
        self.created + self.updated
    }
}

/// Write `contents` to `path` unless the file already holds exactly these bytes
pub fn write_if_changed(path: &Path, contents: &str) -> EtchResult<WriteStatus> {
    let status = match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => return Ok(WriteStatus::Unchanged),
        Ok(_) => WriteStatus::Updated,
        Err(_) => WriteStatus::Created,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EtchError::write(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| EtchError::write(path, e))?;
    Ok(status)
}

/// Documents of `format` directly inside `dir`, as (stem, path) pairs
pub(crate) fn documents_in(dir: &Path, format: OutputFormat) -> EtchResult<Vec<(String, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut docs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(format.extension()) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            docs.push((stem.to_string(), path.clone()));
        }
    }
    docs.sort();
    Ok(docs)
}

/// Module a document stem was written for
pub fn module_of_stem(stem: &str) -> ModuleId {
    ModuleId::new(stem.strip_suffix(LANDING_SUFFIX).unwrap_or(stem).replace('-', "."))
}

/// Delete documents of modules under `root` that are not in `keep` (stems).
///
/// Returns the removed paths.
pub fn prune_stale(
    dir: &Path,
    format: OutputFormat,
    root: &ModuleId,
    keep: &HashSet<String>,
) -> EtchResult<Vec<PathBuf>> {
    let root_stem = root.sanitized();
    let mut removed = Vec::new();

    for (stem, path) in documents_in(dir, format)? {
        let module_part = stem.strip_suffix(LANDING_SUFFIX).unwrap_or(&stem);
        let under_root = module_part == root_stem
            || module_part.starts_with(&format!("{}-", root_stem));
        if under_root && !keep.contains(&stem) {
            fs::remove_file(&path).map_err(|e| EtchError::write(&path, e))?;
            tracing::info!(path = %path.display(), "removed stale document");
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Delete documents whose module matches an exclusion entry (plain and
/// landing variants), whether or not the module still exists
pub fn remove_excluded(
    dir: &Path,
    format: OutputFormat,
    exclude: &[String],
) -> EtchResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if exclude.is_empty() {
        return Ok(removed);
    }

    for (stem, path) in documents_in(dir, format)? {
        let module = module_of_stem(&stem);
        if exclude.iter().any(|e| module.matches_prefix(e)) {
            fs::remove_file(&path).map_err(|e| EtchError::write(&path, e))?;
            tracing::info!(module = %module, path = %path.display(), "removed excluded document");
            removed.push(path);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids(list: &[&str]) -> Vec<ModuleId> {
        list.iter().map(|s| ModuleId::new(*s)).collect()
    }

    #[test]
    fn test_document_stem() {
        let all = ids(&["pkg", "pkg.core", "pkg.util", "pkg.util.helpers"]);
        assert_eq!(document_stem(&all[0], &all), "pkg-__init__");
        assert_eq!(document_stem(&all[1], &all), "pkg-core");
        assert_eq!(document_stem(&all[2], &all), "pkg-util-__init__");
        assert_eq!(document_stem(&all[3], &all), "pkg-util-helpers");
    }

    #[test]
    fn test_write_if_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/doc.mdx");

        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteStatus::Created);
        assert_eq!(write_if_changed(&path, "a").unwrap(), WriteStatus::Unchanged);
        assert_eq!(write_if_changed(&path, "b").unwrap(), WriteStatus::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");

        let mut stats = WriteStats::default();
        stats.record(WriteStatus::Created);
        stats.record(WriteStatus::Unchanged);
        assert_eq!(stats.changed(), 1);
    }

    #[test]
    fn test_prune_stale_only_touches_root_documents() {
        let dir = TempDir::new().unwrap();
        for name in [
            "pkg-__init__.mdx",
            "pkg-core.mdx",
            "pkg-old.mdx",
            "pkg-gone-__init__.mdx",
            "pkgextra.mdx",
            "other-mod.mdx",
            "pkg-old.md",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let keep: HashSet<String> = ["pkg-__init__", "pkg-core"].iter().map(|s| s.to_string()).collect();
        let removed = prune_stale(dir.path(), OutputFormat::Mdx, &ModuleId::new("pkg"), &keep).unwrap();
        let names: Vec<_> = removed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["pkg-gone-__init__.mdx", "pkg-old.mdx"]);
        assert!(dir.path().join("pkgextra.mdx").exists());
        assert!(dir.path().join("other-mod.mdx").exists());
        assert!(dir.path().join("pkg-old.md").exists());
    }

    #[test]
    fn test_remove_excluded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pkg-cli-__init__.mdx"), "x").unwrap();
        fs::write(dir.path().join("pkg-core.mdx"), "x").unwrap();
        fs::write(dir.path().join("pkg-cli-old.mdx"), "x").unwrap();

        let removed = remove_excluded(dir.path(), OutputFormat::Mdx, &["pkg.cli".to_string()]).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(dir.path().join("pkg-core.mdx").exists());
    }
}
