//! Navigation generation
//!
//! Builds the generated navigation subtree from the succeeded module set and
//! splices it into a site's navigation document.

pub mod update_document;

pub use update_document::{
    find_targets, is_placeholder, merge_navigation, placeholder, update_navigation_file,
    MergeOutcome, NavUpdateResult, PLACEHOLDER_KEY,
};

use crate::diagnostics::EtchResult;
use crate::docgen::markdown::{OutputFormat, EMPTY_MODULE_NOTICE};
use crate::docgen::output::{documents_in, module_of_stem};
use crate::resolver::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A navigation entry: a page reference or a named group of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavNode {
    Page(String),
    Group { group: String, pages: Vec<NavNode> },
}

impl NavNode {
    /// Name used for ordering: the reference of a page, the name of a group
    pub fn display_name(&self) -> &str {
        match self {
            NavNode::Page(reference) => reference,
            NavNode::Group { group, .. } => group,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, NavNode::Group { .. })
    }
}

/// A successfully rendered module, as seen by the navigation builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPage {
    pub module: ModuleId,
    /// Document file stem
    pub stem: String,
    /// Module rendered the empty notice
    pub empty: bool,
}

/// Pages for the documents of `format` already present in `dir` that belong
/// to the public modules of `root`.
///
/// Other files sharing the directory (a hand-written `index.mdx`, another
/// package's pages) are not ours to list.
pub fn documented_pages(
    dir: &Path,
    format: OutputFormat,
    root: &ModuleId,
) -> EtchResult<Vec<NavPage>> {
    let mut pages = Vec::new();
    for (stem, path) in documents_in(dir, format)? {
        let module = module_of_stem(&stem);
        if !module.matches_prefix(root.as_str()) || module.is_private() {
            continue;
        }
        let text = fs::read_to_string(&path)?;
        pages.push(NavPage {
            module,
            empty: text.contains(EMPTY_MODULE_NOTICE),
            stem,
        });
    }
    Ok(pages)
}

/// Pages first, then groups, each alphabetical
pub fn sort_nodes(nodes: &mut [NavNode]) {
    nodes.sort_by(|a, b| {
        a.is_group()
            .cmp(&b.is_group())
            .then_with(|| a.display_name().cmp(b.display_name()))
    });
}

/// Page reference prefix: the output directory relative to the directory of
/// the navigation document, or empty when it lies elsewhere
pub fn nav_prefix(output_dir: &Path, navigation_file: &Path) -> String {
    let docs_root = navigation_file.parent().unwrap_or_else(|| Path::new(""));
    match output_dir.strip_prefix(docs_root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => String::new(),
    }
}

#[derive(Default)]
struct TreeNode<'a> {
    page: Option<&'a NavPage>,
    children: BTreeMap<String, TreeNode<'a>>,
}

/// Build the navigation subtree for `pages`.
///
/// A top-level module with descendants becomes a group named by its full
/// identifier; nested groups use their last segment. In collapse mode a
/// group whose own page is absent or empty is dissolved into its parent.
pub fn build_navigation(pages: &[NavPage], prefix: &str, collapse: bool) -> Vec<NavNode> {
    let mut root: BTreeMap<String, TreeNode> = BTreeMap::new();

    for page in pages {
        let segments: Vec<&str> = page.module.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };
        let mut level = &mut root;
        for segment in parents {
            level = &mut level.entry(segment.to_string()).or_default().children;
        }
        level.entry(last.to_string()).or_default().page = Some(page);
    }

    let prefix = prefix.trim_end_matches('/');
    let reference = |stem: &str| {
        if prefix.is_empty() {
            stem.to_string()
        } else {
            format!("{}/{}", prefix, stem)
        }
    };

    fn to_nav(
        level: &BTreeMap<String, TreeNode>,
        path: &[&str],
        collapse: bool,
        reference: &dyn Fn(&str) -> String,
    ) -> Vec<NavNode> {
        let mut nodes = Vec::new();

        for (name, node) in level {
            let mut node_path = path.to_vec();
            node_path.push(name);

            if node.children.is_empty() {
                if let Some(page) = node.page {
                    nodes.push(NavNode::Page(reference(&page.stem)));
                }
                continue;
            }

            let own_page = node.page.filter(|p| !(collapse && p.empty));
            let mut children = Vec::new();
            if let Some(page) = own_page {
                children.push(NavNode::Page(reference(&page.stem)));
            }
            children.extend(to_nav(&node.children, &node_path, collapse, reference));
            sort_nodes(&mut children);

            if collapse && own_page.is_none() {
                nodes.extend(children);
            } else if !children.is_empty() {
                let group = if path.is_empty() {
                    node_path.join(".")
                } else {
                    name.clone()
                };
                nodes.push(NavNode::Group {
                    group,
                    pages: children,
                });
            }
        }

        sort_nodes(&mut nodes);
        nodes
    }

    to_nav(&root, &[], collapse, &reference)
}
