//! Markdown rendering for documentation
//!
//! This module renders a `SymbolTable` into one MDX or plain Markdown
//! document. Output is a pure function of the table and the
//! `RenderOptions`, so unchanged input always yields byte-identical text.

use crate::diagnostics::{EtchError, EtchResult};
use crate::docgen::source_links::SourceLinker;
use crate::docstring::{DocReturn, DocSection, Docstring};
use crate::node::{Symbol, SymbolTable};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Notice rendered for modules without a docstring or public symbols
pub const EMPTY_MODULE_NOTICE: &str =
    "*This module is empty or contains only private/internal implementations.*";

lazy_static! {
    /// Subscripted typing names that MDX would read as link syntax
    static ref GENERIC_REGEX: Regex = Regex::new(
        r"\b(dict|list|tuple|set|frozenset|type|Optional|Union|Callable|TypeVar|Generic|Literal|Any|Sequence|Mapping|Iterable|Iterator)\["
    )
    .unwrap();

    /// `<...>` spans that MDX would parse as JSX tags
    static ref TAG_REGEX: Regex = Regex::new(r"<([^<>\n]+)>").unwrap();
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// MDX (escaped, JSX source-link icon)
    #[default]
    Mdx,
    /// Plain Markdown
    Md,
}

impl OutputFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mdx => "mdx",
            OutputFormat::Md => "md",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = EtchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mdx" => Ok(OutputFormat::Mdx),
            "md" | "markdown" => Ok(OutputFormat::Md),
            other => Err(EtchError::config(format!(
                "unknown output format '{}' (expected 'mdx' or 'md')",
                other
            ))),
        }
    }
}

/// Rendering configuration, passed explicitly to every render call
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Output format
    pub format: OutputFormat,
    /// Replaces the GitHub icon (MDX) or `source` (Markdown) link label
    pub link_text: Option<String>,
    /// Source link metadata; no links are rendered without it
    pub source_linker: Option<SourceLinker>,
}

/// Markdown renderer for documentation
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a renderer
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// The render options
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn is_mdx(&self) -> bool {
        self.options.format == OutputFormat::Mdx
    }

    /// Render one module document.
    ///
    /// `landing` marks a package page whose descendants are documented
    /// too; its title is `__init__`.
    pub fn render(&self, table: &SymbolTable, landing: bool) -> EtchResult<String> {
        let module_symbol = table.module_symbol().ok_or_else(|| {
            EtchError::render(table.module.as_str(), "symbol table has no module entry")
        })?;

        let title = if landing {
            "__init__"
        } else {
            table.module.last_segment()
        };

        let mut blocks = vec![
            format!("---\ntitle: {}\nsidebarTitle: {}\n---", title, title),
            format!("# {}", code_span(table.module.as_str())),
        ];

        if table.is_empty_module() {
            blocks.push(EMPTY_MODULE_NOTICE.to_string());
            return Ok(finish(blocks));
        }

        if let Some(doc) = self.render_docstring(&module_symbol.doc) {
            blocks.push(doc);
        }

        let mut labeled: HashSet<&str> = HashSet::new();
        for symbol in table.members() {
            if let Some(ref parent) = symbol.parent {
                if labeled.insert(parent.as_str()) {
                    blocks.push("**Methods:**".to_string());
                }
            }
            self.render_symbol(table, symbol, &mut blocks);
        }

        Ok(finish(blocks))
    }

    fn render_symbol(&self, table: &SymbolTable, symbol: &Symbol, blocks: &mut Vec<String>) {
        let level = (symbol.depth() + 2).min(6);
        let header = format!("{} {}", "#".repeat(level), code_span(&symbol.name));
        let link = self
            .options
            .source_linker
            .as_ref()
            .zip(table.source_path.as_deref())
            .and_then(|(linker, path)| linker.url(path, &symbol.location));
        blocks.push(self.header_with_source(header, link.as_deref()));

        if let Some(signature) = symbol.signature() {
            let mut code: Vec<String> = symbol
                .decorators()
                .iter()
                .map(|d| d.to_python())
                .collect();
            code.push(signature);
            blocks.push(fenced("python", &code.join("\n")));
        }

        if let Some(doc) = self.render_docstring(&symbol.doc) {
            blocks.push(doc);
        }
    }

    /// Append the source link to a heading
    pub fn header_with_source(&self, header: String, link: Option<&str>) -> String {
        let Some(url) = link else {
            return header;
        };

        match self.options.format {
            OutputFormat::Mdx => {
                let href = html_escape::encode_double_quoted_attribute(url);
                let label = match self.options.link_text {
                    Some(ref text) => html_escape::encode_text(text).into_owned(),
                    None => r#"<Icon icon="github" style="width: 14px; height: 14px;" />"#.to_string(),
                };
                format!(
                    r#"{} <sup><a href="{}" target="_blank">{}</a></sup>"#,
                    header, href, label
                )
            }
            OutputFormat::Md => {
                let label = self.options.link_text.as_deref().unwrap_or("source");
                format!("{} [{}]({})", header, label, url)
            }
        }
    }

    /// Render docstring sections, escaped for the output format
    pub fn render_docstring(&self, doc: &Docstring) -> Option<String> {
        if doc.sections.is_empty() {
            return None;
        }

        let parts: Vec<String> = doc
            .sections
            .iter()
            .map(|section| self.render_section(section))
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            return None;
        }

        let text = parts.join("\n\n");
        Some(if self.is_mdx() { escape_mdx(&text) } else { text })
    }

    fn render_section(&self, section: &DocSection) -> String {
        let mut lines = Vec::new();
        match section {
            DocSection::Text(text) => return text.clone(),
            DocSection::Parameters(params) => {
                lines.push("**Args:**".to_string());
                lines.push(String::new());
                for p in params {
                    let ty = p
                        .annotation
                        .as_deref()
                        .map(|a| format!(" ({})", code_span(a)))
                        .unwrap_or_default();
                    lines.push(format!(
                        "- {}{}: {}",
                        code_span(&p.name),
                        ty,
                        self.description(&p.description)
                    ));
                }
            }
            DocSection::Returns(values) => {
                lines.push("**Returns:**".to_string());
                lines.push(String::new());
                lines.extend(values.iter().map(|v| self.value_item(v)));
            }
            DocSection::Yields(values) => {
                lines.push("**Yields:**".to_string());
                lines.push(String::new());
                lines.extend(values.iter().map(|v| self.value_item(v)));
            }
            DocSection::Raises(raises) => {
                lines.push("**Raises:**".to_string());
                lines.push(String::new());
                for r in raises {
                    lines.push(format!(
                        "- {}: {}",
                        code_span(&r.exception),
                        self.description(&r.description)
                    ));
                }
            }
            DocSection::Examples(code) => {
                return format!("**Examples:**\n\n{}", fenced("python", code));
            }
        }
        lines.join("\n")
    }

    fn value_item(&self, value: &DocReturn) -> String {
        match value.annotation {
            Some(ref ty) => format!("- {}: {}", code_span(ty), self.description(&value.description)),
            None => format!("- {}", self.description(&value.description)),
        }
    }

    /// List descriptions: colons are escaped in MDX so they are not read
    /// as definition lists
    fn description(&self, text: &str) -> String {
        if self.is_mdx() {
            map_outside_code(text, |t| t.replace(':', "\\:"))
        } else {
            text.to_string()
        }
    }
}

fn finish(blocks: Vec<String>) -> String {
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Inline code span whose delimiter is longer than any backtick run inside
pub fn code_span(text: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", ticks, text, ticks)
    } else {
        format!("{}{}{}", ticks, text, ticks)
    }
}

/// Fenced code block whose fence is longer than any backtick run inside
pub fn fenced(lang: &str, code: &str) -> String {
    let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
    format!("{}{}\n{}\n{}", fence, lang, code, fence)
}

/// Apply `f` to every stretch of `text` outside inline code and fences.
///
/// A run of N backticks opens a code span closed by the next run of
/// exactly N backticks; an unclosed run is literal text.
pub fn map_outside_code(text: &str, f: impl Fn(&str) -> String) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run = i - run_start;

        let mut j = i;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let start = j;
                while j < bytes.len() && bytes[j] == b'`' {
                    j += 1;
                }
                if j - start == run {
                    close = Some(j);
                    break;
                }
            } else {
                j += 1;
            }
        }

        if let Some(end) = close {
            out.push_str(&f(&text[plain_start..run_start]));
            out.push_str(&text[run_start..end]);
            plain_start = end;
            i = end;
        }
    }

    out.push_str(&f(&text[plain_start..]));
    out
}

/// Escape text for MDX outside code spans and fenced blocks
pub fn escape_mdx(text: &str) -> String {
    map_outside_code(text, |plain| {
        let plain = plain.replace('&', "&amp;");
        let escaped = GENERIC_REGEX.replace_all(&plain, r"$1\[");
        let escaped = TAG_REGEX.replace_all(&escaped, "&lt;$1&gt;");
        escaped
            .replace('<', "&lt;")
            .replace('{', "\\{")
            .replace('}', "\\}")
            .replace("TODO:", "TODO\\:")
    })
}
