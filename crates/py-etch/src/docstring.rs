//! Docstring parsing and representation
//!
//! This module parses Google-style docstrings into ordered sections
//! (prose, parameters, returns, yields, raises, examples). Section headers
//! are recognised by convention: a known title at the left margin followed
//! by a colon and an indented body. Text that does not fit a section is
//! kept verbatim as prose.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// `Title:` at the left margin
    static ref HEADER_REGEX: Regex = Regex::new(r"^([A-Za-z][A-Za-z ]*?)\s*:\s*$").unwrap();

    /// `name (type): description`, `*args: description`
    static ref PARAM_REGEX: Regex =
        Regex::new(r"^(\*{0,2}[A-Za-z_][\w.]*)\s*(?:\(([^)]*)\))?\s*:\s*(.*)$").unwrap();

    /// `ExceptionType: description`
    static ref RAISE_REGEX: Regex = Regex::new(r"^([A-Za-z_][\w.]*)\s*:\s*(.*)$").unwrap();
}

/// Kind of structured section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Parameters,
    Returns,
    Yields,
    Raises,
    Examples,
}

impl SectionKind {
    fn from_title(title: &str) -> Option<Self> {
        match title.trim().to_lowercase().as_str() {
            "args" | "arguments" | "parameters" | "params" | "keyword args"
            | "keyword arguments" | "other parameters" | "other params" => {
                Some(SectionKind::Parameters)
            }
            "returns" | "return" => Some(SectionKind::Returns),
            "yields" | "yield" => Some(SectionKind::Yields),
            "raises" | "raise" | "exceptions" | "except" => Some(SectionKind::Raises),
            "examples" | "example" => Some(SectionKind::Examples),
            _ => None,
        }
    }
}

/// A documented parameter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocParam {
    /// Parameter name, including `*`/`**` prefixes
    pub name: String,

    /// Type given in parentheses
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub annotation: Option<String>,

    /// Description text
    pub description: String,
}

/// A documented return or yield value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocReturn {
    /// Leading `Type:` prefix
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub annotation: Option<String>,

    /// Description text
    pub description: String,
}

/// A documented exception
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRaise {
    /// Exception type name
    pub exception: String,

    /// Description text
    pub description: String,
}

/// One docstring section, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum DocSection {
    /// Unstructured prose
    Text(String),
    Parameters(Vec<DocParam>),
    Returns(Vec<DocReturn>),
    Yields(Vec<DocReturn>),
    Raises(Vec<DocRaise>),
    /// Example code, dedented
    Examples(String),
}

/// Parsed docstring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docstring {
    /// Docstring text as written (without quotes)
    pub raw: String,

    /// Sections in source order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sections: Vec<DocSection>,
}

impl Docstring {
    /// Parse a raw docstring
    pub fn parse(raw: &str) -> Self {
        let cleaned = clean_docstring(raw);
        Self {
            raw: raw.to_string(),
            sections: parse_sections(&cleaned),
        }
    }

    /// Check if this doc is empty
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// First paragraph of the leading prose
    pub fn summary(&self) -> Option<&str> {
        match self.sections.first() {
            Some(DocSection::Text(text)) => text.split("\n\n").next().map(str::trim),
            _ => None,
        }
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Normalize docstring indentation: the first line is stripped, the common
/// indentation of the remaining lines is removed, and blank lines at both
/// ends are dropped.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();

    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !is_blank(l))
        .map(|l| leading_spaces(l))
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim().to_string()
            } else if is_blank(line) {
                String::new()
            } else {
                line[indent.min(leading_spaces(line))..].trim_end().to_string()
            }
        })
        .collect();

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    let start = out.iter().position(|l| !l.is_empty()).unwrap_or(out.len());
    out[start..].join("\n")
}

fn dedent(lines: &[&str]) -> Vec<String> {
    let indent = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| leading_spaces(l))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if is_blank(l) {
                String::new()
            } else {
                l[indent.min(leading_spaces(l))..].to_string()
            }
        })
        .collect()
}

fn section_header(line: &str) -> Option<SectionKind> {
    if line.starts_with(' ') {
        return None;
    }
    if line.trim_end() == "Raises" {
        return Some(SectionKind::Raises);
    }
    HEADER_REGEX
        .captures(line)
        .and_then(|caps| SectionKind::from_title(&caps[1]))
}

fn parse_sections(cleaned: &str) -> Vec<DocSection> {
    let lines: Vec<&str> = cleaned.lines().collect();
    let mut sections = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if let Some(kind) = section_header(line) {
            let mut end = i + 1;
            while end < lines.len() && (is_blank(lines[end]) || lines[end].starts_with(' ')) {
                end += 1;
            }
            let mut body = &lines[i + 1..end];
            while body.last().is_some_and(|l| is_blank(l)) {
                body = &body[..body.len() - 1];
            }
            let trailing_blanks = end - (i + 1) - body.len();

            if let Some(section) = parse_section(kind, body) {
                flush_prose(&mut prose, &mut sections);
                sections.push(section);
                i = end - trailing_blanks;
                continue;
            }
        }
        prose.push(line);
        i += 1;
    }

    flush_prose(&mut prose, &mut sections);
    sections
}

fn flush_prose(prose: &mut Vec<&str>, sections: &mut Vec<DocSection>) {
    let text = prose.join("\n");
    let text = text.trim_matches('\n');
    if !text.trim().is_empty() {
        sections.push(DocSection::Text(text.to_string()));
    }
    prose.clear();
}

/// Split an item list: a line at the left margin starts an item, indented
/// lines continue it.
fn split_items(lines: &[String]) -> Vec<(String, Vec<String>)> {
    let mut items: Vec<(String, Vec<String>)> = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        if line.starts_with(' ') {
            if let Some(last) = items.last_mut() {
                last.1.push(line.trim().to_string());
            }
        } else {
            items.push((line.trim().to_string(), Vec::new()));
        }
    }
    items
}

fn join_description(first: &str, rest: &[String]) -> String {
    std::iter::once(first.trim())
        .chain(rest.iter().map(|s| s.as_str()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Type: description` where `Type` has no whitespace outside brackets
fn split_type_prefix(line: &str) -> Option<(String, String)> {
    let mut depth = 0i32;
    for (idx, ch) in line.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            ':' if depth == 0 => {
                let ty = &line[..idx];
                let desc = &line[idx + 1..];
                if ty.is_empty() || !(desc.is_empty() || desc.starts_with(' ')) {
                    return None;
                }
                return Some((ty.to_string(), desc.trim().to_string()));
            }
            c if c.is_whitespace() && depth == 0 => return None,
            _ => {}
        }
    }
    None
}

fn parse_section(kind: SectionKind, body: &[&str]) -> Option<DocSection> {
    if body.iter().all(|l| is_blank(l)) {
        return None;
    }
    let lines = dedent(body);

    match kind {
        SectionKind::Examples => Some(DocSection::Examples(lines.join("\n"))),
        SectionKind::Parameters => {
            let mut params = Vec::new();
            for (head, rest) in split_items(&lines) {
                let caps = PARAM_REGEX.captures(&head)?;
                params.push(DocParam {
                    name: caps[1].to_string(),
                    annotation: caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|s| !s.is_empty()),
                    description: join_description(&caps[3], &rest),
                });
            }
            Some(DocSection::Parameters(params))
        }
        SectionKind::Raises => {
            let mut raises = Vec::new();
            for (head, rest) in split_items(&lines) {
                let caps = RAISE_REGEX.captures(&head)?;
                raises.push(DocRaise {
                    exception: caps[1].to_string(),
                    description: join_description(&caps[2], &rest),
                });
            }
            Some(DocSection::Raises(raises))
        }
        SectionKind::Returns | SectionKind::Yields => {
            let items = split_items(&lines);
            let typed: Vec<_> = items
                .iter()
                .map(|(head, rest)| {
                    split_type_prefix(head).map(|(ty, desc)| DocReturn {
                        annotation: Some(ty),
                        description: join_description(&desc, rest),
                    })
                })
                .collect();

            let values = if !typed.is_empty() && typed.iter().all(Option::is_some) {
                typed.into_iter().flatten().collect()
            } else {
                let text = lines
                    .iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                vec![DocReturn {
                    annotation: None,
                    description: text,
                }]
            };

            Some(if kind == SectionKind::Returns {
                DocSection::Returns(values)
            } else {
                DocSection::Yields(values)
            })
        }
    }
}
