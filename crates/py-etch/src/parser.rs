//! Python source extraction for py-etch
//!
//! This module parses Python modules with rustpython-parser and turns the
//! syntax tree into an ordered `SymbolTable`. Code is never imported or
//! executed:
//! - annotations and defaults are sliced from the source text as written
//! - decorators are recorded by name, never evaluated
//! - generator and async markers are signature metadata only
//!
//! Only definitions are documented. Imported names are never copied into
//! the importing module's table, so each symbol lives in exactly one module.

use crate::decorators::DecoratorDef;
use crate::diagnostics::{EtchError, EtchResult};
use crate::docstring::Docstring;
use crate::node::{ClassDef, FunctionDef, Location, PropertyDef, Symbol, SymbolDef, SymbolTable};
use crate::params::{ParamDef, ParamKind};
use crate::resolver::{matches_prefix, ModuleEntry, ModuleId};
use crate::visibility::Visibility;
use rustpython_parser::ast::{self, Ranged};
use rustpython_parser::text_size::TextRange;
use rustpython_parser::Parse;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Source text with a line index for location lookups
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The file path
    pub path: PathBuf,
    /// The source text
    pub text: String,
    /// Byte offset of every line start
    line_starts: Vec<usize>,
}

impl SourceInfo {
    /// Create source info from a file path and content
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            text,
            line_starts,
        }
    }

    /// 1-indexed line containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset).max(1)
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        if self.text.ends_with('\n') {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }

    /// Text of a 1-indexed line, without the line break
    pub fn line_text(&self, line: usize) -> &str {
        let Some(&start) = self.line_starts.get(line.saturating_sub(1)) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }

    /// Extract source text for a range
    pub fn text_for_range(&self, range: TextRange) -> &str {
        let start = usize::from(range.start()).min(self.text.len());
        let end = usize::from(range.end()).min(self.text.len());
        self.text.get(start..end).unwrap_or_default()
    }

    /// Location of a definition: the `def`/`class` line (after any
    /// decorators) through the last line of its body
    pub fn definition_location(&self, range: TextRange) -> Location {
        let start = usize::from(range.start());
        let end = usize::from(range.end()).saturating_sub(1).max(start);
        let end_line = self.line_of(end);

        let mut line = self.line_of(start);
        while line < end_line && !is_definition_line(self.line_text(line)) {
            line += 1;
        }

        Location::new(self.path.display().to_string(), line, end_line)
    }
}

fn is_definition_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("def ") || trimmed.starts_with("async ") || trimmed.starts_with("class ")
}

/// Collapse a multi-line source fragment onto one line
fn single_line(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let mut out = String::new();
    for part in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let glue = !out.is_empty()
            && !out.ends_with(['(', '[', '{'])
            && !part.starts_with([')', ']', '}']);
        if glue {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

/// A parsed Python module with source information
#[derive(Debug)]
pub struct ParsedModule {
    /// Top-level statements
    pub suite: ast::Suite,
    /// Source information for location lookups
    pub source_info: SourceInfo,
}

/// Parse Python source text
pub fn parse_python_source(
    module: &ModuleId,
    path: impl AsRef<Path>,
    source: impl Into<String>,
) -> EtchResult<ParsedModule> {
    let path = path.as_ref();
    let source_info = SourceInfo::new(path, source);

    let suite = ast::Suite::parse(&source_info.text, &path.display().to_string()).map_err(|e| {
        let line = source_info.line_of(usize::from(e.offset));
        EtchError::extraction_at(module.as_str(), e.error.to_string(), line)
    })?;

    Ok(ParsedModule { suite, source_info })
}

/// Options controlling which symbols are kept
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Keep underscore-prefixed symbols
    pub include_private: bool,
    /// Qualified-name prefixes to drop
    pub exclude: Vec<String>,
}

/// Borrowed view over `def` and `async def` statements
struct FunctionNode<'a> {
    name: &'a str,
    args: &'a ast::Arguments,
    body: &'a [ast::Stmt],
    decorator_list: &'a [ast::Expr],
    returns: Option<&'a ast::Expr>,
    range: TextRange,
    is_async: bool,
}

impl<'a> From<&'a ast::StmtFunctionDef> for FunctionNode<'a> {
    fn from(f: &'a ast::StmtFunctionDef) -> Self {
        Self {
            name: f.name.as_str(),
            args: &f.args,
            body: &f.body,
            decorator_list: &f.decorator_list,
            returns: f.returns.as_deref(),
            range: f.range,
            is_async: false,
        }
    }
}

impl<'a> From<&'a ast::StmtAsyncFunctionDef> for FunctionNode<'a> {
    fn from(f: &'a ast::StmtAsyncFunctionDef) -> Self {
        Self {
            name: f.name.as_str(),
            args: &f.args,
            body: &f.body,
            decorator_list: &f.decorator_list,
            returns: f.returns.as_deref(),
            range: f.range,
            is_async: true,
        }
    }
}

/// Names defined so far in one class or module body
#[derive(Default)]
struct Scope {
    /// Function/property name -> index in the output
    names: HashMap<String, usize>,
    /// Names seen only as `@overload` variants so far
    overload_only: HashSet<String>,
}

/// Extracts symbol tables from Python modules
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Read and extract one resolved module
    pub fn extract_file(&self, entry: &ModuleEntry) -> EtchResult<SymbolTable> {
        let source = std::fs::read_to_string(&entry.path).map_err(|e| {
            EtchError::extraction(
                entry.id.as_str(),
                format!("cannot read {}: {}", entry.path.display(), e),
            )
        })?;
        self.extract_source(&entry.id, &entry.path, &source)
    }

    /// Extract the symbol table of `module` from source text
    pub fn extract_source(
        &self,
        module: &ModuleId,
        path: impl AsRef<Path>,
        source: &str,
    ) -> EtchResult<SymbolTable> {
        let path = path.as_ref();
        let parsed = parse_python_source(module, path, source)?;
        let info = &parsed.source_info;

        let module_symbol = Symbol::module(
            module,
            Location::new(path.display().to_string(), 1, info.line_count().max(1)),
            docstring_of(&parsed.suite),
        );

        let mut table = SymbolTable::new(module.clone(), module_symbol);
        table.source_path = Some(path.to_path_buf());
        self.extract_body(&parsed, module, &parsed.suite, None, &mut table.symbols);

        for symbol in table.symbols.iter_mut().skip(1) {
            if self
                .options
                .exclude
                .iter()
                .any(|e| matches_prefix(&symbol.qualified_name, e))
            {
                symbol.visibility = Visibility::Excluded;
            }
        }
        let include_private = self.options.include_private;
        table.symbols.retain(|s| {
            matches!(s.def, SymbolDef::Module) || s.visibility.should_document(include_private)
        });

        tracing::debug!(module = %module, symbols = table.len(), "extracted symbols");
        Ok(table)
    }

    fn extract_body(
        &self,
        parsed: &ParsedModule,
        module: &ModuleId,
        body: &[ast::Stmt],
        parent: Option<&str>,
        out: &mut Vec<Symbol>,
    ) {
        let mut scope = Scope::default();

        for stmt in body {
            match stmt {
                ast::Stmt::ClassDef(class) => {
                    let path = join_path(parent, class.name.as_str());
                    let info = &parsed.source_info;

                    let mut bases: Vec<String> = class
                        .bases
                        .iter()
                        .map(|b| single_line(info.text_for_range(b.range())))
                        .collect();
                    bases.extend(
                        class
                            .keywords
                            .iter()
                            .map(|k| single_line(info.text_for_range(k.range))),
                    );

                    let class_def = ClassDef {
                        bases,
                        decorators: decorators_of(info, &class.decorator_list),
                    };
                    out.push(
                        Symbol::new(
                            module,
                            path.clone(),
                            info.definition_location(class.range),
                            SymbolDef::Class { class_def },
                        )
                        .with_doc(docstring_of(&class.body)),
                    );
                    self.extract_body(parsed, module, &class.body, Some(&path), out);
                }
                ast::Stmt::FunctionDef(f) => {
                    self.add_function(parsed, module, parent, f.into(), &mut scope, out)
                }
                ast::Stmt::AsyncFunctionDef(f) => {
                    self.add_function(parsed, module, parent, f.into(), &mut scope, out)
                }
                _ => {}
            }
        }
    }

    fn add_function(
        &self,
        parsed: &ParsedModule,
        module: &ModuleId,
        parent: Option<&str>,
        f: FunctionNode<'_>,
        scope: &mut Scope,
        out: &mut Vec<Symbol>,
    ) {
        let info = &parsed.source_info;
        let in_class = parent.is_some();
        let path = join_path(parent, f.name);
        let location = info.definition_location(f.range);
        let doc = docstring_of(f.body);
        let returns = f.returns.map(|r| single_line(info.text_for_range(r.range())));
        let decorators = decorators_of(info, f.decorator_list);

        if in_class {
            if let Some(accessor) = decorators.iter().find(|d| d.is_accessor()) {
                let target = accessor.name.rsplit_once('.').map(|(t, _)| t).unwrap_or_default();
                if let Some(&idx) = scope.names.get(target) {
                    if let SymbolDef::Property { property_def } = &mut out[idx].def {
                        if accessor.name.ends_with(".setter") {
                            property_def.settable = true;
                        } else {
                            property_def.deletable = true;
                        }
                        return;
                    }
                }
            }

            if decorators.iter().any(|d| d.is_property()) {
                let property_def = PropertyDef {
                    returns,
                    settable: false,
                    deletable: false,
                    decorators: decorators.into_iter().filter(|d| !d.is_property()).collect(),
                };
                scope.names.insert(f.name.to_string(), out.len());
                out.push(
                    Symbol::new(module, path, location, SymbolDef::Property { property_def })
                        .with_doc(doc),
                );
                return;
            }
        }

        let is_overload = decorators.iter().any(|d| d.is_overload());
        let function_def = FunctionDef {
            params: params_of(info, f.args),
            returns,
            is_async: f.is_async,
            is_generator: contains_yield(f.body),
            decorators: decorators.into_iter().filter(|d| !d.is_overload()).collect(),
            overloads: usize::from(is_overload),
        };
        let def = if in_class {
            SymbolDef::Method { function_def }
        } else {
            SymbolDef::Function { function_def }
        };
        let mut symbol = Symbol::new(module, path, location, def).with_doc(doc);

        match scope.names.get(f.name).copied() {
            Some(idx) if is_overload && scope.overload_only.contains(f.name) => {
                if let Some(existing) = function_def_mut(&mut out[idx]) {
                    existing.overloads += 1;
                }
            }
            Some(idx) => {
                if scope.overload_only.remove(f.name) {
                    let previous = &out[idx];
                    if let (Some(variants), Some(def)) = (
                        function_def_ref(previous).map(|d| d.overloads),
                        function_def_mut(&mut symbol),
                    ) {
                        def.overloads = variants;
                    }
                    if symbol.doc.is_empty() {
                        symbol.doc = previous.doc.clone();
                    }
                }
                // a later definition replaces an earlier one at its position
                out[idx] = symbol;
            }
            None => {
                if is_overload {
                    scope.overload_only.insert(f.name.to_string());
                }
                scope.names.insert(f.name.to_string(), out.len());
                out.push(symbol);
            }
        }
    }
}

fn join_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}.{}", parent, name),
        None => name.to_string(),
    }
}

fn function_def_ref(symbol: &Symbol) -> Option<&FunctionDef> {
    match &symbol.def {
        SymbolDef::Function { function_def } | SymbolDef::Method { function_def } => {
            Some(function_def)
        }
        _ => None,
    }
}

fn function_def_mut(symbol: &mut Symbol) -> Option<&mut FunctionDef> {
    match &mut symbol.def {
        SymbolDef::Function { function_def } | SymbolDef::Method { function_def } => {
            Some(function_def)
        }
        _ => None,
    }
}

fn decorators_of(info: &SourceInfo, decorator_list: &[ast::Expr]) -> Vec<DecoratorDef> {
    decorator_list
        .iter()
        .map(|d| DecoratorDef::from_source(single_line(info.text_for_range(d.range()))))
        .collect()
}

fn params_of(info: &SourceInfo, args: &ast::Arguments) -> Vec<ParamDef> {
    let text = |e: &ast::Expr| single_line(info.text_for_range(e.range()));

    let with_default = |a: &ast::ArgWithDefault, kind: ParamKind| ParamDef {
        name: a.def.arg.as_str().to_string(),
        kind,
        annotation: a.def.annotation.as_deref().map(text),
        default: a.default.as_deref().map(text),
    };
    let bare = |a: &ast::Arg, kind: ParamKind| ParamDef {
        name: a.arg.as_str().to_string(),
        kind,
        annotation: a.annotation.as_deref().map(text),
        default: None,
    };

    let mut params = Vec::new();
    params.extend(
        args.posonlyargs
            .iter()
            .map(|a| with_default(a, ParamKind::PositionalOnly)),
    );
    params.extend(args.args.iter().map(|a| with_default(a, ParamKind::Regular)));
    if let Some(ref vararg) = args.vararg {
        params.push(bare(vararg, ParamKind::VarPositional));
    }
    params.extend(
        args.kwonlyargs
            .iter()
            .map(|a| with_default(a, ParamKind::KeywordOnly)),
    );
    if let Some(ref kwarg) = args.kwarg {
        params.push(bare(kwarg, ParamKind::VarKeyword));
    }
    params
}

/// Docstring of a module, class or function body
fn docstring_of(body: &[ast::Stmt]) -> Docstring {
    if let Some(ast::Stmt::Expr(ast::StmtExpr { value, .. })) = body.first() {
        if let ast::Expr::Constant(ast::ExprConstant {
            value: ast::Constant::Str(text),
            ..
        }) = value.as_ref()
        {
            return Docstring::parse(text);
        }
    }
    Docstring::default()
}

/// Whether a function body yields, ignoring nested functions and classes
fn contains_yield(body: &[ast::Stmt]) -> bool {
    body.iter().any(stmt_yields)
}

fn stmt_yields(stmt: &ast::Stmt) -> bool {
    match stmt {
        ast::Stmt::FunctionDef(_) | ast::Stmt::AsyncFunctionDef(_) | ast::Stmt::ClassDef(_) => {
            false
        }
        ast::Stmt::Expr(s) => expr_yields(&s.value),
        ast::Stmt::Return(s) => opt_yields(s.value.as_deref()),
        ast::Stmt::Assign(s) => s.targets.iter().any(expr_yields) || expr_yields(&s.value),
        ast::Stmt::AugAssign(s) => expr_yields(&s.target) || expr_yields(&s.value),
        ast::Stmt::AnnAssign(s) => expr_yields(&s.target) || opt_yields(s.value.as_deref()),
        ast::Stmt::Delete(s) => s.targets.iter().any(expr_yields),
        ast::Stmt::Raise(s) => opt_yields(s.exc.as_deref()) || opt_yields(s.cause.as_deref()),
        ast::Stmt::Assert(s) => expr_yields(&s.test) || opt_yields(s.msg.as_deref()),
        ast::Stmt::If(s) => {
            expr_yields(&s.test) || contains_yield(&s.body) || contains_yield(&s.orelse)
        }
        ast::Stmt::While(s) => {
            expr_yields(&s.test) || contains_yield(&s.body) || contains_yield(&s.orelse)
        }
        ast::Stmt::For(s) => {
            expr_yields(&s.iter) || contains_yield(&s.body) || contains_yield(&s.orelse)
        }
        ast::Stmt::AsyncFor(s) => {
            expr_yields(&s.iter) || contains_yield(&s.body) || contains_yield(&s.orelse)
        }
        ast::Stmt::With(s) => {
            s.items.iter().any(|i| expr_yields(&i.context_expr)) || contains_yield(&s.body)
        }
        ast::Stmt::AsyncWith(s) => {
            s.items.iter().any(|i| expr_yields(&i.context_expr)) || contains_yield(&s.body)
        }
        ast::Stmt::Try(s) => {
            contains_yield(&s.body)
                || s.handlers.iter().any(|h| match h {
                    ast::ExceptHandler::ExceptHandler(h) => contains_yield(&h.body),
                })
                || contains_yield(&s.orelse)
                || contains_yield(&s.finalbody)
        }
        ast::Stmt::TryStar(s) => {
            contains_yield(&s.body)
                || s.handlers.iter().any(|h| match h {
                    ast::ExceptHandler::ExceptHandler(h) => contains_yield(&h.body),
                })
                || contains_yield(&s.orelse)
                || contains_yield(&s.finalbody)
        }
        ast::Stmt::Match(s) => {
            expr_yields(&s.subject) || s.cases.iter().any(|c| contains_yield(&c.body))
        }
        _ => false,
    }
}

fn opt_yields(expr: Option<&ast::Expr>) -> bool {
    expr.map_or(false, expr_yields)
}

/// `yield` or `yield from` anywhere in `expr`, outside lambdas and
/// comprehensions (which are scopes of their own)
fn expr_yields(expr: &ast::Expr) -> bool {
    use ast::Expr;

    match expr {
        Expr::Yield(_) | Expr::YieldFrom(_) => true,
        Expr::Lambda(_)
        | Expr::ListComp(_)
        | Expr::SetComp(_)
        | Expr::DictComp(_)
        | Expr::GeneratorExp(_)
        | Expr::Constant(_)
        | Expr::Name(_) => false,
        Expr::BoolOp(e) => e.values.iter().any(expr_yields),
        Expr::NamedExpr(e) => expr_yields(&e.target) || expr_yields(&e.value),
        Expr::BinOp(e) => expr_yields(&e.left) || expr_yields(&e.right),
        Expr::UnaryOp(e) => expr_yields(&e.operand),
        Expr::IfExp(e) => expr_yields(&e.test) || expr_yields(&e.body) || expr_yields(&e.orelse),
        Expr::Dict(e) => {
            e.keys.iter().flatten().any(expr_yields) || e.values.iter().any(expr_yields)
        }
        Expr::Set(e) => e.elts.iter().any(expr_yields),
        Expr::List(e) => e.elts.iter().any(expr_yields),
        Expr::Tuple(e) => e.elts.iter().any(expr_yields),
        Expr::Await(e) => expr_yields(&e.value),
        Expr::Compare(e) => expr_yields(&e.left) || e.comparators.iter().any(expr_yields),
        Expr::Call(e) => {
            expr_yields(&e.func)
                || e.args.iter().any(expr_yields)
                || e.keywords.iter().any(|k| expr_yields(&k.value))
        }
        Expr::FormattedValue(e) => {
            expr_yields(&e.value) || opt_yields(e.format_spec.as_deref())
        }
        Expr::JoinedStr(e) => e.values.iter().any(expr_yields),
        Expr::Attribute(e) => expr_yields(&e.value),
        Expr::Subscript(e) => expr_yields(&e.value) || expr_yields(&e.slice),
        Expr::Starred(e) => expr_yields(&e.value),
        Expr::Slice(e) => {
            opt_yields(e.lower.as_deref())
                || opt_yields(e.upper.as_deref())
                || opt_yields(e.step.as_deref())
        }
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SymbolKind;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> SymbolTable {
        Extractor::default()
            .extract_source(&ModuleId::new("pkg.mod"), "pkg/mod.py", source)
            .unwrap()
    }

    fn paths(table: &SymbolTable) -> Vec<&str> {
        table.members().map(|s| s.path.as_str()).collect()
    }

    #[test]
    fn test_declaration_order_and_nesting() {
        let table = extract(
            r#""""Module docs."""

def zeta():
    pass

class Outer:
    """Outer class."""

    class Inner:
        def deep(self):
            pass

    def method(self):
        pass

def alpha():
    pass
"#,
        );

        assert_eq!(table.module_symbol().unwrap().doc.summary(), Some("Module docs."));
        assert_eq!(
            paths(&table),
            vec!["zeta", "Outer", "Outer.Inner", "Outer.Inner.deep", "Outer.method", "alpha"]
        );
        let deep = table.get("Outer.Inner.deep").unwrap();
        assert_eq!(deep.kind(), SymbolKind::Method);
        assert_eq!(deep.qualified_name, "pkg.mod.Outer.Inner.deep");
        assert_eq!(table.get("zeta").unwrap().kind(), SymbolKind::Function);
    }

    #[test]
    fn test_signature_text_is_literal() {
        let table = extract(
            "def connect(host: str, /, port: int = 0x50, *args: 'Any', timeout: float = 1e3, **kw) -> Optional[Conn]:\n    pass\n",
        );
        let sym = table.get("connect").unwrap();
        assert_eq!(
            sym.signature().as_deref(),
            Some("connect(host: str, /, port: int = 0x50, *args: 'Any', timeout: float = 1e3, **kw) -> Optional[Conn]")
        );
    }

    #[test]
    fn test_multiline_default_is_collapsed() {
        let table = extract("def f(opts={\n    'a': 1,\n    'b': 2,\n}):\n    pass\n");
        let sym = table.get("f").unwrap();
        assert_eq!(sym.signature().as_deref(), Some("f(opts = {'a': 1, 'b': 2,})"));
    }

    #[test]
    fn test_async_and_generator_markers() {
        let table = extract(
            r#"async def fetch():
    return 1

def rows():
    """Rows, but the word yield in a docstring is ignored."""
    for i in range(3):
        yield i

def plain():
    """Does not yield."""
    def inner():
        yield 1
    return inner
"#,
        );

        let get = |path: &str| match &table.get(path).unwrap().def {
            SymbolDef::Function { function_def } => function_def.clone(),
            other => panic!("unexpected def {:?}", other),
        };
        assert!(get("fetch").is_async);
        assert!(!get("fetch").is_generator);
        assert!(get("rows").is_generator);
        assert!(!get("plain").is_generator);
        assert_eq!(
            table.get("fetch").unwrap().signature().as_deref(),
            Some("async fetch()")
        );
    }

    #[test]
    fn test_yield_in_strings_is_not_a_generator() {
        let table = extract(
            r#"def signal():
    msg = "please yield to traffic"
    log("yield", f"{msg} yield")
    return msg

def pump(src):
    x = (yield)
    if (yield from src):
        return x

def squares():
    return [n * n for n in range(3)]
"#,
        );

        let is_generator = |path: &str| match &table.get(path).unwrap().def {
            SymbolDef::Function { function_def } => function_def.is_generator,
            other => panic!("unexpected def {:?}", other),
        };
        assert!(!is_generator("signal"));
        assert!(is_generator("pump"));
        assert!(!is_generator("squares"));
    }

    #[test]
    fn test_overloads_fold_into_implementation() {
        let table = extract(
            r#"from typing import overload

@overload
def parse(value: int) -> int: ...
@overload
def parse(value: str) -> str: ...
def parse(value):
    """Parse a value."""
    return value

@overload
def only(x: int) -> int: ...
"#,
        );

        assert_eq!(paths(&table), vec!["parse", "only"]);
        let parse = table.get("parse").unwrap();
        match &parse.def {
            SymbolDef::Function { function_def } => {
                assert_eq!(function_def.overloads, 2);
                assert!(function_def.decorators.is_empty());
            }
            other => panic!("unexpected def {:?}", other),
        }
        assert_eq!(parse.signature().as_deref(), Some("parse(value)"));
        assert_eq!(parse.doc.summary(), Some("Parse a value."));
        assert_eq!(parse.location.line, 7);
    }

    #[test]
    fn test_properties_and_accessors() {
        let table = extract(
            r#"class Config:
    @property
    def name(self) -> str:
        """The name."""
        return self._name

    @name.setter
    def name(self, value: str) -> None:
        self._name = value

    @functools.cached_property
    def size(self) -> int:
        return 1

    @staticmethod
    def build() -> "Config":
        return Config()
"#,
        );

        assert_eq!(paths(&table), vec!["Config", "Config.name", "Config.size", "Config.build"]);
        let name = table.get("Config.name").unwrap();
        assert_eq!(name.kind(), SymbolKind::Property);
        assert_eq!(name.signature().as_deref(), Some("name: str"));
        match &name.def {
            SymbolDef::Property { property_def } => {
                assert!(property_def.settable);
                assert!(!property_def.deletable);
            }
            other => panic!("unexpected def {:?}", other),
        }
        let build = table.get("Config.build").unwrap();
        assert_eq!(build.decorators()[0].to_python(), "@staticmethod");
    }

    #[test]
    fn test_decorated_location_points_at_def_line() {
        let table = extract("import functools\n\n@functools.lru_cache(maxsize=None)\ndef cached(x):\n    return x\n");
        let sym = table.get("cached").unwrap();
        assert_eq!(sym.location.line, 4);
        assert_eq!(sym.location.end_line, 5);
        assert_eq!(
            sym.decorators()[0].to_python(),
            "@functools.lru_cache(maxsize=None)"
        );
    }

    #[test]
    fn test_class_bases_and_keywords() {
        let table = extract("class Model(Base, Generic[T], metaclass=Meta):\n    pass\n");
        assert_eq!(
            table.get("Model").unwrap().signature().as_deref(),
            Some("class Model(Base, Generic[T], metaclass=Meta)")
        );
    }

    #[test]
    fn test_private_and_excluded_symbols() {
        let source = r#"def public():
    pass

def _hidden():
    pass

class Client:
    def __init__(self):
        pass

    def send(self):
        pass

    def debug_dump(self):
        pass
"#;
        let table = Extractor::new(ExtractOptions {
            include_private: false,
            exclude: vec!["pkg.mod.Client.debug_dump".into()],
        })
        .extract_source(&ModuleId::new("pkg.mod"), "pkg/mod.py", source)
        .unwrap();
        assert_eq!(paths(&table), vec!["public", "Client", "Client.send"]);

        let table = Extractor::new(ExtractOptions {
            include_private: true,
            exclude: vec![],
        })
        .extract_source(&ModuleId::new("pkg.mod"), "pkg/mod.py", source)
        .unwrap();
        assert_eq!(
            paths(&table),
            vec!["public", "_hidden", "Client", "Client.__init__", "Client.send", "Client.debug_dump"]
        );
        assert_eq!(table.get("_hidden").unwrap().visibility, Visibility::Private);
    }

    #[test]
    fn test_imports_are_not_documented() {
        let table = extract("from .core import Engine, run\nimport os\n");
        assert!(table.members().next().is_none());
        assert!(table.is_empty_module());
    }

    #[test]
    fn test_syntax_error_reports_module_and_line() {
        let err = Extractor::default()
            .extract_source(&ModuleId::new("pkg.broken"), "pkg/broken.py", "x = 1\n\ndef broken(:\n    pass\n")
            .unwrap_err();
        match err {
            EtchError::Extraction { module, line, .. } => {
                assert_eq!(module, "pkg.broken");
                assert_eq!(line, Some(3));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_source_info_lines() {
        let info = SourceInfo::new("a.py", "one\ntwo\nthree\n");
        assert_eq!(info.line_count(), 3);
        assert_eq!(info.line_of(0), 1);
        assert_eq!(info.line_of(4), 2);
        assert_eq!(info.line_text(3), "three");
        assert_eq!(info.line_text(9), "");
    }
}
