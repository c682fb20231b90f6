//! Error types and diagnostics
//!
//! This module provides error handling and diagnostic reporting
//! for the documentation generator. Fatal conditions are `EtchError`
//! values; non-fatal conditions are collected as `Diagnostic`s and
//! surfaced in the run summary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for py-etch operations
pub type EtchResult<T> = Result<T, EtchError>;

/// Main error type for py-etch
#[derive(Debug, Error)]
pub enum EtchError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Root module (or an explicitly requested module) could not be located.
    /// Fatal: no unit is started.
    #[error("Cannot resolve module '{module}': {message}")]
    Resolution { module: String, message: String },

    /// Source of one module could not be parsed
    #[error("Parse error in {module}{}: {message}", .line.map(|l| format!(" (line {})", l)).unwrap_or_default())]
    Extraction {
        module: String,
        message: String,
        line: Option<usize>,
    },

    /// Symbol table could not be rendered
    #[error("Render error in {module}: {message}")]
    Render { module: String, message: String },

    /// Rendered document could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No navigation node carries the configured anchor/group name
    #[error("Navigation target '{0}' not found")]
    NavigationTargetNotFound(String),

    /// More than one navigation node carries the configured name
    #[error("Navigation target '{name}' is ambiguous; found at {}", .locations.join(", "))]
    NavigationTargetAmbiguous {
        name: String,
        locations: Vec<String>,
    },

    /// More than one placeholder marker inside the target node
    #[error("Navigation target '{name}' contains {count} placeholder markers; expected at most one")]
    PlaceholderAmbiguous { name: String, count: usize },

    /// A placeholder marker that is not the only entry of the target's own
    /// `pages`/`groups` list
    #[error(
        "Placeholder marker at {location} is not the sole child of navigation target '{name}'; \
         name the group that directly holds it as the target instead"
    )]
    PlaceholderMisplaced { name: String, location: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl EtchError {
    /// Create a resolution error
    pub fn resolution(module: impl Into<String>, message: impl Into<String>) -> Self {
        EtchError::Resolution {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(module: impl Into<String>, message: impl Into<String>) -> Self {
        EtchError::Extraction {
            module: module.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Create an extraction error with a source line
    pub fn extraction_at(
        module: impl Into<String>,
        message: impl Into<String>,
        line: usize,
    ) -> Self {
        EtchError::Extraction {
            module: module.into(),
            message: message.into(),
            line: Some(line),
        }
    }

    /// Create a render error
    pub fn render(module: impl Into<String>, message: impl Into<String>) -> Self {
        EtchError::Render {
            module: module.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EtchError::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        EtchError::Config(message.into())
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        EtchError::Other(message.into())
    }

    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, EtchError::Resolution { .. } | EtchError::Config(_))
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Error - the run exits non-zero
    Error,
    /// Warning - generation continues
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Source file
    pub file: Option<PathBuf>,
    /// Line number (1-indexed)
    pub line: Option<usize>,
    /// Diagnostic code (for categorization)
    pub code: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: None,
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the line
    pub fn at(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(ref file) = self.file {
            result.push_str(&file.display().to_string());
            if let Some(line) = self.line {
                result.push(':');
                result.push_str(&line.to_string());
            }
            result.push_str(": ");
        }

        result.push_str(self.severity.display());

        if let Some(ref code) = self.code {
            result.push('[');
            result.push_str(code);
            result.push(']');
        }

        result.push_str(": ");
        result.push_str(&self.message);

        result
    }

    /// Forward this diagnostic to the tracing subscriber
    pub fn emit(&self) {
        match self.severity {
            DiagnosticSeverity::Error => tracing::error!("{}", self.format()),
            DiagnosticSeverity::Warning => tracing::warn!("{}", self.format()),
            DiagnosticSeverity::Info => tracing::info!("{}", self.format()),
        }
    }
}

/// Collector for non-fatal diagnostics during a run
#[derive(Debug, Default, Clone)]
pub struct DiagnosticsCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticsCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic and emit it through tracing
    pub fn add(&mut self, diagnostic: Diagnostic) {
        diagnostic.emit();
        self.diagnostics.push(diagnostic);
    }

    /// Add an error
    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::error(message));
    }

    /// Add a warning
    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::warning(message));
    }

    /// Add an info message
    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Diagnostic::info(message));
    }

    /// Move every diagnostic of `other` into this collector
    pub fn extend(&mut self, other: DiagnosticsCollector) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Diagnostics carrying the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.code.as_deref() == Some(code))
    }
}
