//! Diagnostics and error reporting for scene files
//!
//! Spans locate a problem in the scene source; diagnostics collect analyzer
//! findings; the `format_*` helpers render errors for terminal output.

use crate::scene::ParseError;
use std::fmt;

/// Byte range in the scene source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// 0-indexed line containing `start`.
    pub fn line_in(&self, source: &str) -> usize {
        let upto = self.start.min(source.len());
        source.as_bytes()[..upto].iter().filter(|&&b| b == b'\n').count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

/// Ordered collection of diagnostics from one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Format a parse error with the offending source line, when known.
pub fn format_parse_error(error: &ParseError, source: &str) -> String {
    let mut msg = format!("Parse error: {}", error);

    if let Some(span) = error.span() {
        let line = span.line_in(source);
        if let Some(text) = source.lines().nth(line) {
            msg.push_str(&format!("\n  at line {}: {}", line + 1, text));
        }
    }

    msg
}

/// Format an analyzer diagnostic with its source line, when known.
pub fn format_diagnostic(diagnostic: &Diagnostic, source: &str) -> String {
    let mut msg = diagnostic.to_string();
    if let Some(span) = diagnostic.span {
        let line = span.line_in(source);
        if let Some(text) = source.lines().nth(line) {
            msg.push_str(&format!("\n  at line {}: {}", line + 1, text.trim()));
        }
    }
    msg
}

pub fn format_runtime_error(error: &dyn std::error::Error) -> String {
    format!("Runtime error: {}", error)
}
