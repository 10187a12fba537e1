//! Public error types for template compilation.
//!
//! Diagnosable problems are [`CompileError`]s, aggregated into a
//! [`CompilationFailed`]. Everything else surfaces unchanged through the
//! other [`Error`] variants.

use core::fmt;

use thiserror::Error;

use crate::position::{PositionMapping, Span, line_of};

/// Error type for all compile operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// One or more diagnosable errors attributable to the expression text.
    #[error(transparent)]
    Compilation(#[from] CompilationFailed),

    /// The backend failed in a way that is not tied to the expression.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A conversion failed unexpectedly while folding a literal.
    #[error("conversion of '{literal}' to {ty} failed unexpectedly: {message}")]
    Conversion {
        literal: String,
        ty: String,
        message: String,
    },
}

impl Error {
    pub fn compile_errors(&self) -> &[CompileError] {
        match self {
            Error::Compilation(failed) => &failed.errors,
            _ => &[],
        }
    }
}

/// One diagnosable problem, tied to the most specific fragment available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Text of the fragment the problem was found in.
    pub source_snippet: String,
    /// 1-based line in the original expression text.
    pub line: usize,
    pub message: String,
    /// Byte range in the original expression text, when known.
    pub span: Option<Span>,
    /// Optional error code (e.g., "T001") for documentation lookup.
    pub code: Option<String>,
}

impl CompileError {
    pub fn new(source_snippet: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            source_snippet: source_snippet.into(),
            line,
            message: message.into(),
            span: None,
            code: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Move a span reported against a derived expression string into the
    /// coordinates of `original`.
    pub fn relocate(mut self, mapping: &PositionMapping, original: &str) -> Self {
        if let Some(span) = &self.span {
            let span = mapping.span_to_original(span);
            self.line = line_of(original, span.start());
            self.span = Some(span);
        }
        self
    }

    /// Convert to a Diagnostic for rendering.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let help = match self.code.as_deref() {
            Some("T001") => vec![format!(
                "'{}' must be a valid literal of the declared result type",
                self.source_snippet
            )],
            _ => vec![],
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message.clone(),
            span: self.span.clone(),
            help,
            code: self.code.clone(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} (in '{}')", self.line, self.message, self.source_snippet)
    }
}

/// Aggregate of one or more [`CompileError`]s plus the submitted source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("compilation failed with {} error(s)", .errors.len())]
pub struct CompilationFailed {
    pub errors: Vec<CompileError>,
    /// The text the error spans point into.
    pub source_text: String,
}

impl CompilationFailed {
    pub fn new(errors: Vec<CompileError>, source_text: impl Into<String>) -> Self {
        debug_assert!(!errors.is_empty(), "an aggregate needs at least one error");
        Self {
            errors,
            source_text: source_text.into(),
        }
    }

    pub fn single(error: CompileError, source_text: impl Into<String>) -> Self {
        Self::new(vec![error], source_text)
    }
}

/// A rendered-ready view of a [`CompileError`].
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub help: Vec<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
