//! Error rendering using ariadne
//!
//! Renders [`Error`]s returned by the compiler with source snippets and
//! labels pointing at the offending template fragment.

use crate::{Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use stencil::{CompilationFailed, CompileError, Error, render_error};
///
/// let failed = CompilationFailed::single(CompileError::new("abc", 1, "not an Integer"), "abc");
/// render_error(&Error::from(failed));
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation(failed) => {
            for compile_error in &failed.errors {
                render_compile_error(&failed.source_text, compile_error, writer, use_color)?;
            }
            Ok(())
        }
        other => writeln!(writer, "{}", other),
    }
}

fn render_compile_error(
    source: &str,
    error: &stencil_core::api::CompileError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let diag = error.to_diagnostic();
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Spans may point past a submitted sub-expression; keep them inside the source.
    let span = diag
        .span
        .as_ref()
        .map(|s| s.start().min(source.len())..s.end().min(source.len()));

    // Notes are only printed alongside labels, so a span-less error carries
    // its location in the headline.
    let message = match span {
        Some(_) => diag.message.clone(),
        None => format!(
            "{} (in '{}' on line {})",
            diag.message, error.source_snippet, error.line
        ),
    };

    let mut report = Report::build(kind, (SOURCE_ID, span.clone().unwrap_or(0..0)))
        .with_message(&message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    if let Some(span) = span {
        report = report.with_label(
            Label::new((SOURCE_ID, span))
                .with_message(&diag.message)
                .with_color(colors.next()),
        );
    }

    for help_msg in &diag.help {
        report = report.with_help(help_msg);
    }

    report.finish().write((SOURCE_ID, Source::from(source)), &mut *writer)
}
