//! Compile-time folding of literal template text.

use super::cache::ConversionDescriptor;
use super::registry::ConversionFailure;
use crate::api::{CompilationFailed, CompileError, Error, ExpressionDefinition};
use crate::position::Span;
use crate::values::Value;

/// Apply `descriptor` to the literal `text` of `def`.
///
/// Empty text of a nullable type is absent and never reaches the
/// conversion. A predictable rejection becomes a single [`CompileError`]
/// covering the literal; any other failure propagates unchanged.
pub fn evaluate_literal(
    descriptor: &ConversionDescriptor,
    text: &str,
    def: &ExpressionDefinition,
) -> Result<Value, Error> {
    if descriptor.is_nullable() && text.is_empty() {
        return Ok(Value::Null);
    }

    match descriptor.convert(text) {
        Ok(value) => Ok(value),
        Err(ConversionFailure::Invalid { kind, message }) => {
            let error = CompileError::new(
                text,
                1,
                format!(
                    "Cannot convert literal '{}' to {}: {}: {}",
                    text,
                    def.result_type(),
                    kind,
                    message
                ),
            )
            .with_span(Span::new(0, def.expression_text().len()))
            .with_code("T001")
            .relocate(def.position_mapping(), def.original_expression_text());
            Err(CompilationFailed::single(error, def.original_expression_text()).into())
        }
        Err(ConversionFailure::Fatal(message)) => Err(Error::Conversion {
            literal: text.to_string(),
            ty: def.result_type().to_string(),
            message,
        }),
    }
}

/// Diagnostics-only variant of [`evaluate_literal`].
pub fn check_literal(
    descriptor: &ConversionDescriptor,
    text: &str,
    def: &ExpressionDefinition,
) -> Result<Vec<CompileError>, Error> {
    match evaluate_literal(descriptor, text, def) {
        Ok(_) => Ok(Vec::new()),
        Err(Error::Compilation(failed)) => Ok(failed.errors),
        Err(other) => Err(other),
    }
}
