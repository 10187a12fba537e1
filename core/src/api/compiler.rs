//! The template-optimizing front-end.
//!
//! [`TemplateExpressionCompiler`] sits in front of a [`Backend`] and takes
//! over the template expressions it can compile cheaply:
//!
//! ```text
//! "42"              → fold through the profile's conversion     → Literal
//! "plain text"      → text-typed result, no conversion needed  → Literal
//! "${x}"            → passthrough                              → backend
//! "Hi ${a}, ${b}!"  → recurse into "${a}" and "${b}"           → OptimizedTemplate
//! anything else     →                                            backend
//! ```

use tracing::debug;

use super::{
    CompilationFailed, CompileError, CompiledExpression, CompilerOptions, Error,
    ExpressionDefinition,
};
use crate::backend::{Backend, SharedBackend};
use crate::conversion::{ConversionCache, check_literal, evaluate_literal};
use crate::template::{TemplateParseResult, TemplateShape, parse_template};
use crate::values::Value;

/// The compile contract shared by the backend and the accelerator wrapping
/// it, so one can replace the other.
pub trait ExpressionCompiler {
    fn compile_expression(&self, def: &ExpressionDefinition) -> Result<CompiledExpression, Error>;

    /// Diagnostics for `def` without producing an expression.
    fn get_errors(&self, def: &ExpressionDefinition) -> Result<Vec<CompileError>, Error>;

    fn reset(&self);
}

impl<B: Backend> ExpressionCompiler for SharedBackend<B> {
    fn compile_expression(&self, def: &ExpressionDefinition) -> Result<CompiledExpression, Error> {
        self.with_backend(|backend| backend.compile_expression(def))
            .map(CompiledExpression::Delegated)
    }

    fn get_errors(&self, def: &ExpressionDefinition) -> Result<Vec<CompileError>, Error> {
        self.with_backend(|backend| backend.get_errors(def))
    }

    fn reset(&self) {
        self.with_backend(|backend| backend.reset());
    }
}

/// Drop-in accelerator for a [`Backend`].
///
/// # Example
///
/// ```ignore
/// let compiler = TemplateExpressionCompiler::new(
///     SharedBackend::new(MyBackend::default()),
///     CompilerOptions::default(),
/// );
/// let def = ExpressionDefinition::new(profile, "Hello ${name}")
///     .template()
///     .with_result_type(Type::Str);
/// let expr = compiler.compile_expression(&def)?;
/// ```
pub struct TemplateExpressionCompiler<B> {
    backend: SharedBackend<B>,
    cache: ConversionCache,
    options: CompilerOptions,
}

impl<B: Backend> TemplateExpressionCompiler<B> {
    pub fn new(backend: SharedBackend<B>, options: CompilerOptions) -> Self {
        Self {
            cache: ConversionCache::new(options.conversion_cache_idle),
            backend,
            options,
        }
    }

    pub fn backend(&self) -> &SharedBackend<B> {
        &self.backend
    }

    pub fn conversion_cache(&self) -> &ConversionCache {
        &self.cache
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn optimizes(&self, def: &ExpressionDefinition) -> bool {
        self.options.optimize_templates && def.is_template() && !def.is_setter()
    }

    fn delegate(&self, def: &ExpressionDefinition) -> Result<CompiledExpression, Error> {
        debug!(expression = def.expression_text(), "delegating to backend");
        self.backend
            .compile_expression(def)
            .map_err(|err| relocate(err, def))
    }

    fn compile_literal(
        &self,
        def: &ExpressionDefinition,
        text: &str,
    ) -> Result<CompiledExpression, Error> {
        if def.result_type().accepts_text() {
            debug!(expression = def.expression_text(), "raw text literal");
            let value = if text.is_empty() {
                Value::Null
            } else {
                Value::str(text)
            };
            return Ok(CompiledExpression::Literal(value));
        }

        match self.cache.get(def, &self.backend)? {
            Ok(descriptor) => {
                debug!(
                    expression = def.expression_text(),
                    ty = %def.result_type(),
                    "folding literal"
                );
                evaluate_literal(&descriptor, text, def).map(CompiledExpression::Literal)
            }
            // The backend may still read the text as a literal of its own language.
            Err(unavailable) => {
                debug!(%unavailable, "no literal conversion");
                self.delegate(def)
            }
        }
    }

    fn compile_template(
        &self,
        def: &ExpressionDefinition,
        parsed: &TemplateParseResult,
    ) -> Result<CompiledExpression, Error> {
        debug!(
            expression = def.expression_text(),
            occurrences = parsed.expressions.len(),
            "splitting template"
        );

        let mut sub_expressions = Vec::with_capacity(parsed.expressions.len());
        let mut errors = Vec::new();
        for sub in &parsed.expressions {
            match self.compile_expression(&def.sub_expression(sub)) {
                Ok(compiled) => sub_expressions.push(compiled),
                Err(Error::Compilation(failed)) => errors.extend(failed.errors),
                Err(other) => return Err(other),
            }
        }

        if !errors.is_empty() {
            return Err(CompilationFailed::new(errors, def.original_expression_text()).into());
        }

        Ok(CompiledExpression::OptimizedTemplate {
            parts: parsed.literals.clone(),
            sub_expressions,
        })
    }
}

impl<B: Backend> ExpressionCompiler for TemplateExpressionCompiler<B> {
    fn compile_expression(&self, def: &ExpressionDefinition) -> Result<CompiledExpression, Error> {
        if !self.optimizes(def) {
            return self.delegate(def);
        }

        let parsed = parse_template(def.expression_text());
        match parsed.shape() {
            TemplateShape::Literal(text) => self.compile_literal(def, text),
            // A lone occurrence is left to the backend as-is.
            TemplateShape::Wrapper(_) => self.delegate(def),
            TemplateShape::Mixed if def.result_type().accepts_text() => {
                self.compile_template(def, &parsed)
            }
            TemplateShape::Mixed => self.delegate(def),
        }
    }

    /// Backend diagnostics first; if there are none, the literal conversion
    /// check a compile would run.
    fn get_errors(&self, def: &ExpressionDefinition) -> Result<Vec<CompileError>, Error> {
        let errors = match self.backend.get_errors(def) {
            Ok(errors) if def.position_mapping().is_identity() => errors,
            Ok(errors) => errors
                .into_iter()
                .map(|e| e.relocate(def.position_mapping(), def.original_expression_text()))
                .collect(),
            Err(err) => return Err(relocate(err, def)),
        };
        if !errors.is_empty() || !self.optimizes(def) || def.result_type().accepts_text() {
            return Ok(errors);
        }

        let parsed = parse_template(def.expression_text());
        let TemplateShape::Literal(text) = parsed.shape() else {
            return Ok(errors);
        };
        match self.cache.get(def, &self.backend)? {
            Ok(descriptor) => check_literal(&descriptor, text, def),
            Err(_) => Ok(errors),
        }
    }

    fn reset(&self) {
        self.backend.with_backend(|backend| {
            self.cache.invalidate_all();
            backend.reset();
        });
    }
}

/// Move backend diagnostics for a derived expression into original
/// coordinates.
fn relocate(err: Error, def: &ExpressionDefinition) -> Error {
    match err {
        Error::Compilation(failed) if !def.position_mapping().is_identity() => {
            CompilationFailed {
                errors: failed
                    .errors
                    .into_iter()
                    .map(|e| e.relocate(def.position_mapping(), def.original_expression_text()))
                    .collect(),
                source_text: def.original_expression_text().to_string(),
            }
            .into()
        }
        other => other,
    }
}
