//! Compiled expressions.

use core::fmt;
use std::sync::Arc;

use static_assertions::assert_impl_all;
use thiserror::Error;

use crate::values::{EvalContext, Value};

/// Runtime evaluation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Undefined variable '{0}'")]
    UnknownVariable(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// An expression the backend compiled. Must tolerate concurrent, repeated
/// evaluation.
pub trait Evaluate: Send + Sync {
    fn evaluate(&self, ctx: &EvalContext) -> Result<Value, EvalError>;
}

/// A compiled expression ready for evaluation.
///
/// Immutable once built. Evaluating never touches the compiler, its lock or
/// its caches, so one expression can be shared across threads and evaluated
/// any number of times.
///
/// # Example
///
/// ```ignore
/// let expr = compiler.compile_expression(&def)?;
/// let ctx = EvalContext::new().with_variable("name", Value::str("Ann"));
/// assert_eq!(expr.evaluate(&ctx)?, Value::str("Hello Ann"));
/// ```
#[derive(Clone)]
pub enum CompiledExpression {
    /// A constant folded at compile time.
    Literal(Value),

    /// Literal parts interleaved with sub-expression results.
    /// `parts.len() == sub_expressions.len() + 1`.
    OptimizedTemplate {
        parts: Vec<String>,
        sub_expressions: Vec<CompiledExpression>,
    },

    /// Whatever the backend produced.
    Delegated(Arc<dyn Evaluate>),
}

assert_impl_all!(CompiledExpression: Send, Sync);

impl CompiledExpression {
    pub fn evaluate(&self, ctx: &EvalContext) -> Result<Value, EvalError> {
        match self {
            CompiledExpression::Literal(value) => Ok(value.clone()),
            CompiledExpression::OptimizedTemplate {
                parts,
                sub_expressions,
            } => {
                let Some((first, rest)) = parts.split_first() else {
                    return Err(EvalError::Runtime("template has no literal parts".into()));
                };
                if rest.len() != sub_expressions.len() {
                    return Err(EvalError::Runtime(format!(
                        "template has {} literal parts for {} sub-expressions",
                        parts.len(),
                        sub_expressions.len()
                    )));
                }
                let mut result = String::new();
                result.push_str(first);
                for (sub, part) in sub_expressions.iter().zip(rest) {
                    // Null renders as nothing.
                    result.push_str(&sub.evaluate(ctx)?.to_string());
                    result.push_str(part);
                }
                Ok(Value::Str(result))
            }
            CompiledExpression::Delegated(inner) => inner.evaluate(ctx),
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, CompiledExpression::Delegated(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            CompiledExpression::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledExpression::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            CompiledExpression::OptimizedTemplate {
                parts,
                sub_expressions,
            } => f
                .debug_struct("OptimizedTemplate")
                .field("parts", parts)
                .field("sub_expressions", sub_expressions)
                .finish(),
            CompiledExpression::Delegated(_) => f.write_str("Delegated(..)"),
        }
    }
}
