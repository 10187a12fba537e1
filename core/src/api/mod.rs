//! Public API of the template-expression accelerator.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stencil_core::api::{
//!     CompilerOptions, ExpressionCompiler, ExpressionDefinition, Profile,
//!     TemplateExpressionCompiler,
//! };
//! use stencil_core::backend::SharedBackend;
//! use stencil_core::{EvalContext, Type, Value};
//!
//! let compiler = TemplateExpressionCompiler::new(
//!     SharedBackend::new(MyBackend::default()),
//!     CompilerOptions::default(),
//! );
//!
//! let profile = Arc::new(Profile::new("settings", Type::Any));
//! let def = ExpressionDefinition::new(profile, "42")
//!     .template()
//!     .with_result_type(Type::Int);
//!
//! // Folded at compile time: the backend is only asked to compile the
//! // conversion supplier, once per (profile, result type, header).
//! let expr = compiler.compile_expression(&def).unwrap();
//! assert_eq!(expr.evaluate(&EvalContext::new()).unwrap(), Value::Int(42));
//! ```

pub mod compiler;
pub mod definition;
pub mod error;
pub mod expression;
pub mod options;

pub use compiler::{ExpressionCompiler, TemplateExpressionCompiler};
pub use definition::{ExpressionDefinition, Profile};
pub use error::{CompilationFailed, CompileError, Diagnostic, Error, Severity};
pub use expression::{CompiledExpression, EvalError, Evaluate};
pub use options::CompilerOptions;

#[cfg(test)]
mod compiler_test;
