//! Stencil - fast compilation of template expressions
//!
//! # Overview
//!
//! Stencil wraps an existing expression compiler (the *backend*) and takes
//! over the template expressions it can compile cheaply. Templates mix
//! literal text with `${...}` occurrences:
//!
//! - `"42"` declared as an Integer is folded to a constant at compile time
//! - `"Hello ${name}, you are ${age} years old"` is compiled occurrence by
//!   occurrence and evaluated by concatenation
//! - everything else is compiled by the backend, unchanged
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use stencil::{
//!     CompilerOptions, EvalContext, ExpressionCompiler, ExpressionDefinition, Profile,
//!     SharedBackend, TemplateExpressionCompiler, Type, Value,
//! };
//!
//! let compiler = TemplateExpressionCompiler::new(
//!     SharedBackend::new(MyBackend::default()),
//!     CompilerOptions::default(),
//! );
//!
//! let profile = Arc::new(Profile::new("mail", Type::named("Message")));
//! let def = ExpressionDefinition::new(profile, "Hello ${name}")
//!     .template()
//!     .with_result_type(Type::Str)
//!     .with_variable("name", Type::Str);
//!
//! let expr = compiler.compile_expression(&def)?;
//! let ctx = EvalContext::new().with_variable("name", Value::str("Ann"));
//! assert_eq!(expr.evaluate(&ctx)?, Value::str("Hello Ann"));
//! ```
//!
//! # Errors
//!
//! Every broken occurrence of a template is reported in one pass. Use
//! [`render_error`] to print them with source snippets.

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from stencil_core
pub use stencil_core::api::{
    CompilationFailed, CompileError, CompiledExpression, CompilerOptions, Diagnostic, Error,
    EvalError, Evaluate, ExpressionCompiler, ExpressionDefinition, Profile, Severity,
    TemplateExpressionCompiler,
};

// Re-export backend plumbing for implementors
pub use stencil_core::backend::{Backend, Fingerprint, LoadedUnit, SharedBackend, SourceUnit, SupportHandle};

// Re-export commonly used types and values
pub use stencil_core::conversion::{ConversionFailure, ConversionRegistry};
pub use stencil_core::position::{PositionMapping, Span};
pub use stencil_core::template::{SubExpression, TemplateParseResult, TemplateShape, parse_template};
pub use stencil_core::{EvalContext, Type, Value};
