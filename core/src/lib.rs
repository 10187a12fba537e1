//! Stencil core: an optimizing front-end for template expression compilers.
//!
//! Template strings such as `"Hello ${name}"` are split into literal text
//! and `${...}` occurrences. Literal-only templates are folded to constants
//! through cached, per-profile conversions; mixed templates are compiled
//! occurrence by occurrence and recombined; everything else is handed to
//! the wrapped [`backend::Backend`] unchanged.

pub mod api;
pub mod backend;
pub mod conversion;
pub mod position;
pub mod template;
pub mod types;
pub mod values;

pub use types::Type;
pub use values::{EvalContext, Value};
