//! Literal-to-value conversions: registry, existence check, cache and
//! compile-time evaluation.

pub mod cache;
pub mod literal;
pub mod probe;
pub mod registry;

pub use cache::{
    CachedConversion, ConversionCache, ConversionDescriptor, ConversionKey, ConversionUnavailable,
};
pub use literal::{check_literal, evaluate_literal};
pub use probe::validate_conversion;
pub use registry::{Conversion, ConversionFailure, ConversionFn, ConversionRegistry};
