//! Template tokenizer: literal text interleaved with `${...}` occurrences.

mod parser;

pub use parser::{SubExpression, TemplateParseResult, TemplateShape, parse_template};
