//! Types that expression definitions declare for their result, context,
//! root object and variables.

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Top type; any value, including raw text, is acceptable.
    Any,
    Str,
    Int,
    Float,
    Bool,
    /// Nullable wrapper. Its absent representation is [`crate::Value::Null`].
    Optional(Box<Type>),
    /// Host-defined type, identified by name only.
    Named(String),
}

impl Type {
    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// Whether a value of this type can be produced directly from raw
    /// template text, without any conversion.
    pub fn accepts_text(&self) -> bool {
        match self {
            Type::Any | Type::Str => true,
            Type::Optional(inner) => matches!(**inner, Type::Str | Type::Any),
            _ => false,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Any | Type::Str | Type::Optional(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "Any"),
            Type::Str => write!(f, "String"),
            Type::Int => write!(f, "Integer"),
            Type::Float => write!(f, "Float"),
            Type::Bool => write!(f, "Boolean"),
            Type::Optional(inner) => write!(f, "Optional<{}>", inner),
            Type::Named(name) => write!(f, "{}", name),
        }
    }
}
