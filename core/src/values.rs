//! Runtime values produced by compiled expressions, and the context they
//! are evaluated against.

use core::fmt;

use indexmap::IndexMap;

use crate::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent representation of nullable types.
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Whether this value inhabits `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (_, Type::Any) | (_, Type::Named(_)) => true,
            (Value::Null, t) => t.is_nullable(),
            (Value::Str(_), Type::Str)
            | (Value::Int(_), Type::Int)
            | (Value::Float(_), Type::Float)
            | (Value::Bool(_), Type::Bool) => true,
            (v, Type::Optional(inner)) => v.conforms_to(inner),
            _ => false,
        }
    }
}

/// Strings display without quotes; `Null` displays as nothing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Variables and root object an expression is evaluated against.
#[derive(Debug, Clone)]
pub struct EvalContext {
    root: Value,
    variables: IndexMap<String, Value>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext {
    pub fn new() -> Self {
        Self {
            root: Value::Null,
            variables: IndexMap::new(),
        }
    }

    pub fn with_root(mut self, root: Value) -> Self {
        self.root = root;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_conforms_only_to_nullable_types() {
        assert!(Value::Null.conforms_to(&Type::Str));
        assert!(Value::Null.conforms_to(&Type::optional(Type::Int)));
        assert!(!Value::Null.conforms_to(&Type::Int));
        assert!(Value::Int(3).conforms_to(&Type::optional(Type::Int)));
        assert!(!Value::str("3").conforms_to(&Type::Int));
    }

    #[test]
    fn display_is_unquoted() {
        assert_eq!(Value::str("Ann").to_string(), "Ann");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(-4).to_string(), "-4");
    }

    #[test]
    fn context_lookup() {
        let ctx = EvalContext::new()
            .with_root(Value::Int(1))
            .with_variable("name", Value::str("Ann"));
        assert_eq!(ctx.get("name"), Some(&Value::str("Ann")));
        assert_eq!(ctx.get("age"), None);
        assert_eq!(ctx.root(), &Value::Int(1));
    }
}
