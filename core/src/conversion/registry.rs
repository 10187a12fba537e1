//! Explicit registry of literal conversions, queried by result type.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use thiserror::Error;

use crate::types::Type;
use crate::values::Value;

/// Why a conversion could not turn literal text into a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    /// Predictable rejection of the input text (e.g. "abc" as an integer).
    /// Reported to the user as a compile error.
    #[error("{kind}: {message}")]
    Invalid { kind: String, message: String },

    /// Anything else. Never downgraded to a compile error.
    #[error("{0}")]
    Fatal(String),
}

impl ConversionFailure {
    pub fn invalid(kind: impl Into<String>, message: impl fmt::Display) -> Self {
        ConversionFailure::Invalid {
            kind: kind.into(),
            message: message.to_string(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ConversionFailure::Fatal(message.into())
    }
}

pub type ConversionFn = dyn Fn(&str) -> Result<Value, ConversionFailure> + Send + Sync;

/// A context-independent function from literal text to a value.
#[derive(Clone)]
pub struct Conversion {
    func: Arc<ConversionFn>,
    nullable: bool,
}

impl Conversion {
    pub fn new(
        nullable: bool,
        func: impl Fn(&str) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            func: Arc::new(func),
            nullable,
        }
    }

    pub fn apply(&self, text: &str) -> Result<Value, ConversionFailure> {
        (self.func)(text)
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("nullable", &self.nullable)
            .finish_non_exhaustive()
    }
}

/// Shared by every unmodified standard registry.
const STANDARD_REGISTRY_ID: u64 = 0;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(STANDARD_REGISTRY_ID + 1);

fn next_registry_id() -> u64 {
    NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Result types a profile knows how to produce from literal text.
///
/// Every registry carries an id naming its contents: clones keep it, and
/// every registration issues a fresh one. Two registries with the same id
/// convert identically.
#[derive(Debug, Clone)]
pub struct ConversionRegistry {
    id: u64,
    conversions: IndexMap<Type, Conversion>,
}

impl Default for ConversionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self {
            id: next_registry_id(),
            conversions: IndexMap::new(),
        }
    }

    /// Integer, Float and Boolean, plus their `Optional` forms.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(Type::Int, parse_int)
            .register(Type::Float, parse_float)
            .register(Type::Bool, parse_bool)
            .register_nullable(Type::optional(Type::Int), parse_int)
            .register_nullable(Type::optional(Type::Float), parse_float)
            .register_nullable(Type::optional(Type::Bool), parse_bool);
        registry.id = STANDARD_REGISTRY_ID;
        registry
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn register(
        &mut self,
        ty: Type,
        func: impl Fn(&str) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    ) -> &mut Self {
        self.conversions.insert(ty, Conversion::new(false, func));
        self.id = next_registry_id();
        self
    }

    /// Register a conversion whose type treats empty text as absent.
    pub fn register_nullable(
        &mut self,
        ty: Type,
        func: impl Fn(&str) -> Result<Value, ConversionFailure> + Send + Sync + 'static,
    ) -> &mut Self {
        self.conversions.insert(ty, Conversion::new(true, func));
        self.id = next_registry_id();
        self
    }

    pub fn get(&self, ty: &Type) -> Option<&Conversion> {
        self.conversions.get(ty)
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.conversions.contains_key(ty)
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.conversions.keys()
    }
}

fn parse_int(text: &str) -> Result<Value, ConversionFailure> {
    text.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| ConversionFailure::invalid("ParseIntError", e))
}

fn parse_float(text: &str) -> Result<Value, ConversionFailure> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|e| ConversionFailure::invalid("ParseFloatError", e))
}

fn parse_bool(text: &str) -> Result<Value, ConversionFailure> {
    text.parse::<bool>()
        .map(Value::Bool)
        .map_err(|e| ConversionFailure::invalid("ParseBoolError", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_conversions() {
        let registry = ConversionRegistry::standard();

        let int = registry.get(&Type::Int).unwrap();
        assert!(!int.is_nullable());
        assert_eq!(int.apply("42"), Ok(Value::Int(42)));

        let flag = registry.get(&Type::optional(Type::Bool)).unwrap();
        assert!(flag.is_nullable());
        assert_eq!(flag.apply("true"), Ok(Value::Bool(true)));

        assert!(!registry.contains(&Type::Str));
        assert!(!registry.contains(&Type::named("Duration")));
    }

    #[test]
    fn rejections_are_predictable() {
        let registry = ConversionRegistry::standard();
        match registry.get(&Type::Int).unwrap().apply("abc") {
            Err(ConversionFailure::Invalid { kind, message }) => {
                assert_eq!(kind, "ParseIntError");
                assert_eq!(message, "invalid digit found in string");
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn registry_id_tracks_contents() {
        let a = ConversionRegistry::standard();
        let b = ConversionRegistry::standard();
        assert_eq!(a.id(), b.id());

        let mut strict = ConversionRegistry::standard();
        strict.register(Type::Int, |_| Err(ConversionFailure::invalid("Strict", "no")));
        assert_ne!(strict.id(), a.id());
        assert_eq!(strict.clone().id(), strict.id());
        assert_ne!(ConversionRegistry::new().id(), ConversionRegistry::new().id());
    }

    #[test]
    fn custom_registration_replaces_existing() {
        let mut registry = ConversionRegistry::standard();
        registry.register(Type::Int, |_| Err(ConversionFailure::fatal("disk on fire")));
        assert_eq!(
            registry.get(&Type::Int).unwrap().apply("1"),
            Err(ConversionFailure::Fatal("disk on fire".to_string()))
        );
    }
}
