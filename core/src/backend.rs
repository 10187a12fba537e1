//! The general-purpose compiler this layer accelerates, and the lock that
//! serializes every submission to it.

use core::fmt;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::api::{CompileError, Error, Evaluate, ExpressionDefinition, Profile};

/// A full expression compiler. Implementations need not be reentrant: every
/// call is made while holding the [`SharedBackend`] lock.
pub trait Backend: Send {
    /// Compile a generated unit into something loadable.
    fn compile(&mut self, unit: &SourceUnit) -> Result<LoadedUnit, Error>;

    /// Support code for `profile`, referenced by generated units.
    fn compile_profile_object(&mut self, profile: &Profile) -> Result<SupportHandle, Error> {
        Ok(SupportHandle::new(format!("{}Profile", profile.name())))
    }

    /// Utility code for expressions of `profile` compiled under `header`.
    fn compile_expression_utils(
        &mut self,
        profile: &Profile,
        _header: &str,
    ) -> Result<SupportHandle, Error> {
        Ok(SupportHandle::new(format!("{}Utils", profile.name())))
    }

    /// Compile an arbitrary expression. Error spans are relative to
    /// `def.expression_text()`.
    fn compile_expression(&mut self, def: &ExpressionDefinition) -> Result<Arc<dyn Evaluate>, Error>;

    /// Diagnostics for `def` without producing an expression.
    fn get_errors(&mut self, def: &ExpressionDefinition) -> Result<Vec<CompileError>, Error>;

    /// Drop whatever the backend has cached.
    fn reset(&mut self) {}
}

/// A backend behind its compilation lock. Clones share the backend and the
/// lock, so every holder is serialized against every other.
pub struct SharedBackend<B> {
    inner: Arc<Mutex<B>>,
}

impl<B> Clone for SharedBackend<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> SharedBackend<B> {
    pub fn new(backend: B) -> Self {
        Self {
            inner: Arc::new(Mutex::new(backend)),
        }
    }

    /// Run `f` with exclusive access to the backend. Blocks until the lock
    /// is available; a submitted compile always runs to completion.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("compilation lock was poisoned by a panicking holder; recovering");
            poisoned.into_inner()
        });
        f(&mut guard)
    }
}

impl<B> fmt::Debug for SharedBackend<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBackend").finish_non_exhaustive()
    }
}

/// SHA-256 of a generated unit's source, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generated source submitted to [`Backend::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    name: String,
    source: String,
    fingerprint: Fingerprint,
}

impl SourceUnit {
    /// Units with identical source get identical names.
    pub fn new(prefix: &str, source: String) -> Self {
        let fingerprint = Fingerprint::of(&source);
        Self {
            name: format!("{}_{}", prefix, fingerprint.short()),
            source,
            fingerprint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Handle to a unit the backend compiled and loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    name: String,
}

impl LoadedUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Handle to compiled support code (profile object, expression utilities).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportHandle {
    name: String,
}

impl SupportHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
