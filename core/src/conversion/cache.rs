//! Memoized conversion lookups.
//!
//! Entries are keyed by (profile, result type, header) only, so every
//! expression sharing those three reuses one descriptor. A profile is
//! identified by its name together with the id of its conversion registry. Failed lookups are
//! cached too: a missing conversion is not re-examined until its entry
//! expires or the cache is invalidated.
//!
//! Loaded supplier units are shared between entries with identical supplier
//! source and live only as long as some entry refers to them.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, trace};

use super::probe::validate_conversion;
use super::registry::{Conversion, ConversionFailure};
use crate::api::{CompilationFailed, Error, ExpressionDefinition};
use crate::backend::{Backend, Fingerprint, LoadedUnit, SharedBackend, SourceUnit, SupportHandle};
use crate::types::Type;
use crate::values::Value;

const SUPPLIER_PREFIX: &str = "ConversionSupplier";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionKey {
    pub profile: String,
    pub registry: u64,
    pub result_type: Type,
    pub header: String,
}

impl ConversionKey {
    pub fn of(def: &ExpressionDefinition) -> Self {
        Self {
            profile: def.profile().name().to_string(),
            registry: def.profile().conversions().id(),
            result_type: def.result_type().clone(),
            header: def.header().to_string(),
        }
    }
}

/// A usable conversion, shared by every reader of one cache entry.
#[derive(Debug, Clone)]
pub struct ConversionDescriptor {
    conversion: Conversion,
    supplier: String,
    unit: Fingerprint,
}

impl ConversionDescriptor {
    pub fn convert(&self, text: &str) -> Result<Value, ConversionFailure> {
        self.conversion.apply(text)
    }

    pub fn is_nullable(&self) -> bool {
        self.conversion.is_nullable()
    }

    /// Name of the loaded supplier unit backing this descriptor.
    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn unit(&self) -> &Fingerprint {
        &self.unit
    }
}

/// Why no descriptor exists for a key. Cached like a success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionUnavailable {
    #[error("no conversion to {0} is registered")]
    NotRegistered(Type),

    #[error("conversion supplier failed to compile: {0}")]
    SupplierFailed(CompilationFailed),
}

pub type CachedConversion = Result<Arc<ConversionDescriptor>, ConversionUnavailable>;

#[derive(Debug)]
struct Entry {
    outcome: CachedConversion,
    last_access: Instant,
}

#[derive(Debug)]
pub struct ConversionCache {
    idle: Duration,
    entries: DashMap<ConversionKey, Entry>,
    units: DashMap<Fingerprint, LoadedUnit>,
}

impl ConversionCache {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            entries: DashMap::new(),
            units: DashMap::new(),
        }
    }

    /// Look up the conversion for `def`'s key.
    ///
    /// A hit never takes the compilation lock. A miss blocks on it, then
    /// fills the entry. Only non-diagnosable backend failures are returned
    /// as `Err`; they are not cached.
    pub fn get<B: Backend>(
        &self,
        def: &ExpressionDefinition,
        backend: &SharedBackend<B>,
    ) -> Result<CachedConversion, Error> {
        let key = ConversionKey::of(def);
        if let Some(outcome) = self.hit(&key) {
            trace!(profile = %key.profile, ty = %key.result_type, "conversion cache hit");
            return Ok(outcome);
        }

        backend.with_backend(|backend| {
            // Another caller may have filled the entry while we waited.
            if let Some(outcome) = self.hit(&key) {
                return Ok(outcome);
            }
            self.release_unused_units();
            let outcome = self.fill(def, backend)?;
            debug!(
                profile = %key.profile,
                ty = %key.result_type,
                available = outcome.is_ok(),
                "conversion cache filled"
            );
            self.entries.insert(
                key,
                Entry {
                    outcome: outcome.clone(),
                    last_access: Instant::now(),
                },
            );
            Ok(outcome)
        })
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
        self.units.clear();
    }

    /// Drop entries idle for longer than the configured duration, and the
    /// supplier units only they referred to.
    pub fn purge_expired(&self) {
        self.entries
            .retain(|_, entry| entry.last_access.elapsed() < self.idle);
        self.release_unused_units();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of supplier units currently held.
    pub fn loaded_units(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hit(&self, key: &ConversionKey) -> Option<CachedConversion> {
        {
            let mut entry = self.entries.get_mut(key)?;
            if entry.last_access.elapsed() < self.idle {
                entry.last_access = Instant::now();
                return Some(entry.outcome.clone());
            }
        }
        self.entries
            .remove_if(key, |_, entry| entry.last_access.elapsed() >= self.idle);
        None
    }

    fn release_unused_units(&self) {
        let live: HashSet<Fingerprint> = self
            .entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().ok().map(|d| d.unit.clone()))
            .collect();
        let before = self.units.len();
        self.units.retain(|fingerprint, _| live.contains(fingerprint));
        let released = before.saturating_sub(self.units.len());
        if released > 0 {
            debug!(released, "released unused conversion suppliers");
        }
    }

    /// Must run under the compilation lock.
    fn fill<B: Backend>(
        &self,
        def: &ExpressionDefinition,
        backend: &mut B,
    ) -> Result<CachedConversion, Error> {
        let conversion = match validate_conversion(def) {
            Ok(conversion) => conversion.clone(),
            Err(unavailable) => return Ok(Err(unavailable)),
        };

        match self.load_supplier(def, &conversion, backend) {
            Ok((unit, loaded)) => Ok(Ok(Arc::new(ConversionDescriptor {
                conversion,
                supplier: loaded.name().to_string(),
                unit,
            }))),
            Err(Error::Compilation(failed)) => Ok(Err(ConversionUnavailable::SupplierFailed(failed))),
            Err(other) => Err(other),
        }
    }

    fn load_supplier<B: Backend>(
        &self,
        def: &ExpressionDefinition,
        conversion: &Conversion,
        backend: &mut B,
    ) -> Result<(Fingerprint, LoadedUnit), Error> {
        let profile_object = backend.compile_profile_object(def.profile())?;
        let utils = backend.compile_expression_utils(def.profile(), def.header())?;
        let unit = supplier_unit(def, conversion, &profile_object, &utils);

        if let Some(loaded) = self.units.get(unit.fingerprint()) {
            debug!(unit = unit.name(), "reusing compiled conversion supplier");
            return Ok((unit.fingerprint().clone(), loaded.clone()));
        }

        debug!(unit = unit.name(), "compiling conversion supplier");
        let loaded = backend.compile(&unit)?;
        self.units.insert(unit.fingerprint().clone(), loaded.clone());
        Ok((unit.fingerprint().clone(), loaded))
    }
}

fn supplier_unit(
    def: &ExpressionDefinition,
    conversion: &Conversion,
    profile_object: &SupportHandle,
    utils: &SupportHandle,
) -> SourceUnit {
    let absent = if conversion.is_nullable() { " or absent" } else { "" };
    let source = format!(
        "// generated conversion supplier\n{header}\nuse {profile};\nuse {utils};\nsupply {ty} from literal{absent};\n",
        header = def.header(),
        profile = profile_object.name(),
        utils = utils.name(),
        ty = def.result_type(),
    );
    SourceUnit::new(SUPPLIER_PREFIX, source)
}
