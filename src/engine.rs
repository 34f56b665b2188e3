use crate::config::{Config, FieldSpec};
use crate::errors::{DeriveError, Result};
use crate::path::Path;
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// The object under construction: field name → resolved value.
pub type Record = Map<String, Value>;

/// =========================
/// Field evaluation
/// =========================

/// Resolve `key` from `config` and write the result into `record`.
///
/// `path` is the chain that led here and already ends with `key`.
/// Derived fields recurse back into this function through
/// [`Derivation::call`](crate::Derivation::call).
pub fn compute(
    key: &str,
    config: &Config,
    record: &mut Record,
    invocations: u64,
    path: &Path,
) -> Result<()> {
    let value = match config.get(key) {
        Some(FieldSpec::Literal(v)) => v.clone(),
        Some(FieldSpec::Derived(d)) => d.call(record, config, invocations, path)?,
        None => {
            let chain = if path.is_empty() { key.to_string() } else { path.to_string() };
            return Err(DeriveError::UnknownField { field: key.to_string(), chain });
        }
    };
    debug!(field = key, depth = path.len(), "computed");
    record.insert(key.to_string(), value);
    Ok(())
}

/// =========================
/// Evaluation pass
/// =========================

/// One top-level evaluation: a fresh record resolved against a config.
///
/// Every field is computed at most once per pass. Fields seeded through
/// [`Evaluation::with_overrides`] are never computed at all.
pub struct Evaluation<'c> {
    config: &'c Config,
    record: Record,
    invocations: u64,
}

impl<'c> Evaluation<'c> {
    pub fn new(config: &'c Config, invocations: u64) -> Self {
        Self { config, record: Record::new(), invocations }
    }

    /// Seed the record; seeded fields win over the config.
    pub fn with_overrides(mut self, overrides: Record) -> Self {
        self.record.extend(overrides);
        self
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Resolve a single field, reusing anything already in the record.
    pub fn resolve(&mut self, key: &str) -> Result<&Value> {
        if self.record.contains_key(key) {
            trace!(field = key, "memoized");
        } else {
            compute(key, self.config, &mut self.record, self.invocations, &Path::root(key))?;
        }
        self.record.get(key).ok_or_else(|| DeriveError::UnknownField {
            field: key.to_string(),
            chain: key.to_string(),
        })
    }

    /// Resolve every declared field and hand back the record.
    pub fn finish(mut self) -> Result<Record> {
        let config = self.config;
        for key in config.keys() {
            self.resolve(key)?;
        }
        Ok(self.record)
    }
}

/// Build a full record from `config`.
pub fn build(config: &Config, invocations: u64) -> Result<Record> {
    Evaluation::new(config, invocations).finish()
}

/// Resolve one field of `config` in a fresh pass.
pub fn resolve(config: &Config, key: &str) -> Result<Value> {
    Evaluation::new(config, 0).resolve(key).cloned()
}
