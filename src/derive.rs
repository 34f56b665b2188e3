use crate::config::Config;
use crate::engine::{self, Record};
use crate::errors::{DeriveError, Result};
use crate::path::Path;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use tracing::trace;

type DeriverFn = dyn Fn(&Input) -> Result<Value> + Send + Sync;

static NULL: Value = Value::Null;

/// Declare a derived field computed from `keys`.
///
/// Nothing about `keys` is checked here; duplicates, self references and
/// undeclared names only surface once the field is resolved.
///
/// ```
/// use derived_fields::{derive, resolve, Config};
/// use serde_json::json;
///
/// let config = Config::new()
///     .field("a", json!(1))
///     .field("b", derive(|i| json!(i["a"].as_i64().unwrap_or(0) + 1), ["a"]));
/// assert_eq!(resolve(&config, "b").unwrap(), json!(2));
/// ```
pub fn derive<F, I, K>(deriver: F, keys: I) -> Derivation
where
    F: Fn(&Input) -> Value + Send + Sync + 'static,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    try_derive(move |input| Ok(deriver(input)), keys)
}

/// Like [`derive`], for derivers that can fail.
pub fn try_derive<F, I, K>(deriver: F, keys: I) -> Derivation
where
    F: Fn(&Input) -> Result<Value> + Send + Sync + 'static,
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    Derivation {
        deriver: Arc::new(deriver),
        keys: keys.into_iter().map(Into::into).collect(),
    }
}

/// A deriver together with the ordered keys it consumes.
#[derive(Clone)]
pub struct Derivation {
    deriver: Arc<DeriverFn>,
    keys: Vec<String>,
}

impl Derivation {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Gather every dependent key, resolving missing ones through
    /// [`engine::compute`], then run the deriver on the gathered input.
    ///
    /// Keys are visited in declaration order. A key that is absent from
    /// `record` but already on `path` is a cycle and fails the whole pass.
    /// The wrapper keeps no cache of its own; memoization is `record`.
    pub fn call(
        &self,
        record: &mut Record,
        config: &Config,
        invocations: u64,
        path: &Path,
    ) -> Result<Value> {
        let mut input = Input::with_capacity(self.keys.len());
        for key in &self.keys {
            if record.contains_key(key) {
                trace!(field = %key, "memoized");
            } else {
                if path.contains(key) {
                    return Err(DeriveError::CircularDependency {
                        field: key.clone(),
                        chain: path.chain_to(key),
                    });
                }
                trace!(field = %key, path = %path, "resolving dependency");
                engine::compute(key, config, record, invocations, &path.then(key))?;
            }
            let value = record.get(key).cloned().unwrap_or(Value::Null);
            input.insert(key.clone(), value);
        }
        (self.deriver)(&input)
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation").field("keys", &self.keys).finish_non_exhaustive()
    }
}

/// The dependencies handed to a deriver, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    entries: Vec<(String, Value)>,
}

impl Input {
    fn with_capacity(n: usize) -> Self {
        Self { entries: Vec::with_capacity(n) }
    }

    // A repeated key keeps its first position.
    fn insert(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.entries.into_iter().collect::<Map<String, Value>>())
    }
}

impl Index<&str> for Input {
    type Output = Value;

    /// Missing keys read as `null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}
