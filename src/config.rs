use crate::derive::{try_derive, Derivation};
use crate::errors::{DeriveError, Result};
use crate::functions::Registry;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reserved key marking a derived field in a JSON config.
pub const DERIVE_KEY: &str = "$derive";

/// How a single field gets its value.
#[derive(Debug, Clone)]
pub enum FieldSpec {
    Literal(Value),
    Derived(Derivation),
}

impl From<Value> for FieldSpec {
    fn from(v: Value) -> Self {
        FieldSpec::Literal(v)
    }
}

impl From<Derivation> for FieldSpec {
    fn from(d: Derivation) -> Self {
        FieldSpec::Derived(d)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeriveSpec {
    #[serde(rename = "fn")]
    function: String,
    #[serde(default)]
    from: Vec<String>,
    #[serde(default)]
    args: Vec<Value>,
}

impl FieldSpec {
    /// `{"$derive": {"fn": .., "from": [..], "args": [..]}}` is derived,
    /// any other JSON value is a literal.
    pub fn from_json(spec: &Value, registry: &Registry) -> Result<Self> {
        let decl = match spec.as_object() {
            Some(obj) if obj.len() == 1 => match obj.get(DERIVE_KEY) {
                Some(decl) => decl,
                None => return Ok(FieldSpec::Literal(spec.clone())),
            },
            _ => return Ok(FieldSpec::Literal(spec.clone())),
        };
        let decl: DeriveSpec = serde_json::from_value(decl.clone())
            .map_err(|e| DeriveError::InvalidConfig(format!("bad {DERIVE_KEY} block: {e}")))?;
        let function = registry
            .get(&decl.function)
            .ok_or_else(|| DeriveError::UnknownFunction(decl.function.clone()))?;
        if !function.arity().contains(&decl.args.len()) {
            return Err(DeriveError::InvalidConfig(format!(
                "{} takes {:?} args, got {}",
                decl.function,
                function.arity(),
                decl.args.len()
            )));
        }
        let args = decl.args;
        Ok(FieldSpec::Derived(try_derive(
            move |input| function.call(input, &args),
            decl.from,
        )))
    }
}

/// Field name → spec. Read-only for the duration of an evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Config {
    fields: Arc<BTreeMap<String, FieldSpec>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Config::insert`].
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<FieldSpec>) {
        Arc::make_mut(&mut self.fields).insert(name.into(), spec.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a JSON object of field specs, resolving `$derive` blocks
    /// against `registry`.
    pub fn from_json(value: &Value, registry: &Registry) -> Result<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| DeriveError::InvalidConfig("config must be a JSON object".into()))?;
        let mut config = Config::new();
        for (name, spec) in fields {
            config.insert(name.clone(), FieldSpec::from_json(spec, registry)?);
        }
        Ok(config)
    }

    pub fn from_json_str(s: &str, registry: &Registry) -> Result<Self> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| DeriveError::InvalidConfig(format!("not valid JSON: {e}")))?;
        Self::from_json(&value, registry)
    }
}
