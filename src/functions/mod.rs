use crate::derive::Input;
use crate::errors::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for named derivers that JSON configs can refer to.
///
/// `arity` counts the extra `args` of a `$derive` block, not the
/// dependent keys.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> std::ops::RangeInclusive<usize>;
    fn call(&self, input: &Input, args: &[Value]) -> Result<Value>;
}

/// Thread-safe function registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut map: HashMap<&'static str, Arc<dyn Function>> = HashMap::new();
        map.insert("copy", Arc::new(builtins::CopyOf));
        map.insert("concat", Arc::new(builtins::Concat));
        map.insert("sum", Arc::new(builtins::Sum));
        map.insert("lower", Arc::new(builtins::Lower));
        map.insert("upper", Arc::new(builtins::Upper));
        map.insert("template", Arc::new(builtins::Template));
        Self { inner: Arc::new(map) }
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(f.name(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }
}

/// Strings render bare, everything else as JSON; null renders empty.
fn render(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub mod builtins {
    use super::*;
    use crate::errors::DeriveError;
    use itertools::Itertools;
    use serde_json::Number;

    /// Value of the first dependency.
    pub struct CopyOf;
    impl Function for CopyOf {
        fn name(&self) -> &'static str { "copy" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, input: &Input, _args: &[Value]) -> Result<Value> {
            Ok(input.values().next().cloned().unwrap_or(Value::Null))
        }
    }

    /// Joins every dependency, optionally with a separator.
    pub struct Concat;
    impl Function for Concat {
        fn name(&self) -> &'static str { "concat" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=1 }
        fn call(&self, input: &Input, args: &[Value]) -> Result<Value> {
            let sep = args.first().map(render).unwrap_or_default();
            Ok(Value::String(input.values().map(render).join(&sep)))
        }
    }

    /// Integer total while every input is an i64; overflowing it is an
    /// error. Any float input switches to an f64 total.
    pub struct Sum;
    impl Function for Sum {
        fn name(&self) -> &'static str { "sum" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, input: &Input, _args: &[Value]) -> Result<Value> {
            let mut int_total: i64 = 0;
            let mut float_total = 0.0f64;
            let mut integral = true;
            for (key, v) in input.iter() {
                let n = v
                    .as_number()
                    .ok_or_else(|| DeriveError::Runtime(format!("sum: {key} is not a number: {v}")))?;
                match n.as_i64() {
                    Some(i) if integral => {
                        int_total = int_total
                            .checked_add(i)
                            .ok_or_else(|| DeriveError::Runtime(format!("sum overflow at {key}")))?;
                    }
                    _ => integral = false,
                }
                float_total += n.as_f64().unwrap_or(0.0);
            }
            if integral {
                return Ok(Value::from(int_total));
            }
            Number::from_f64(float_total)
                .map(Value::Number)
                .ok_or_else(|| DeriveError::Runtime(format!("sum: {float_total} is not representable")))
        }
    }

    pub struct Lower;
    impl Function for Lower {
        fn name(&self) -> &'static str { "lower" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, input: &Input, _args: &[Value]) -> Result<Value> {
            let s = input.values().next().cloned().unwrap_or(Value::Null);
            Ok(match s {
                Value::String(t) => Value::String(t.to_lowercase()),
                other => other,
            })
        }
    }

    pub struct Upper;
    impl Function for Upper {
        fn name(&self) -> &'static str { "upper" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 0..=0 }
        fn call(&self, input: &Input, _args: &[Value]) -> Result<Value> {
            let s = input.values().next().cloned().unwrap_or(Value::Null);
            Ok(match s {
                Value::String(t) => Value::String(t.to_uppercase()),
                other => other,
            })
        }
    }

    /// Replaces `{key}` placeholders in the template argument.
    pub struct Template;
    impl Function for Template {
        fn name(&self) -> &'static str { "template" }
        fn arity(&self) -> std::ops::RangeInclusive<usize> { 1..=1 }
        fn call(&self, input: &Input, args: &[Value]) -> Result<Value> {
            let template = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| DeriveError::Runtime("template: argument must be a string".into()))?;
            Ok(Value::String(fill(template, input)))
        }
    }

    // Single left-to-right scan: substituted text is never rescanned, and
    // braces that do not name an input are kept as written.
    fn fill(template: &str, input: &Input) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}').and_then(|close| input.get(&after[..close]).map(|v| (close, v))) {
                Some((close, v)) => {
                    out.push_str(&render(v));
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}
