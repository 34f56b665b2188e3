use itertools::Itertools;
use std::fmt;

/// Chain of field names currently being resolved, outermost first.
///
/// A path is never mutated in place: descending into a dependency produces
/// an extended copy with [`Path::then`], so returning from a recursive call
/// needs no backtracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    keys: Vec<String>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path for a top-level request of `key`.
    pub fn root(key: &str) -> Self {
        Self { keys: vec![key.to_string()] }
    }

    /// Copy of this path with `key` appended.
    pub fn then(&self, key: &str) -> Self {
        let mut keys = Vec::with_capacity(self.keys.len() + 1);
        keys.extend(self.keys.iter().cloned());
        keys.push(key.to_string());
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Renders `path[0]->path[1]->...->key`.
    pub fn chain_to(&self, key: &str) -> String {
        self.keys
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(key))
            .join("->")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keys.iter().join("->"))
    }
}
