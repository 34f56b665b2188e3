pub mod errors;
pub mod config;
pub mod derive;
pub mod engine;
pub mod functions; // plugin model for JSON configs
mod path;

use serde_json::Value;
use errors::Result;
use functions::Registry;

pub use config::{Config, FieldSpec, DERIVE_KEY};
pub use derive::{derive, try_derive, Derivation, Input};
pub use engine::{build, compute, resolve, Evaluation, Record};
pub use errors::DeriveError;
pub use path::Path;

/// Convenience: parse a JSON config with the built-in registry and build
/// every field.
pub fn build_json(config: &Value, invocations: u64) -> Result<Record> {
    let config = Config::from_json(config, &Registry::with_builtins())?;
    build(&config, invocations)
}
