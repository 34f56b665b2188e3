use thiserror::Error;

// Errors raised while resolving the fields of a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    // A dependent key is already being resolved further up the path.
    #[error("{field} cannot circularly derive itself. Check along this path: {chain}")]
    CircularDependency { field: String, chain: String },

    // A dependent key is neither in the record nor declared in the config.
    #[error("{field} is not declared in the config. Check along this path: {chain}")]
    UnknownField { field: String, chain: String },

    // Malformed JSON config (shape, arity, field names)
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown deriver function: {0}")]
    UnknownFunction(String),

    // Reported by fallible derivers
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, DeriveError>;
