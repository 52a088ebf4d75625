//! Boilerplate error definitions.
use thiserror::Error;

/// A type alias for std's Result with the Error as our error type.
pub type Result<T, E = AbiError> = std::result::Result<T, E>;

/// Errors raised while converting raw ABI json into [`AbiEntry`](crate::abi::AbiEntry) values.
#[derive(Error, Debug)]
pub enum AbiError {
    /// The abi is not a json array of items
    #[error("expected the abi to be a json array, found {0}")]
    NotAnArray(&'static str),

    /// A function, event or error item without a `name`
    #[error("{kind} item at position {position} has no `name`")]
    MissingName { kind: String, position: usize },

    /// A function, event or error item without `inputs`
    #[error("{kind} `{name}` has no `inputs`")]
    MissingInputs { kind: String, name: String },

    /// A parameter declared as `tuple` without `components`
    #[error("tuple parameter `{0}` has no `components`")]
    MissingComponents(String),

    #[error("tuple parameter `{name}` has an invalid array suffix `{suffix}`")]
    InvalidArraySuffix { name: String, suffix: String },

    /// Failed to deserialize an item
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}
