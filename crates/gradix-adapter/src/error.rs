//! Error types for gradix-adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("adapter has no parameters")]
    NotParametric,

    #[error("parameter vector length {got} does not match parameter count {expected}")]
    ParameterCount { expected: usize, got: usize },

    #[error("parameter index {index} out of range for {count} parameters")]
    ParameterIndex { index: usize, count: usize },

    #[error("parameter index {index} addresses a structural zero of the parameter slot")]
    StructuralZero { index: usize },

    #[error("index/value length mismatch: {indices} indices, {values} values")]
    UpdateLength { indices: usize, values: usize },

    #[error(transparent)]
    Core(#[from] gradix_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
