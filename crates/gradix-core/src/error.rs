//! Error types for gradix-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("arena buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
