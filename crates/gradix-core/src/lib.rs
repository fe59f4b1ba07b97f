//! Core conversion and memory-layout primitives for gradix.
//!
//! This crate provides the pieces shared by every function adapter:
//! - Compressed-column sparsity descriptors as emitted by the code
//!   generator, with nonzero counting and dense classification
//! - The codec converting between the generator's flat nonzero stream
//!   and the solver-side target representations
//! - A two-phase arena that computes an exact byte size for a declared
//!   set of typed regions and then partitions one contiguous buffer

pub mod arena;
pub mod codec;
pub mod error;
pub mod sparsity;
pub mod target;

pub use arena::{Arena, ArenaLayout, RegionId};
pub use error::{Error, Result};
pub use sparsity::Sparsity;
pub use target::{Target, TargetMut};
