//! Function adapters bridging generated numerical code to the solver.
//!
//! A symbolic code generator emits native functions with a fixed calling
//! convention and compressed-column shape metadata. This crate wraps
//! them behind one capability trait:
//!
//! - [`GenericAdapter`] — a raw function pointer plus a parameter
//!   vector, for hand-written or fully dense functions that need no
//!   conversion
//! - [`CodecAdapter`] — the full pipeline: exact-size arena, per-slot
//!   conversion through the gradix-core codec, one native invocation
//! - [`ParamCodecAdapter`] — the same, with the trailing argument slot
//!   held as a live parameter vector
//!
//! All adapter working memory lives in a single arena sized before the
//! first call; the evaluation path performs no allocation.

pub mod adapter;
pub mod codec_adapter;
pub mod error;
pub mod ffi;
pub mod generic;

pub use adapter::ExternalFunctionAdapter;
pub use codec_adapter::{CodecAdapter, ParamCodecAdapter};
pub use error::{Error, Result};
pub use ffi::{GeneratedFunction, NativeFn, RawGeneratedFunction, WorkSizes};
pub use generic::{GenericAdapter, GenericFn};
