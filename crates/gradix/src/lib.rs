//! # gradix
//!
//! Adapter layer between symbolically generated numerical functions and
//! the solver's internal linear algebra.
//!
//! gradix wraps generated functions — Jacobians, residuals, dynamics —
//! behind one capability trait, converting between the generator's
//! compressed-column exchange format and the solver's `nalgebra`-based
//! representations on every call, out of a single exact-size arena.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use gradix::prelude::*;
//!
//! // Bind a generated symbol table and wrap it.
//! let fun = unsafe {
//!     RawGeneratedFunction::new(f, f_work, f_n_in, f_n_out, f_sp_in, f_sp_out)
//! };
//! let mut adapter = CodecAdapter::new(fun);
//!
//! // Evaluate straight into solver-side objects.
//! let mut jac = DMatrix::zeros(nx, nx);
//! adapter.evaluate(&[Target::Vector(&x)], &mut [TargetMut::Matrix(&mut jac)]);
//! ```

// Re-export member crates
pub use gradix_adapter as adapter;
pub use gradix_batch as batch;
pub use gradix_core as core;

// ============================================================================
// Convenient re-exports from gradix_core
// ============================================================================

pub use gradix_core::{
    // Arena
    Arena,
    ArenaLayout,
    // Errors
    Error as CoreError,
    RegionId,
    // Sparsity descriptors
    Sparsity,
    // Conversion targets
    Target,
    TargetMut,
};

// ============================================================================
// Convenient re-exports from gradix_adapter
// ============================================================================

pub use gradix_adapter::{
    // Adapters
    CodecAdapter,
    // Errors
    Error as AdapterError,
    // The capability trait
    ExternalFunctionAdapter,
    // The generated-code boundary
    GeneratedFunction,
    GenericAdapter,
    GenericFn,
    NativeFn,
    ParamCodecAdapter,
    RawGeneratedFunction,
    WorkSizes,
};

// ============================================================================
// Convenient re-exports from gradix_batch
// ============================================================================

pub use gradix_batch::{BatchConfig, BatchSimSolver, SimSolver};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of nalgebra's dynamic vector type.
pub use nalgebra::DVector;

/// Prelude module containing commonly used types and traits.
///
/// ```rust
/// use gradix::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BatchConfig, BatchSimSolver, CodecAdapter, ExternalFunctionAdapter, GeneratedFunction,
        GenericAdapter, ParamCodecAdapter, RawGeneratedFunction, SimSolver, Sparsity, Target,
        TargetMut, WorkSizes,
    };

    // Common external types
    pub use crate::{DMatrix, DVector};
}
