//! The capability surface shared by every adapter variant.

use gradix_core::{Target, TargetMut};

use crate::error::Result;

/// One wrapped external function, ready to evaluate.
///
/// The implementor set is closed: [`GenericAdapter`], [`CodecAdapter`]
/// and [`ParamCodecAdapter`]. Callers hold the trait, never a concrete
/// handle, so swapping a generated function for a hand-written one is a
/// construction-site change only.
///
/// [`GenericAdapter`]: crate::GenericAdapter
/// [`CodecAdapter`]: crate::CodecAdapter
/// [`ParamCodecAdapter`]: crate::ParamCodecAdapter
pub trait ExternalFunctionAdapter {
    /// Evaluate the wrapped function.
    ///
    /// `inputs` and `outputs` must match the function's declared slot
    /// counts; a mismatch is a configuration error and panics. Slots
    /// passed as `Ignore` are skipped.
    fn evaluate(&mut self, inputs: &[Target<'_>], outputs: &mut [TargetMut<'_>]);

    /// Number of live parameters (zero for non-parametric adapters).
    fn parameter_count(&self) -> usize;

    /// Replace the whole parameter vector.
    fn set_parameters(&mut self, p: &[f64]) -> Result<()>;

    /// Overwrite individual parameters by logical index.
    ///
    /// The whole update is validated before anything is written; on
    /// error no parameter has changed.
    fn set_parameters_sparse(&mut self, idx: &[usize], values: &[f64]) -> Result<()>;
}
