//! Minimal adapter for hand-written or fully dense functions.

use gradix_core::{Arena, ArenaLayout, RegionId, Target, TargetMut};

use crate::adapter::ExternalFunctionAdapter;
use crate::error::{Error, Result};

/// Entry point of a generic external function: caller-supplied input
/// pointer array, output pointer array, parameter vector.
pub type GenericFn =
    unsafe extern "C" fn(in_: *const *const f64, out: *mut *mut f64, p: *const f64);

/// Adapter for functions that exchange plain dense buffers.
///
/// No sparsity metadata, no conversion: `evaluate` passes the caller's
/// buffers straight through, together with the adapter-held parameter
/// vector. Inputs and outputs must therefore be `Slice`/`Ignore`
/// handles; anything else is the same configuration-error class as a
/// slot-count mismatch and panics.
#[derive(Debug)]
pub struct GenericAdapter {
    fun: GenericFn,
    np: usize,
    arena: Arena,
    p: RegionId,
    in_ptrs: Vec<*const f64>,
    out_ptrs: Vec<*mut f64>,
}

// SAFETY: the pointer buffers only hold addresses into caller-provided
// handles for the duration of a single `evaluate` call; they are never
// read outside it.
unsafe impl Send for GenericAdapter {}

impl GenericAdapter {
    fn layout(np: usize) -> (ArenaLayout, RegionId) {
        let mut layout = ArenaLayout::new();
        let p = layout.double_region(np);
        (layout, p)
    }

    /// Arena byte requirement for a function with `np` parameters.
    pub fn required_bytes(np: usize) -> usize {
        Self::layout(np).0.required_bytes()
    }

    /// Wrap `fun` with a zero-initialized parameter vector of length `np`.
    pub fn new(fun: GenericFn, np: usize) -> Self {
        let (layout, p) = Self::layout(np);
        Self::assemble(fun, np, p, Arena::allocate(&layout))
    }

    /// Like [`new`](GenericAdapter::new), but placing the parameter
    /// vector in a caller-supplied buffer.
    pub fn from_buffer(fun: GenericFn, np: usize, buf: Vec<u64>) -> Result<Self> {
        let (layout, p) = Self::layout(np);
        let arena = Arena::from_buffer(&layout, buf)?;
        Ok(Self::assemble(fun, np, p, arena))
    }

    fn assemble(fun: GenericFn, np: usize, p: RegionId, arena: Arena) -> Self {
        Self { fun, np, arena, p, in_ptrs: Vec::new(), out_ptrs: Vec::new() }
    }
}

impl ExternalFunctionAdapter for GenericAdapter {
    fn evaluate(&mut self, inputs: &[Target<'_>], outputs: &mut [TargetMut<'_>]) {
        self.in_ptrs.clear();
        for (i, input) in inputs.iter().enumerate() {
            match input {
                Target::Slice(data) => self.in_ptrs.push(data.as_ptr()),
                Target::Ignore => self.in_ptrs.push(std::ptr::null()),
                other => panic!(
                    "generic adapter input {i} must be a dense slice, got {}",
                    other.kind()
                ),
            }
        }
        self.out_ptrs.clear();
        for (i, output) in outputs.iter_mut().enumerate() {
            match output {
                TargetMut::Slice(data) => self.out_ptrs.push(data.as_mut_ptr()),
                TargetMut::Ignore => self.out_ptrs.push(std::ptr::null_mut()),
                other => panic!(
                    "generic adapter output {i} must be a dense slice, got {}",
                    other.kind()
                ),
            }
        }

        let p = self.arena.doubles_ptr(self.p);
        // SAFETY: the pointer arrays mirror the caller's slices one to
        // one, and the parameter region holds `np` doubles.
        unsafe { (self.fun)(self.in_ptrs.as_ptr(), self.out_ptrs.as_mut_ptr(), p) }
    }

    fn parameter_count(&self) -> usize {
        self.np
    }

    fn set_parameters(&mut self, p: &[f64]) -> Result<()> {
        if p.len() != self.np {
            return Err(Error::ParameterCount { expected: self.np, got: p.len() });
        }
        self.arena.doubles_mut(self.p).copy_from_slice(p);
        Ok(())
    }

    fn set_parameters_sparse(&mut self, idx: &[usize], values: &[f64]) -> Result<()> {
        if idx.len() != values.len() {
            return Err(Error::UpdateLength { indices: idx.len(), values: values.len() });
        }
        for &i in idx {
            if i >= self.np {
                return Err(Error::ParameterIndex { index: i, count: self.np });
            }
        }
        let p = self.arena.doubles_mut(self.p);
        for (&i, &v) in idx.iter().zip(values) {
            p[i] = v;
        }
        Ok(())
    }
}
