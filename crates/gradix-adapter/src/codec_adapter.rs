//! Codec-backed adapters for generated functions.
//!
//! Setup queries the function's workspace callback and per-slot
//! sparsity, sizes one arena to the exact byte count, and partitions it:
//! per-slot size/density tables, integer scratch, one nonzero buffer
//! per argument and result slot, double scratch, and (for the
//! parametric variant) the dense parameter vector. Every call then
//! converts inputs into the function's native buffers, invokes it once
//! through the fixed calling convention, and converts results back —
//! with no allocation.

use gradix_core::{codec, Arena, ArenaLayout, RegionId, Sparsity, Target, TargetMut};

use crate::adapter::ExternalFunctionAdapter;
use crate::error::{Error, Result};
use crate::ffi::{GeneratedFunction, WorkSizes};

struct LayoutPlan {
    layout: ArenaLayout,
    arg_size: RegionId,
    arg_dense: RegionId,
    res_size: RegionId,
    res_dense: RegionId,
    iw: RegionId,
    args: Vec<RegionId>,
    res: Vec<RegionId>,
    w: RegionId,
    p: Option<RegionId>,
}

/// Adapter running every slot through the sparsity codec.
#[derive(Debug)]
pub struct CodecAdapter<F: GeneratedFunction> {
    fun: F,
    sizes: WorkSizes,
    n_in: usize,
    n_out: usize,
    arena: Arena,
    arg_size: RegionId,
    arg_dense: RegionId,
    res_size: RegionId,
    res_dense: RegionId,
    iw: RegionId,
    args: Vec<RegionId>,
    res: Vec<RegionId>,
    w: RegionId,
    /// Dense parameter copy, present only for the parametric variant.
    p: Option<RegionId>,
    arg_ptrs: Vec<*const f64>,
    res_ptrs: Vec<*mut f64>,
}

// SAFETY: the pointer buffers only hold addresses into the adapter's own
// arena, rebuilt on every call and never shared.
unsafe impl<F: GeneratedFunction + Send> Send for CodecAdapter<F> {}

impl<F: GeneratedFunction> CodecAdapter<F> {
    /// Arena byte requirement for wrapping `fun`.
    pub fn required_bytes(fun: &F) -> usize {
        Self::plan(fun, None).layout.required_bytes()
    }

    /// Wrap `fun`, allocating its arena.
    pub fn new(fun: F) -> Self {
        let plan = Self::plan(&fun, None);
        let arena = Arena::allocate(&plan.layout);
        Self::assign(fun, plan, arena)
    }

    /// Wrap `fun` inside a caller-supplied buffer of at least
    /// [`required_bytes`](CodecAdapter::required_bytes).
    pub fn from_buffer(fun: F, buf: Vec<u64>) -> Result<Self> {
        let plan = Self::plan(&fun, None);
        let arena = Arena::from_buffer(&plan.layout, buf)?;
        Ok(Self::assign(fun, plan, arena))
    }

    /// Declare the arena regions in the order placement consumes them:
    /// the int tables and scratch, then one double buffer per slot, the
    /// double scratch and, when parametric, the parameter vector.
    fn plan(fun: &F, np: Option<usize>) -> LayoutPlan {
        let sizes = fun.work();
        let mut layout = ArenaLayout::new();
        let arg_size = layout.int_region(sizes.n_args);
        let arg_dense = layout.int_region(sizes.n_args);
        let res_size = layout.int_region(sizes.n_res);
        let res_dense = layout.int_region(sizes.n_res);
        let iw = layout.int_region(sizes.iw);
        let args = (0..sizes.n_args)
            .map(|i| layout.double_region(Sparsity::from_raw(fun.sparsity_in(i)).nnz()))
            .collect();
        let res = (0..sizes.n_res)
            .map(|i| layout.double_region(Sparsity::from_raw(fun.sparsity_out(i)).nnz()))
            .collect();
        let w = layout.double_region(sizes.w);
        let p = np.map(|np| layout.double_region(np));
        LayoutPlan { layout, arg_size, arg_dense, res_size, res_dense, iw, args, res, w, p }
    }

    /// Populate the size/density tables from the descriptors and wire up
    /// the call-time pointer arrays.
    fn assign(fun: F, plan: LayoutPlan, mut arena: Arena) -> Self {
        let sizes = fun.work();
        let n_in = fun.n_in();
        let n_out = fun.n_out();

        for i in 0..sizes.n_args {
            let sp = Sparsity::from_raw(fun.sparsity_in(i));
            arena.ints_mut(plan.arg_size)[i] = sp.nnz() as i32;
            arena.ints_mut(plan.arg_dense)[i] = sp.is_effectively_dense() as i32;
        }
        for i in 0..sizes.n_res {
            let sp = Sparsity::from_raw(fun.sparsity_out(i));
            arena.ints_mut(plan.res_size)[i] = sp.nnz() as i32;
            arena.ints_mut(plan.res_dense)[i] = sp.is_effectively_dense() as i32;
        }

        log::info!(
            "wrapped generated function: {} in / {} out slots, iw {}, w {}, arena {} bytes",
            sizes.n_args,
            sizes.n_res,
            sizes.iw,
            sizes.w,
            arena.used_bytes(),
        );

        Self {
            fun,
            sizes,
            n_in,
            n_out,
            arena,
            arg_size: plan.arg_size,
            arg_dense: plan.arg_dense,
            res_size: plan.res_size,
            res_dense: plan.res_dense,
            iw: plan.iw,
            args: plan.args,
            res: plan.res,
            w: plan.w,
            p: plan.p,
            arg_ptrs: Vec::with_capacity(sizes.n_args),
            res_ptrs: Vec::with_capacity(sizes.n_res),
        }
    }

    /// Workspace sizes reported by the wrapped function at setup.
    pub fn work_sizes(&self) -> WorkSizes {
        self.sizes
    }

    /// Nonzero count of argument slot `i`, as classified at setup.
    pub fn arg_nnz(&self, i: usize) -> usize {
        self.arena.ints(self.arg_size)[i] as usize
    }

    /// Nonzero count of result slot `i`, as classified at setup.
    pub fn res_nnz(&self, i: usize) -> usize {
        self.arena.ints(self.res_size)[i] as usize
    }

    /// Convert the first `n_inputs` input slots, invoke, convert every
    /// output slot back. The parametric adapter passes `n_in - 1` so the
    /// trailing slot keeps the value the parameter setters placed there.
    fn evaluate_slots(
        &mut self,
        inputs: &[Target<'_>],
        n_inputs: usize,
        outputs: &mut [TargetMut<'_>],
    ) {
        assert_eq!(
            inputs.len(),
            self.n_in,
            "generated function takes {} inputs, got {}",
            self.n_in,
            inputs.len(),
        );
        assert_eq!(
            outputs.len(),
            self.n_out,
            "generated function produces {} outputs, got {}",
            self.n_out,
            outputs.len(),
        );

        for (i, input) in inputs.iter().take(n_inputs).enumerate() {
            let sp = Sparsity::from_raw(self.fun.sparsity_in(i));
            let dense = self.arena.ints(self.arg_dense)[i] != 0;
            codec::encode(sp, dense, input, self.arena.doubles_mut(self.args[i]));
        }

        self.invoke();

        for (i, output) in outputs.iter_mut().enumerate() {
            let sp = Sparsity::from_raw(self.fun.sparsity_out(i));
            let dense = self.arena.ints(self.res_dense)[i] != 0;
            codec::decode(sp, dense, self.arena.doubles(self.res[i]), output);
        }
    }

    fn invoke(&mut self) {
        self.arg_ptrs.clear();
        for &id in &self.args {
            self.arg_ptrs.push(self.arena.doubles_ptr(id));
        }
        self.res_ptrs.clear();
        for &id in &self.res {
            self.res_ptrs.push(self.arena.doubles_ptr(id));
        }
        let iw = self.arena.ints_ptr(self.iw);
        let w = self.arena.doubles_ptr(self.w);

        // SAFETY: every pointer addresses a distinct arena region sized
        // at setup from this function's own shape metadata; the call
        // writes only through the result and scratch pointers.
        unsafe { self.fun.call(self.arg_ptrs.as_ptr(), self.res_ptrs.as_mut_ptr(), iw, w) };
    }
}

impl<F: GeneratedFunction> ExternalFunctionAdapter for CodecAdapter<F> {
    fn evaluate(&mut self, inputs: &[Target<'_>], outputs: &mut [TargetMut<'_>]) {
        self.evaluate_slots(inputs, self.n_in, outputs);
    }

    fn parameter_count(&self) -> usize {
        0
    }

    fn set_parameters(&mut self, _p: &[f64]) -> Result<()> {
        Err(Error::NotParametric)
    }

    fn set_parameters_sparse(&mut self, _idx: &[usize], _values: &[f64]) -> Result<()> {
        Err(Error::NotParametric)
    }
}

/// Codec-backed adapter whose trailing argument slot is a live
/// parameter vector.
///
/// The parameter slot is populated exclusively through
/// [`set_parameters`](ExternalFunctionAdapter::set_parameters) and
/// [`set_parameters_sparse`](ExternalFunctionAdapter::set_parameters_sparse);
/// `evaluate` never reads the corresponding input handle. A dense copy
/// of the parameter vector is kept alongside the (possibly compressed)
/// slot buffer so sparse updates can be validated against the logical
/// index space.
#[derive(Debug)]
pub struct ParamCodecAdapter<F: GeneratedFunction> {
    inner: CodecAdapter<F>,
    np: usize,
}

impl<F: GeneratedFunction> ParamCodecAdapter<F> {
    /// Arena byte requirement for wrapping `fun` with `np` parameters.
    pub fn required_bytes(fun: &F, np: usize) -> usize {
        CodecAdapter::<F>::plan(fun, Some(np)).layout.required_bytes()
    }

    /// Wrap `fun`, allocating its arena. Parameters start at zero.
    pub fn new(fun: F, np: usize) -> Self {
        let plan = CodecAdapter::<F>::plan(&fun, Some(np));
        let arena = Arena::allocate(&plan.layout);
        Self::check_param_slot(CodecAdapter::assign(fun, plan, arena), np)
    }

    /// Wrap `fun` inside a caller-supplied buffer.
    pub fn from_buffer(fun: F, np: usize, buf: Vec<u64>) -> Result<Self> {
        let plan = CodecAdapter::<F>::plan(&fun, Some(np));
        let arena = Arena::from_buffer(&plan.layout, buf)?;
        Ok(Self::check_param_slot(CodecAdapter::assign(fun, plan, arena), np))
    }

    fn check_param_slot(inner: CodecAdapter<F>, np: usize) -> Self {
        assert!(inner.n_in >= 1, "parametric function needs a trailing parameter slot");
        let sp = Sparsity::from_raw(inner.fun.sparsity_in(inner.n_in - 1));
        assert!(
            (sp.is_empty() && np == 0) || (sp.nrow() == np as i32 && sp.ncol() == 1),
            "parameter count {} does not match the trailing slot descriptor ({}x{})",
            np,
            sp.nrow(),
            sp.ncol(),
        );
        Self { inner, np }
    }

    fn param_slot(&self) -> usize {
        self.inner.n_in - 1
    }
}

impl<F: GeneratedFunction> ExternalFunctionAdapter for ParamCodecAdapter<F> {
    fn evaluate(&mut self, inputs: &[Target<'_>], outputs: &mut [TargetMut<'_>]) {
        let n_inputs = self.inner.n_in - 1;
        self.inner.evaluate_slots(inputs, n_inputs, outputs);
    }

    fn parameter_count(&self) -> usize {
        self.np
    }

    fn set_parameters(&mut self, p: &[f64]) -> Result<()> {
        if p.len() != self.np {
            return Err(Error::ParameterCount { expected: self.np, got: p.len() });
        }
        let slot = self.param_slot();
        let inner = &mut self.inner;
        let p_region = inner.p.expect("parametric adapter always reserves a parameter region");
        inner.arena.doubles_mut(p_region).copy_from_slice(p);

        let sp = Sparsity::from_raw(inner.fun.sparsity_in(slot));
        let dense = inner.arena.ints(inner.arg_dense)[slot] != 0;
        codec::encode(sp, dense, &Target::Slice(p), inner.arena.doubles_mut(inner.args[slot]));
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

        let slot = self.param_slot();
        let inner = &mut self.inner;
        let sp = Sparsity::from_raw(inner.fun.sparsity_in(slot));
        let dense = inner.arena.ints(inner.arg_dense)[slot] != 0;

        if !dense {
            // Validate the whole update against the compressed layout
            // before writing anything.
            for &i in idx {
                compressed_position(&sp, i)?;
            }
        }

        let p_region = inner.p.expect("parametric adapter always reserves a parameter region");
        let p_dense = inner.arena.doubles_mut(p_region);
        for (&i, &v) in idx.iter().zip(values) {
            p_dense[i] = v;
        }

        let slot_buf = inner.arena.doubles_mut(inner.args[slot]);
        if dense {
            for (&i, &v) in idx.iter().zip(values) {
                slot_buf[i] = v;
            }
        } else {
            for (&i, &v) in idx.iter().zip(values) {
                let pos = compressed_position(&sp, i).expect("validated above");
                slot_buf[pos] = v;
            }
        }
        Ok(())
    }
}

/// Resolve a logical parameter index to its position in the compressed
/// single-column run, or report the structural zero.
///
/// The nonzero stream of a single-column descriptor is ordered by
/// ascending row, so the position within the run is found by binary
/// search over the row indices.
fn compressed_position(sp: &Sparsity<'_>, index: usize) -> Result<usize> {
    let col_ptr = sp.col_ptr();
    let run = &sp.row_idx()[col_ptr[0] as usize..col_ptr[1] as usize];
    run.binary_search(&(index as i32))
        .map_err(|_| Error::StructuralZero { index })
}
