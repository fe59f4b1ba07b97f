//! Conversion between the generator's nonzero stream and the solver-side
//! target representations.
//!
//! Every routine walks a slot the same way. Dense slots are a flat copy.
//! Sparse slots zero-fill the whole target region, then scatter (decode)
//! or gather (encode) the contiguous nonzero run in ascending column,
//! then row-within-column, order — the order the generator produces and
//! consumes the stream in. The variants differ only in how a (row, col)
//! pair resolves to a storage address.

use nalgebra::{DMatrix, DMatrixView, DVector};

use crate::sparsity::Sparsity;
use crate::target::{Target, TargetMut};

/// Copy a nonzero stream into `target` (generator layout → solver layout).
///
/// `dense` is the slot's setup-time classification from
/// [`Sparsity::is_effectively_dense`]; it is passed in so the fake-sparse
/// scan stays off the per-call path. An empty descriptor leaves the
/// target untouched.
pub fn decode(sp: Sparsity<'_>, dense: bool, nz: &[f64], target: &mut TargetMut<'_>) {
    match target {
        TargetMut::Slice(out) => decode_slice(sp, dense, nz, out),
        TargetMut::SliceLd { data, ld } => decode_slice_ld(sp, dense, nz, data, *ld),
        TargetMut::Matrix(mat) => decode_matrix(sp, dense, nz, mat, 0, 0),
        TargetMut::MatrixBlock { mat, ai, aj } => decode_matrix(sp, dense, nz, mat, *ai, *aj),
        TargetMut::Vector(vec) => decode_vector(sp, dense, nz, vec, 0),
        TargetMut::VectorSeg { vec, xi } => decode_vector(sp, dense, nz, vec, *xi),
        TargetMut::Ignore => {}
    }
}

/// Gather `target` into a nonzero stream (solver layout → generator
/// layout). Exact inverse of [`decode`] for matching arguments.
pub fn encode(sp: Sparsity<'_>, dense: bool, target: &Target<'_>, nz: &mut [f64]) {
    match target {
        Target::Slice(src) => encode_slice(sp, dense, src, nz),
        Target::SliceLd { data, ld } => encode_slice_ld(sp, dense, data, *ld, nz),
        Target::Matrix(mat) => encode_matrix(sp, dense, mat, 0, 0, nz),
        Target::MatrixBlock { mat, ai, aj } => encode_matrix(sp, dense, mat, *ai, *aj, nz),
        Target::Vector(vec) => encode_vector(sp, dense, vec, 0, nz),
        Target::VectorSeg { vec, xi } => encode_vector(sp, dense, vec, *xi, nz),
        Target::Ignore => {}
    }
}

fn decode_slice(sp: Sparsity<'_>, dense: bool, nz: &[f64], out: &mut [f64]) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    if dense {
        out[..nrow * ncol].copy_from_slice(&nz[..nrow * ncol]);
    } else {
        out[..nrow * ncol].fill(0.0);
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            out[r + c * nrow] = nz[next];
            next += 1;
        });
    }
}

fn encode_slice(sp: Sparsity<'_>, dense: bool, src: &[f64], nz: &mut [f64]) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    if dense {
        nz[..nrow * ncol].copy_from_slice(&src[..nrow * ncol]);
    } else {
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            nz[next] = src[r + c * nrow];
            next += 1;
        });
    }
}

fn decode_slice_ld(sp: Sparsity<'_>, dense: bool, nz: &[f64], data: &mut [f64], ld: usize) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    if dense {
        // The dense window is addressed row-major; iteration order is
        // inverted relative to the column-major stream.
        for i in 0..ncol {
            for j in 0..nrow {
                data[i + j * ld] = nz[i + ncol * j];
            }
        }
    } else {
        for j in 0..ncol {
            for i in 0..nrow {
                data[i + j * ld] = 0.0;
            }
        }
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            data[r + c * ld] = nz[next];
            next += 1;
        });
    }
}

fn encode_slice_ld(sp: Sparsity<'_>, dense: bool, data: &[f64], ld: usize, nz: &mut [f64]) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    if dense {
        for i in 0..ncol {
            for j in 0..nrow {
                nz[i + ncol * j] = data[i + j * ld];
            }
        }
    } else {
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            nz[next] = data[r + c * ld];
            next += 1;
        });
    }
}

fn decode_matrix(
    sp: Sparsity<'_>,
    dense: bool,
    nz: &[f64],
    mat: &mut DMatrix<f64>,
    ai: usize,
    aj: usize,
) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    let mut block = mat.view_mut((ai, aj), (nrow, ncol));
    if dense {
        block.copy_from(&DMatrixView::from_slice(&nz[..nrow * ncol], nrow, ncol));
    } else {
        block.fill(0.0);
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            block[(r, c)] = nz[next];
            next += 1;
        });
    }
}

fn encode_matrix(
    sp: Sparsity<'_>,
    dense: bool,
    mat: &DMatrix<f64>,
    ai: usize,
    aj: usize,
    nz: &mut [f64],
) {
    let Some((nrow, ncol)) = sp.dims() else {
        return;
    };
    let block = mat.view((ai, aj), (nrow, ncol));
    if dense {
        for (dst, src) in nz[..nrow * ncol].iter_mut().zip(block.iter()) {
            *dst = *src;
        }
    } else {
        let mut next = 0;
        sp.for_each_nonzero(|r, c| {
            nz[next] = block[(r, c)];
            next += 1;
        });
    }
}

fn decode_vector(sp: Sparsity<'_>, dense: bool, nz: &[f64], vec: &mut DVector<f64>, xi: usize) {
    assert_single_column(&sp);
    let Some((n, _)) = sp.dims() else {
        return;
    };
    let mut seg = vec.rows_mut(xi, n);
    if dense {
        seg.copy_from_slice(&nz[..n]);
    } else {
        seg.fill(0.0);
        let mut next = 0;
        sp.for_each_nonzero(|r, _| {
            seg[r] = nz[next];
            next += 1;
        });
    }
}

fn encode_vector(sp: Sparsity<'_>, dense: bool, vec: &DVector<f64>, xi: usize, nz: &mut [f64]) {
    assert_single_column(&sp);
    let Some((n, _)) = sp.dims() else {
        return;
    };
    let seg = vec.rows(xi, n);
    if dense {
        for (dst, src) in nz[..n].iter_mut().zip(seg.iter()) {
            *dst = *src;
        }
    } else {
        let mut next = 0;
        sp.for_each_nonzero(|r, _| {
            nz[next] = seg[r];
            next += 1;
        });
    }
}

fn assert_single_column(sp: &Sparsity<'_>) {
    assert!(
        sp.ncol() == 1 || sp.is_empty(),
        "vector conversion requires a single-column descriptor, got {}x{}",
        sp.nrow(),
        sp.ncol(),
    );
}
