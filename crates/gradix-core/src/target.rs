//! Solver-side representations an adapter reads from or writes into.
//!
//! The codec is parameterized over a closed set of target kinds. Each
//! variant carries the handle it addresses, so a conversion request is a
//! single value: there is no separate type tag to fall out of sync with
//! the data pointer, and an unknown kind is unrepresentable.

use nalgebra::{DMatrix, DVector};

/// Read-only conversion source (internal representation → nonzero stream).
#[derive(Debug)]
pub enum Target<'a> {
    /// Column-major dense buffer.
    Slice(&'a [f64]),
    /// Dense window inside a larger column-major matrix. The slice starts
    /// at the window's first element; `ld` is the backing matrix's leading
    /// dimension.
    SliceLd { data: &'a [f64], ld: usize },
    /// Structured dense matrix.
    Matrix(&'a DMatrix<f64>),
    /// Sub-block of a structured dense matrix, anchored at `(ai, aj)`.
    MatrixBlock { mat: &'a DMatrix<f64>, ai: usize, aj: usize },
    /// Structured dense vector.
    Vector(&'a DVector<f64>),
    /// Segment of a structured dense vector, starting at element `xi`.
    VectorSeg { vec: &'a DVector<f64>, xi: usize },
    /// Slot is intentionally not provided for this call.
    Ignore,
}

/// Writable conversion destination (nonzero stream → internal
/// representation). Variants mirror [`Target`].
#[derive(Debug)]
pub enum TargetMut<'a> {
    /// Column-major dense buffer.
    Slice(&'a mut [f64]),
    /// Dense window inside a larger column-major matrix.
    SliceLd { data: &'a mut [f64], ld: usize },
    /// Structured dense matrix.
    Matrix(&'a mut DMatrix<f64>),
    /// Sub-block of a structured dense matrix, anchored at `(ai, aj)`.
    MatrixBlock { mat: &'a mut DMatrix<f64>, ai: usize, aj: usize },
    /// Structured dense vector.
    Vector(&'a mut DVector<f64>),
    /// Segment of a structured dense vector, starting at element `xi`.
    VectorSeg { vec: &'a mut DVector<f64>, xi: usize },
    /// Slot is intentionally not written for this call.
    Ignore,
}

impl Target<'_> {
    /// Short kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Slice(_) => "slice",
            Target::SliceLd { .. } => "slice-ld",
            Target::Matrix(_) => "matrix",
            Target::MatrixBlock { .. } => "matrix-block",
            Target::Vector(_) => "vector",
            Target::VectorSeg { .. } => "vector-seg",
            Target::Ignore => "ignore",
        }
    }
}

impl TargetMut<'_> {
    /// Short kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TargetMut::Slice(_) => "slice",
            TargetMut::SliceLd { .. } => "slice-ld",
            TargetMut::Matrix(_) => "matrix",
            TargetMut::MatrixBlock { .. } => "matrix-block",
            TargetMut::Vector(_) => "vector",
            TargetMut::VectorSeg { .. } => "vector-seg",
            TargetMut::Ignore => "ignore",
        }
    }
}
