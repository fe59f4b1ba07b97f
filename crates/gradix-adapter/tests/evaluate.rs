//! End-to-end evaluation through the raw generated-code boundary.
//!
//! Binds hand-rolled `extern "C"` symbol tables the way a code
//! generator's output would be bound, and drives them through sizing,
//! placement and repeated evaluation against several target kinds.

use std::ffi::c_void;
use std::os::raw::c_int;

use gradix_adapter::{CodecAdapter, ExternalFunctionAdapter, RawGeneratedFunction};
use gradix_core::{Target, TargetMut};
use nalgebra::{DMatrix, DVector};

// f(x) = (J, r): J the 2x2 Jacobian [[2x0, 1], [0, 2x1]] as a sparse
// slot with nonzeros (0,0) (0,1) (1,1), r = [x0^2 + x1, x1^2] dense.
static SP_X: [c_int; 3] = [2, 1, 1];
static SP_J: [c_int; 9] = [2, 2, 0, 0, 1, 3, 0, 0, 1];
static SP_R: [c_int; 3] = [2, 1, 1];

unsafe extern "C" fn jac_res(
    args: *const *const f64,
    res: *mut *mut f64,
    _iw: *mut i32,
    w: *mut f64,
    _mem: *mut c_void,
) -> c_int {
    let x = std::slice::from_raw_parts(*args, 2);
    let j = std::slice::from_raw_parts_mut(*res, 3);
    let r = std::slice::from_raw_parts_mut(*res.add(1), 2);
    // double scratch declared as 2 by the work callback
    let scratch = std::slice::from_raw_parts_mut(w, 2);
    scratch[0] = x[0] * x[0];
    scratch[1] = x[1] * x[1];
    j[0] = 2.0 * x[0]; // (0,0)
    j[1] = 1.0; // (0,1)
    j[2] = 2.0 * x[1]; // (1,1)
    r[0] = scratch[0] + x[1];
    r[1] = scratch[1];
    0
}

unsafe extern "C" fn jac_res_work(
    n_args: *mut c_int,
    n_res: *mut c_int,
    iw: *mut c_int,
    w: *mut c_int,
) -> c_int {
    *n_args = 1;
    *n_res = 2;
    *iw = 0;
    *w = 2;
    0
}

unsafe extern "C" fn jac_res_n_in() -> c_int {
    1
}

unsafe extern "C" fn jac_res_n_out() -> c_int {
    2
}

unsafe extern "C" fn jac_res_sparsity_in(i: c_int) -> *const c_int {
    match i {
        0 => SP_X.as_ptr(),
        _ => std::ptr::null(),
    }
}

unsafe extern "C" fn jac_res_sparsity_out(i: c_int) -> *const c_int {
    match i {
        0 => SP_J.as_ptr(),
        1 => SP_R.as_ptr(),
        _ => std::ptr::null(),
    }
}

fn bind() -> RawGeneratedFunction {
    // SAFETY: the symbol table above follows the generator conventions.
    unsafe {
        RawGeneratedFunction::new(
            jac_res,
            jac_res_work,
            jac_res_n_in,
            jac_res_n_out,
            jac_res_sparsity_in,
            jac_res_sparsity_out,
        )
    }
}

#[test]
fn test_evaluate_into_matrix_and_vector() {
    let mut adapter = CodecAdapter::new(bind());
    let x = DVector::from_vec(vec![3.0, 4.0]);
    let mut jac = DMatrix::from_element(2, 2, f64::NAN);
    let mut r = DVector::zeros(2);

    adapter.evaluate(
        &[Target::Vector(&x)],
        &mut [TargetMut::Matrix(&mut jac), TargetMut::Vector(&mut r)],
    );

    assert_eq!(jac[(0, 0)], 6.0);
    assert_eq!(jac[(0, 1)], 1.0);
    assert_eq!(jac[(1, 1)], 8.0);
    // structural zero was zero-filled, not left as NaN
    assert_eq!(jac[(1, 0)], 0.0);
    assert_eq!(r.as_slice(), &[13.0, 16.0]);
}

#[test]
fn test_evaluate_into_block_of_larger_matrix() {
    let mut adapter = CodecAdapter::new(bind());
    let x = [2.0, 5.0];
    let mut big = DMatrix::from_element(4, 4, 9.0);
    let mut r = [0.0; 2];

    adapter.evaluate(
        &[Target::Slice(&x)],
        &mut [
            TargetMut::MatrixBlock { mat: &mut big, ai: 1, aj: 2 },
            TargetMut::Slice(&mut r),
        ],
    );

    assert_eq!(big[(1, 2)], 4.0); // (0,0) of the Jacobian
    assert_eq!(big[(1, 3)], 1.0); // (0,1)
    assert_eq!(big[(2, 3)], 10.0); // (1,1)
    assert_eq!(big[(2, 2)], 0.0); // structural zero inside the block
    assert_eq!(big[(0, 0)], 9.0); // outside the block, untouched
    assert_eq!(r, [9.0, 25.0]);
}

#[test]
fn test_repeated_evaluation_reuses_the_arena() {
    let mut adapter = CodecAdapter::new(bind());
    let mut jac = [0.0; 4];
    let mut r = [0.0; 2];

    for k in 0..100 {
        let x = [k as f64, 1.0];
        adapter.evaluate(
            &[Target::Slice(&x)],
            &mut [TargetMut::Slice(&mut jac), TargetMut::Slice(&mut r)],
        );
        assert_eq!(jac[0], 2.0 * k as f64);
        assert_eq!(r[0], (k * k) as f64 + 1.0);
    }
}

#[test]
fn test_sizing_is_deterministic_and_sufficient() {
    let a = CodecAdapter::required_bytes(&bind());
    let b = CodecAdapter::required_bytes(&bind());
    assert_eq!(a, b);

    let mut adapter = CodecAdapter::from_buffer(bind(), vec![0u64; a / 8]).unwrap();
    let x = [1.0, 1.0];
    let mut jac = [0.0; 4];
    let mut r = [0.0; 2];
    adapter.evaluate(
        &[Target::Slice(&x)],
        &mut [TargetMut::Slice(&mut jac), TargetMut::Slice(&mut r)],
    );
    assert_eq!(r, [2.0, 1.0]);
}

#[test]
fn test_ignored_outputs_are_skipped() {
    let mut adapter = CodecAdapter::new(bind());
    let x = [1.0, 2.0];
    let mut r = [0.0; 2];
    adapter.evaluate(
        &[Target::Slice(&x)],
        &mut [TargetMut::Ignore, TargetMut::Slice(&mut r)],
    );
    assert_eq!(r, [3.0, 4.0]);
}
