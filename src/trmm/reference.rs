//! Scalar kernels: the untiled oracle and the scalar run helpers the tiled
//! engine falls back to for short or ragged row runs.

use std::ops::Range;

use crate::layout::at;
use crate::trmm::check_operands;
use crate::trmm::config::Accumulation;

/// Computes `C = A * B` with three nested loops and no tiling.
///
/// The reduction for cell `(i, j)` runs over `p in [0, i]` only, so entries of
/// `A` above the diagonal are never read. Each cell of `C` is written exactly
/// once; its previous contents are irrelevant.
///
/// # Panics
///
/// Panics if `a.len() != m * m` or `b.len()`/`c.len()` differ from `m * n`.
pub fn trmm_reference(m: usize, n: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    check_operands(m, n, a, b, c);

    for j in 0..n {
        for i in 0..m {
            let mut acc = 0.0f32;
            for p in 0..=i {
                acc += a[at(i, p, m)] * b[at(p, j, m)];
            }
            c[at(i, j, m)] = acc;
        }
    }
}

/// `c_run += a_run * b`, element by element.
#[inline(always)]
pub fn axpy(c_run: &mut [f32], a_run: &[f32], b: f32) {
    debug_assert_eq!(c_run.len(), a_run.len());

    for (c, &a) in c_run.iter_mut().zip(a_run) {
        *c += a * b;
    }
}

/// Partial dot product of row `i` of `A` with `b_col` over `reduction`.
#[inline(always)]
pub(crate) fn dot_row(a: &[f32], b_col: &[f32], i: usize, reduction: Range<usize>, m: usize) -> f32 {
    let mut acc = 0.0f32;
    for p in reduction {
        acc += a[at(i, p, m)] * b_col[p];
    }
    acc
}

/// For every row `i` in `rows`, reduces `A[i, p] * b_col[p]` over
/// `reduction` clipped to `p <= i`, then writes the sum into `c_col[i]`.
pub fn reduce_rows(
    rows: Range<usize>,
    reduction: Range<usize>,
    a: &[f32],
    b_col: &[f32],
    c_col: &mut [f32],
    m: usize,
    accumulation: Accumulation,
) {
    for i in rows {
        let clipped = reduction.start..reduction.end.min(i + 1);
        accumulation.apply(&mut c_col[i], dot_row(a, b_col, i, clipped, m));
    }
}
