//! Vector compute path.
//!
//! Row runs are processed in full [`LANE_COUNT`]-wide chunks with one fused
//! multiply-add per chunk. Whatever is left over after the last full chunk is
//! handed to the scalar helpers in [`reference`](super::reference), so no
//! vector load or store ever crosses the end of a run.

use std::ops::Range;

use crate::layout::at;
use crate::simd::{F32x8, SimdFma, SimdLoad, SimdStore};
use crate::trmm::config::Accumulation;
use crate::trmm::reference;
use crate::LANE_COUNT;

/// Inner executor for one row run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExecutor {
    Vector,
    Scalar,
}

impl RunExecutor {
    /// Picks the vector executor when vectorization is enabled and the run
    /// holds at least one full vector.
    #[inline(always)]
    pub fn select(run_len: usize, vectorize: bool) -> Self {
        if vectorize && run_len >= LANE_COUNT {
            RunExecutor::Vector
        } else {
            RunExecutor::Scalar
        }
    }

    /// `c_run += a_run * b`.
    #[inline(always)]
    pub fn axpy(self, c_run: &mut [f32], a_run: &[f32], b: f32) {
        match self {
            RunExecutor::Vector => axpy(c_run, a_run, b),
            RunExecutor::Scalar => reference::axpy(c_run, a_run, b),
        }
    }

    /// Row-wise reductions for one column, see [`reduce_rows`].
    #[allow(clippy::too_many_arguments)]
    #[inline(always)]
    pub fn reduce_rows(
        self,
        rows: Range<usize>,
        reduction: Range<usize>,
        a: &[f32],
        b_col: &[f32],
        c_col: &mut [f32],
        m: usize,
        accumulation: Accumulation,
    ) {
        match self {
            RunExecutor::Vector => reduce_rows(rows, reduction, a, b_col, c_col, m, accumulation),
            RunExecutor::Scalar => {
                reference::reduce_rows(rows, reduction, a, b_col, c_col, m, accumulation)
            }
        }
    }
}

/// `c_run += a_run * b` with `b` broadcast into every lane.
///
/// # Panics
///
/// Debug builds panic if the runs differ in length.
#[inline(always)]
pub fn axpy(c_run: &mut [f32], a_run: &[f32], b: f32) {
    debug_assert_eq!(c_run.len(), a_run.len());

    // SAFETY: `avx2` is only emitted by build.rs for CPUs reporting AVX2 and
    // FMA; the other backends enable no target features.
    unsafe { axpy_lanes(c_run, a_run, b) }
}

/// For every row `i` in `rows`, reduces `A[i, p] * b_col[p]` over
/// `reduction` clipped to `p <= i`, then writes the sum into `c_col[i]`.
///
/// Rows are taken eight at a time. For a chunk starting at row `r`, every lane
/// admits `p <= r`, so that shared prefix of the reduction runs in one vector
/// accumulator. Lane `l` then finishes `p` in `(r, r + l]` on its own, which
/// is where the triangle cuts through the chunk.
#[inline(always)]
pub fn reduce_rows(
    rows: Range<usize>,
    reduction: Range<usize>,
    a: &[f32],
    b_col: &[f32],
    c_col: &mut [f32],
    m: usize,
    accumulation: Accumulation,
) {
    // SAFETY: see `axpy`.
    unsafe { reduce_rows_lanes(rows, reduction, a, b_col, c_col, m, accumulation) }
}

/// # Safety
///
/// With the `avx2` backend the CPU must support AVX2 and FMA.
#[cfg_attr(avx2, target_feature(enable = "avx,avx2,fma"))]
unsafe fn axpy_lanes(c_run: &mut [f32], a_run: &[f32], b: f32) {
    let scale = F32x8::splat(b);
    let mut c_chunks = c_run.chunks_exact_mut(LANE_COUNT);
    let mut a_chunks = a_run.chunks_exact(LANE_COUNT);

    for (c8, a8) in (&mut c_chunks).zip(&mut a_chunks) {
        F32x8::from_slice(c8)
            .fma(F32x8::from_slice(a8), scale)
            .store_to(c8);
    }

    reference::axpy(c_chunks.into_remainder(), a_chunks.remainder(), b);
}

/// # Safety
///
/// With the `avx2` backend the CPU must support AVX2 and FMA.
#[cfg_attr(avx2, target_feature(enable = "avx,avx2,fma"))]
unsafe fn reduce_rows_lanes(
    rows: Range<usize>,
    reduction: Range<usize>,
    a: &[f32],
    b_col: &[f32],
    c_col: &mut [f32],
    m: usize,
    accumulation: Accumulation,
) {
    let mut row = rows.start;
    let mut lanes = [0.0f32; LANE_COUNT];

    while row + LANE_COUNT <= rows.end {
        let shared_end = reduction.end.min(row + 1).max(reduction.start);

        let mut acc = F32x8::zeros();
        for p in reduction.start..shared_end {
            acc = acc.fma(
                F32x8::from_slice(&a[at(row, p, m)..]),
                F32x8::splat(b_col[p]),
            );
        }
        acc.store_to(&mut lanes);

        for (lane, value) in lanes.iter_mut().enumerate() {
            let i = row + lane;
            *value += reference::dot_row(a, b_col, i, shared_end..reduction.end.min(i + 1), m);
        }

        for (dst, &value) in c_col[row..row + LANE_COUNT].iter_mut().zip(&lanes) {
            accumulation.apply(dst, value);
        }

        row += LANE_COUNT;
    }

    reference::reduce_rows(row..rows.end, reduction, a, b_col, c_col, m, accumulation);
}
