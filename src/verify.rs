//! Numerical verification against the reference kernel.
//!
//! Tiled kernels reassociate the reduction, so their results are compared by
//! relative difference, not bit equality.

use rand::Rng;

use crate::layout::{MatrixRole, Strides};

/// Largest relative difference accepted between a kernel and the reference.
pub const ERROR_THRESHOLD: f32 = 1e-4;

/// `2|a - b| / |a + b|`, or `|a - b|` when `a + b == 0`.
#[inline(always)]
pub fn relative_diff(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs();
    let sum = a + b;
    if sum == 0.0 {
        diff
    } else {
        2.0 * diff / sum.abs()
    }
}

/// Maximum [`relative_diff`] over every cell of two `m x n` matrices laid out
/// with `strides`. A NaN difference counts as infinite.
pub fn max_pairwise_diff(
    m: usize,
    n: usize,
    strides: Strides,
    reference: &[f32],
    test: &[f32],
) -> f32 {
    let mut max_diff = 0.0f32;
    for col in 0..n {
        for row in 0..m {
            let offset = strides.offset(row, col);
            let diff = relative_diff(reference[offset], test[offset]);
            if diff.is_nan() {
                return f32::INFINITY;
            }
            max_diff = max_diff.max(diff);
        }
    }
    max_diff
}

/// One element that exceeded the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffEntry {
    pub index: usize,
    pub diff: f32,
    pub expected: f32,
    pub actual: f32,
}

/// Every element of `test` whose difference from `reference` exceeds
/// `threshold` (or is NaN), in index order.
pub fn diff_report(reference: &[f32], test: &[f32], threshold: f32) -> Vec<DiffEntry> {
    reference
        .iter()
        .zip(test)
        .enumerate()
        .filter_map(|(index, (&expected, &actual))| {
            let diff = relative_diff(expected, actual);
            (diff.is_nan() || diff > threshold).then_some(DiffEntry {
                index,
                diff,
                expected,
                actual,
            })
        })
        .collect()
}

/// Pass/fail outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub max_diff: f32,
    pub passed: bool,
}

/// Compares two `m x n` results in the `C` layout against [`ERROR_THRESHOLD`].
///
/// # Example
///
/// ```rust
/// use trmm::verify::verify;
///
/// let verdict = verify(2, 1, &[10.0, 39.0], &[10.0, 39.000_1]);
/// assert!(verdict.passed);
/// ```
pub fn verify(m: usize, n: usize, reference: &[f32], test: &[f32]) -> Verdict {
    let strides = Strides::for_role(m, n, MatrixRole::C);
    let max_diff = max_pairwise_diff(m, n, strides, reference, test);
    let passed = max_diff <= ERROR_THRESHOLD;

    if !passed {
        log::warn!(
            "{}x{} result deviates from reference: max relative diff {:e}",
            m,
            n,
            max_diff
        );
    }

    Verdict { max_diff, passed }
}

/// Floating-point operations in one product: a multiply and an add for each
/// of the `n * m * (m + 1) / 2` nonzero terms.
#[inline(always)]
pub fn triangular_flops(m: usize, n: usize) -> u64 {
    n as u64 * m as u64 * (m as u64 + 1)
}

/// Fills `buf` with values drawn uniformly from `[-1, 1)`.
pub fn fill_random<R: Rng>(buf: &mut [f32], rng: &mut R) {
    for x in buf.iter_mut() {
        *x = rng.random_range(-1.0..1.0);
    }
}
