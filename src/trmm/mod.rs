//! Triangular matrix times matrix kernels.
//!
//! `C = A * B` with `A` an `m x m` lower-triangular matrix and `B`, `C` dense
//! `m x n`, all column-major with leading dimension `m`. Only `p <= i` terms
//! of each reduction are evaluated; the output itself is dense, so every cell
//! of `C` is computed.
//!
//! - [`trmm_reference`]: untiled scalar oracle.
//! - [`trmm`]: tiled kernel with [`TrmmConfig::default`].
//! - [`trmm_with_config`]: tiled kernel with an explicit configuration.
//! - [`par_trmm`]: column blocks of `C` distributed over the rayon pool.

use rayon::prelude::*;

pub mod config;
pub mod reference;
pub mod tiling;
pub mod vector;

pub use config::{Accumulation, LoopOrder, TrmmConfig};
pub use reference::trmm_reference;
pub use tiling::TileStats;

/// Asserts operand lengths for an `(m, n)` problem.
#[inline(always)]
pub(crate) fn check_operands(m: usize, n: usize, a: &[f32], b: &[f32], c: &[f32]) {
    assert_eq!(a.len(), m * m, "A must hold m * m elements");
    assert_eq!(b.len(), m * n, "B must hold m * n elements");
    assert_eq!(c.len(), m * n, "C must hold m * n elements");
}

/// Computes `C = A * B` with the default configuration: JPI order, tiles of
/// [`DEFAULT_BLOCK_SIZE`](crate::DEFAULT_BLOCK_SIZE), in-place accumulation
/// and the vector path enabled.
///
/// Every cell of `c` is overwritten. Entries of `a` above the diagonal are
/// never read.
///
/// # Panics
///
/// Panics if `a.len() != m * m` or `b.len()`/`c.len()` differ from `m * n`.
pub fn trmm(m: usize, n: usize, a: &[f32], b: &[f32], c: &mut [f32]) {
    trmm_with_config(m, n, a, b, c, &TrmmConfig::default());
}

/// Computes `C = A * B` with the given tiling configuration.
///
/// # Panics
///
/// Panics if `a.len() != m * m` or `b.len()`/`c.len()` differ from `m * n`.
pub fn trmm_with_config(
    m: usize,
    n: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    config: &TrmmConfig,
) {
    check_operands(m, n, a, b, c);
    if m == 0 || n == 0 {
        return;
    }

    log::trace!(
        "trmm {}x{} on {} with {:?}",
        m,
        n,
        crate::simd::backend_name(),
        config
    );

    let stats = tiling::execute(m, n, a, b, c, config);
    log_stats(m, n, &stats);
}

/// Computes `C = A * B` with column blocks of `C` spread over the rayon pool.
///
/// `C` is split into blocks of `config.block_size()` columns. Each task runs
/// the single-threaded kernel on its own block, including that block's zero
/// pass, so no two tasks ever write the same cell and no combine step is
/// needed. The result matches [`trmm_with_config`] with the same
/// configuration.
///
/// # Panics
///
/// Panics if `a.len() != m * m` or `b.len()`/`c.len()` differ from `m * n`.
pub fn par_trmm(m: usize, n: usize, a: &[f32], b: &[f32], c: &mut [f32], config: &TrmmConfig) {
    check_operands(m, n, a, b, c);
    if m == 0 || n == 0 {
        return;
    }

    // At most all of C, so the product never exceeds `c.len()`.
    let chunk = m * config.block_size().min(n);

    let stats = c
        .par_chunks_mut(chunk)
        .zip(b.par_chunks(chunk))
        .map(|(c_block, b_block)| {
            let ncols = c_block.len() / m;
            tiling::execute(m, ncols, a, b_block, c_block, config)
        })
        .reduce(TileStats::default, TileStats::merge);

    log_stats(m, n, &stats);
}

fn log_stats(m: usize, n: usize, stats: &TileStats) {
    log::debug!(
        "trmm {}x{}: {} tiles ({} interior, {} diagonal, {} skipped)",
        m,
        n,
        stats.total(),
        stats.interior,
        stats.diagonal,
        stats.empty
    );
}
