//! Tiling engine.
//!
//! The `(i, p, j)` iteration space is cut into tiles of edge `block_size` and
//! walked in the configured [`LoopOrder`]. Each tile is classified against the
//! triangle `p <= i`:
//!
//! - **Empty**: every `p` exceeds every `i`. `A` is structurally zero there,
//!   so the tile is skipped.
//! - **Interior**: every `p` is at or below every `i`. Row runs are the full
//!   tile height.
//! - **Diagonal**: the cutoff crosses the tile. For each `p` the row run is
//!   clipped to `[max(i0, p), i1)`.
//!
//! Whether a run goes through the vector or the scalar executor depends only
//! on its clipped length, see [`RunExecutor::select`].

use std::ops::Range;

use crate::layout::at;
use crate::trmm::config::{Accumulation, LoopOrder, TrmmConfig};
use crate::trmm::vector::RunExecutor;

/// One block of the iteration space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Output rows `[i0, i1)`.
    pub rows: Range<usize>,
    /// Reduction indices `[p0, p1)`.
    pub reduction: Range<usize>,
    /// Output columns `[j0, j1)`.
    pub cols: Range<usize>,
}

/// Position of a tile relative to the triangular cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileClass {
    Empty,
    Interior,
    Diagonal,
}

impl Tile {
    pub fn classify(&self) -> TileClass {
        if self.rows.is_empty() || self.reduction.is_empty() || self.reduction.start >= self.rows.end
        {
            TileClass::Empty
        } else if self.reduction.end - 1 <= self.rows.start {
            TileClass::Interior
        } else {
            TileClass::Diagonal
        }
    }

    /// Rows of this tile with a nonzero `A[i, p]`, i.e. `[max(i0, p), i1)`.
    #[inline(always)]
    pub fn rows_for(&self, p: usize) -> Range<usize> {
        if p >= self.rows.end {
            return self.rows.end..self.rows.end;
        }
        self.rows.start.max(p)..self.rows.end
    }
}

/// Loop axis of the iteration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Reduction,
    Col,
}

impl LoopOrder {
    /// Axes from outermost to innermost.
    fn axes(self) -> [Axis; 3] {
        match self {
            LoopOrder::Jpi => [Axis::Col, Axis::Reduction, Axis::Row],
            LoopOrder::Jip => [Axis::Col, Axis::Row, Axis::Reduction],
            LoopOrder::Ipj => [Axis::Row, Axis::Reduction, Axis::Col],
        }
    }
}

/// Block decomposition of one axis.
#[derive(Debug, Clone, Copy)]
struct Blocks {
    extent: usize,
    block: usize,
}

impl Blocks {
    fn count(&self) -> usize {
        self.extent.div_ceil(self.block)
    }

    fn range(&self, index: usize) -> Range<usize> {
        let start = index * self.block;
        start..(start + self.block).min(self.extent)
    }
}

/// Iterator over all tiles in nesting order.
#[derive(Debug, Clone)]
pub struct TileIter {
    axes: [Axis; 3],
    rows: Blocks,
    reduction: Blocks,
    cols: Blocks,
    next: usize,
    total: usize,
}

impl TileIter {
    /// Tiles for an `m x n` output, with rows and columns cut every `block`
    /// and the reduction cut every `reduction_block`.
    ///
    /// Both block sizes must be positive.
    pub fn new(m: usize, n: usize, block: usize, reduction_block: usize, order: LoopOrder) -> Self {
        debug_assert!(block > 0 && reduction_block > 0);

        let rows = Blocks { extent: m, block };
        let reduction = Blocks {
            extent: m,
            block: reduction_block,
        };
        let cols = Blocks { extent: n, block };

        TileIter {
            axes: order.axes(),
            rows,
            reduction,
            cols,
            next: 0,
            total: rows.count() * reduction.count() * cols.count(),
        }
    }

    fn blocks(&self, axis: Axis) -> Blocks {
        match axis {
            Axis::Row => self.rows,
            Axis::Reduction => self.reduction,
            Axis::Col => self.cols,
        }
    }
}

impl Iterator for TileIter {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        if self.next >= self.total {
            return None;
        }

        let [_, middle, inner] = self.axes.map(|axis| self.blocks(axis));
        let flat = self.next;
        self.next += 1;

        let inner_index = flat % inner.count();
        let middle_index = (flat / inner.count()) % middle.count();
        let outer_index = flat / (inner.count() * middle.count());

        let mut tile = Tile {
            rows: 0..0,
            reduction: 0..0,
            cols: 0..0,
        };
        for (axis, index) in self.axes.into_iter().zip([outer_index, middle_index, inner_index]) {
            let range = self.blocks(axis).range(index);
            match axis {
                Axis::Row => tile.rows = range,
                Axis::Reduction => tile.reduction = range,
                Axis::Col => tile.cols = range,
            }
        }

        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileIter {}

/// Tile counts of one kernel invocation, by class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    pub empty: usize,
    pub interior: usize,
    pub diagonal: usize,
}

impl TileStats {
    pub fn total(&self) -> usize {
        self.empty + self.interior + self.diagonal
    }

    pub fn merge(self, other: TileStats) -> TileStats {
        TileStats {
            empty: self.empty + other.empty,
            interior: self.interior + other.interior,
            diagonal: self.diagonal + other.diagonal,
        }
    }
}

/// Runs the tiled kernel over an `m x n` problem.
///
/// With [`Accumulation::InPlace`] all of `c` is zeroed first and every tile
/// adds into it. With [`Accumulation::LocalReduce`] the reduction axis is a
/// single block, so each cell is stored once and no zero pass is made.
///
/// Operand lengths must already have been checked by the caller.
pub fn execute(
    m: usize,
    n: usize,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    config: &TrmmConfig,
) -> TileStats {
    let mut stats = TileStats::default();
    if m == 0 || n == 0 {
        return stats;
    }

    let block = config.block_size();
    let reduction_block = match config.accumulation() {
        Accumulation::InPlace => {
            c.fill(0.0);
            block
        }
        Accumulation::LocalReduce => m,
    };

    for tile in TileIter::new(m, n, block, reduction_block, config.order()) {
        match tile.classify() {
            TileClass::Empty => {
                stats.empty += 1;
                continue;
            }
            TileClass::Interior => stats.interior += 1,
            TileClass::Diagonal => stats.diagonal += 1,
        }

        match config.order() {
            LoopOrder::Jpi => jpi_tile(&tile, m, a, b, c, config.vectorize()),
            LoopOrder::Jip => jip_tile(&tile, m, a, b, c, config),
            LoopOrder::Ipj => ipj_tile(&tile, m, a, b, c, config.vectorize()),
        }
    }

    stats
}

/// For each column and each `p`, one broadcast of `B[p, j]` against the
/// clipped run of column `p` of `A`.
fn jpi_tile(tile: &Tile, m: usize, a: &[f32], b: &[f32], c: &mut [f32], vectorize: bool) {
    for j in tile.cols.clone() {
        for p in tile.reduction.clone() {
            let rows = tile.rows_for(p);
            if rows.is_empty() {
                continue;
            }

            RunExecutor::select(rows.len(), vectorize).axpy(
                &mut c[at(rows.start, j, m)..at(rows.end, j, m)],
                &a[at(rows.start, p, m)..at(rows.end, p, m)],
                b[at(p, j, m)],
            );
        }
    }
}

/// Each cell's share of the tile's reduction is summed before it is written.
fn jip_tile(tile: &Tile, m: usize, a: &[f32], b: &[f32], c: &mut [f32], config: &TrmmConfig) {
    let executor = RunExecutor::select(tile.rows.len(), config.vectorize());

    for j in tile.cols.clone() {
        let column = at(0, j, m)..at(0, j + 1, m);
        executor.reduce_rows(
            tile.rows.clone(),
            tile.reduction.clone(),
            a,
            &b[column.clone()],
            &mut c[column],
            m,
            config.accumulation(),
        );
    }
}

/// The clipped run of column `p` of `A` is reused across every column.
fn ipj_tile(tile: &Tile, m: usize, a: &[f32], b: &[f32], c: &mut [f32], vectorize: bool) {
    for p in tile.reduction.clone() {
        let rows = tile.rows_for(p);
        if rows.is_empty() {
            continue;
        }

        let a_run = &a[at(rows.start, p, m)..at(rows.end, p, m)];
        let executor = RunExecutor::select(rows.len(), vectorize);

        for j in tile.cols.clone() {
            executor.axpy(
                &mut c[at(rows.start, j, m)..at(rows.end, j, m)],
                a_run,
                b[at(p, j, m)],
            );
        }
    }
}
