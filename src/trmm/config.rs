//! Kernel configuration: traversal order, tile edge and accumulation policy.

use crate::error::{config_error, Result};
use crate::{DEFAULT_BLOCK_SIZE, LANE_COUNT};

/// Nesting order of the three tile loops, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopOrder {
    /// Columns, then reduction, then rows. `B[p, j]` is broadcast once per
    /// row run of `A` and `C`.
    #[default]
    Jpi,
    /// Columns, then rows, then reduction. Each output cell is reduced to
    /// completion before the next row.
    Jip,
    /// Rows, then reduction, then columns. A run of `A` is reused across all
    /// columns of the tile.
    Ipj,
}

/// How partial products reach `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accumulation {
    /// `C` is zeroed once, then every reduction tile adds into it with `+=`.
    #[default]
    InPlace,
    /// The reduction is not tiled: each cell is summed in a local
    /// accumulator and stored once with `=`. No zero pass is needed.
    LocalReduce,
}

impl Accumulation {
    /// Writes `value` into `dst` under this policy.
    #[inline(always)]
    pub fn apply(self, dst: &mut f32, value: f32) {
        match self {
            Accumulation::InPlace => *dst += value,
            Accumulation::LocalReduce => *dst = value,
        }
    }
}

/// Validated tiling configuration.
///
/// Fields are private so every value in circulation satisfies:
/// - `block_size` is a positive multiple of [`LANE_COUNT`];
/// - [`Accumulation::LocalReduce`] is only paired with [`LoopOrder::Jip`],
///   the one order that finishes a cell's reduction before moving on.
///
/// # Example
///
/// ```rust
/// use trmm::trmm::{Accumulation, LoopOrder, TrmmConfig};
///
/// let config = TrmmConfig::new(LoopOrder::Jip, 12)
///     .unwrap()
///     .with_accumulation(Accumulation::LocalReduce)
///     .unwrap();
///
/// // 12 is rounded up to the next multiple of the vector width.
/// assert_eq!(config.block_size(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrmmConfig {
    order: LoopOrder,
    block_size: usize,
    accumulation: Accumulation,
    vectorize: bool,
}

impl Default for TrmmConfig {
    fn default() -> Self {
        TrmmConfig {
            order: LoopOrder::Jpi,
            block_size: DEFAULT_BLOCK_SIZE,
            accumulation: Accumulation::InPlace,
            vectorize: true,
        }
    }
}

impl TrmmConfig {
    /// In-place, vectorized configuration with the given order and tile edge.
    ///
    /// # Errors
    ///
    /// [`TrmmError::ConfigError`](crate::error::TrmmError::ConfigError) if
    /// `block_size` is zero or cannot be rounded to a lane multiple.
    pub fn new(order: LoopOrder, block_size: usize) -> Result<Self> {
        Ok(TrmmConfig {
            order,
            block_size: round_block_size(block_size)?,
            ..TrmmConfig::default()
        })
    }

    /// Replaces the accumulation policy.
    ///
    /// # Errors
    ///
    /// [`TrmmError::ConfigError`](crate::error::TrmmError::ConfigError) if
    /// `LocalReduce` is requested for an order other than `Jip`.
    pub fn with_accumulation(self, accumulation: Accumulation) -> Result<Self> {
        if accumulation == Accumulation::LocalReduce && self.order != LoopOrder::Jip {
            return Err(config_error(
                "accumulation",
                format!(
                    "LocalReduce needs the reduction innermost (Jip), got {:?}",
                    self.order
                ),
            ));
        }

        Ok(TrmmConfig {
            accumulation,
            ..self
        })
    }

    /// Enables or disables the vector path. Disabled, every run goes through
    /// the scalar executor.
    pub fn with_vectorize(self, vectorize: bool) -> Self {
        TrmmConfig { vectorize, ..self }
    }

    #[inline(always)]
    pub fn order(&self) -> LoopOrder {
        self.order
    }

    /// Tile edge, always a multiple of [`LANE_COUNT`].
    #[inline(always)]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline(always)]
    pub fn accumulation(&self) -> Accumulation {
        self.accumulation
    }

    #[inline(always)]
    pub fn vectorize(&self) -> bool {
        self.vectorize
    }
}

/// Rounds `block_size` up to a multiple of [`LANE_COUNT`].
fn round_block_size(block_size: usize) -> Result<usize> {
    if block_size == 0 {
        return Err(config_error("block_size", "must be positive"));
    }

    let rounded = block_size.checked_next_multiple_of(LANE_COUNT).ok_or_else(|| {
        config_error(
            "block_size",
            format!("{} cannot be rounded to a multiple of {}", block_size, LANE_COUNT),
        )
    })?;

    if rounded != block_size {
        log::debug!(
            "block size {} rounded up to {} (multiple of {} lanes)",
            block_size,
            rounded,
            LANE_COUNT
        );
    }

    Ok(rounded)
}
