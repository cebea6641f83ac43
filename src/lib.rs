//! # trmm
//!
//! Single-node, single-precision triangular matrix times matrix multiplication:
//! `C = A * B` where `A` is `m x m` lower triangular, `B` and `C` are `m x n` dense.
//!
//! All matrices are stored **column-major** (element `(i, j)` at `j * m + i`).
//! Entries of `A` above the diagonal are never read, so they may hold anything.
//!
//! ```rust
//! use trmm::trmm::{trmm, trmm_reference};
//!
//! // A = [[2, _], [3, 4]], B = [[5], [6]]
//! let a = [2.0f32, 3.0, f32::NAN, 4.0];
//! let b = [5.0f32, 6.0];
//! let mut c = [0.0f32; 2];
//!
//! trmm(2, 1, &a, &b, &mut c);
//! assert_eq!(c, [10.0, 39.0]);
//!
//! let mut oracle = [0.0f32; 2];
//! trmm_reference(2, 1, &a, &b, &mut oracle);
//! assert_eq!(c, oracle);
//! ```

pub mod buffers;
pub mod error;
pub mod layout;
pub mod simd;
pub mod trmm;
pub mod utils;
pub mod verify;

/// Number of f32 lanes processed by one vector fused multiply-add.
pub const LANE_COUNT: usize = 8;

/// Tile edge used by [`trmm::trmm`].
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// Tile edges the kernel is routinely tuned with (small, L2-sized, L3-sized).
pub const OBSERVED_BLOCK_SIZES: [usize; 3] = [8, 128, 1024];

/// Byte alignment of buffers handed out by [`buffers::TrmmBuffers`].
pub const ALIGNMENT: usize = 32;
