//! Addressing convention shared by `A`, `B` and `C`.
//!
//! Using the convention that the row stride is the step taken when moving to
//! the next column along a row, and the column stride is the step taken when
//! moving down a column. Every matrix in this crate is column-major:
//! `row_stride = m`, `column_stride = 1`, so
//! `offset(row, col) = row * column_stride + col * row_stride`.

/// Which operand of `C = A * B` a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixRole {
    /// The `m x m` lower-triangular left operand.
    A,
    /// The `m x n` dense right operand.
    B,
    /// The `m x n` dense result.
    C,
}

impl MatrixRole {
    /// Logical `(rows, cols)` of the operand for a given `(m, n)` pair.
    #[inline(always)]
    pub fn shape(self, m: usize, n: usize) -> (usize, usize) {
        match self {
            MatrixRole::A => (m, m),
            MatrixRole::B | MatrixRole::C => (m, n),
        }
    }
}

/// Row and column strides of one matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strides {
    pub row_stride: usize,
    pub column_stride: usize,
}

impl Strides {
    /// Strides for `role` given the problem dimensions.
    ///
    /// All three operands share the leading dimension `m`, which keeps `A`, `B`
    /// and `C` consistent for one `(m, n)` pair.
    #[inline(always)]
    pub fn for_role(m: usize, _n: usize, _role: MatrixRole) -> Self {
        Strides {
            row_stride: m,
            column_stride: 1,
        }
    }

    /// Linear offset of `(row, col)`.
    #[inline(always)]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.column_stride + col * self.row_stride
    }
}

/// Number of `f32` elements a buffer for `role` must hold.
#[inline(always)]
pub fn buffer_len(m: usize, n: usize, role: MatrixRole) -> usize {
    let (rows, cols) = role.shape(m, n);
    rows * cols
}

/// Column-major index of element `(i, j)` with leading dimension `ld`.
#[inline(always)]
pub fn at(i: usize, j: usize, ld: usize) -> usize {
    (j * ld) + i
}
