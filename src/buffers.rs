//! Owned working buffers for one `(m, n)` problem.
//!
//! This is the allocate / populate / compute / collect / free surface that an
//! outer harness drives. All three matrices live in 32-byte aligned, zeroed
//! storage and use the column-major layout of [`crate::layout`].

use ndarray::{Array2, ArrayView2};

use crate::error::{validation_error, Result};
use crate::layout::{at, buffer_len, MatrixRole};
use crate::trmm::{par_trmm, trmm_with_config, TrmmConfig};
use crate::utils::AlignedBuffer;
use crate::ALIGNMENT;

/// The `A`, `B` and `C` buffers of one problem.
///
/// # Example
///
/// ```rust
/// use trmm::buffers::TrmmBuffers;
/// use trmm::trmm::TrmmConfig;
///
/// let mut buffers = TrmmBuffers::allocate(2, 1).unwrap();
/// buffers.populate(&[2.0, 3.0, 0.0, 4.0], &[5.0, 6.0]).unwrap();
/// buffers.compute(&TrmmConfig::default());
///
/// let mut c = [0.0f32; 2];
/// buffers.collect(&mut c).unwrap();
/// assert_eq!(c, [10.0, 39.0]);
/// ```
#[derive(Debug)]
pub struct TrmmBuffers {
    m: usize,
    n: usize,
    a: AlignedBuffer,
    b: AlignedBuffer,
    c: AlignedBuffer,
}

impl TrmmBuffers {
    /// Allocates zeroed `m * m`, `m * n` and `m * n` buffers.
    ///
    /// # Errors
    ///
    /// - [`TrmmError::ValidationError`](crate::error::TrmmError::ValidationError)
    ///   if `m` or `n` is zero or a buffer length overflows.
    /// - Allocation and layout errors from [`AlignedBuffer::new_zeroed`].
    pub fn allocate(m: usize, n: usize) -> Result<Self> {
        if m == 0 || n == 0 {
            return Err(validation_error(format!(
                "dimensions must be positive, got m = {}, n = {}",
                m, n
            )));
        }

        let a_len = m
            .checked_mul(m)
            .ok_or_else(|| validation_error(format!("m * m overflows for m = {}", m)))?;
        let bc_len = m
            .checked_mul(n)
            .ok_or_else(|| validation_error(format!("m * n overflows for m = {}, n = {}", m, n)))?;

        let buffers = TrmmBuffers {
            m,
            n,
            a: AlignedBuffer::new_zeroed(a_len, ALIGNMENT)?,
            b: AlignedBuffer::new_zeroed(bc_len, ALIGNMENT)?,
            c: AlignedBuffer::new_zeroed(bc_len, ALIGNMENT)?,
        };

        log::debug!("allocated trmm buffers for m = {}, n = {}", m, n);

        Ok(buffers)
    }

    /// `(m, n)` the buffers were allocated for.
    #[inline(always)]
    pub fn dims(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    pub fn a(&self) -> &[f32] {
        &self.a
    }

    pub fn b(&self) -> &[f32] {
        &self.b
    }

    pub fn c(&self) -> &[f32] {
        &self.c
    }

    /// Copies column-major `A` and `B` into the working buffers.
    ///
    /// Values above the diagonal of `a_src` are copied verbatim; no kernel
    /// reads them.
    ///
    /// # Errors
    ///
    /// [`TrmmError::ValidationError`](crate::error::TrmmError::ValidationError)
    /// if a source length does not match its buffer.
    pub fn populate(&mut self, a_src: &[f32], b_src: &[f32]) -> Result<()> {
        self.check_len(MatrixRole::A, a_src.len())?;
        self.check_len(MatrixRole::B, b_src.len())?;

        self.a.copy_from_slice(a_src);
        self.b.copy_from_slice(b_src);
        Ok(())
    }

    /// Copies `A` and `B` from logically indexed arrays (`[row, col]`), in any
    /// memory order.
    ///
    /// # Errors
    ///
    /// [`TrmmError::ValidationError`](crate::error::TrmmError::ValidationError)
    /// if `a` is not `m x m` or `b` is not `m x n`.
    pub fn populate_arrays(&mut self, a: ArrayView2<f32>, b: ArrayView2<f32>) -> Result<()> {
        let m = self.m;
        self.check_shape(MatrixRole::A, a.dim())?;
        self.check_shape(MatrixRole::B, b.dim())?;

        for ((i, j), &value) in a.indexed_iter() {
            self.a[at(i, j, m)] = value;
        }
        for ((i, j), &value) in b.indexed_iter() {
            self.b[at(i, j, m)] = value;
        }
        Ok(())
    }

    /// Runs the kernel on the held buffers, overwriting `C`.
    pub fn compute(&mut self, config: &TrmmConfig) {
        trmm_with_config(self.m, self.n, &self.a, &self.b, &mut self.c, config);
    }

    /// Like [`compute`](Self::compute), with column blocks spread over the
    /// rayon pool.
    pub fn par_compute(&mut self, config: &TrmmConfig) {
        par_trmm(self.m, self.n, &self.a, &self.b, &mut self.c, config);
    }

    /// Copies `C`, column-major, into `dst`.
    ///
    /// # Errors
    ///
    /// [`TrmmError::ValidationError`](crate::error::TrmmError::ValidationError)
    /// if `dst` does not hold exactly `m * n` elements.
    pub fn collect(&self, dst: &mut [f32]) -> Result<()> {
        self.check_len(MatrixRole::C, dst.len())?;
        dst.copy_from_slice(&self.c);
        Ok(())
    }

    /// `C` as an `m x n` array indexed `[row, col]`.
    pub fn collect_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.m, self.n), |(i, j)| self.c[at(i, j, self.m)])
    }

    fn check_len(&self, role: MatrixRole, len: usize) -> Result<()> {
        let expected = buffer_len(self.m, self.n, role);
        if len != expected {
            return Err(validation_error(format!(
                "{:?} needs {} elements, got {}",
                role, expected, len
            )));
        }
        Ok(())
    }

    fn check_shape(&self, role: MatrixRole, shape: (usize, usize)) -> Result<()> {
        let expected = role.shape(self.m, self.n);
        if shape != expected {
            return Err(validation_error(format!(
                "{:?} must be {}x{}, got {}x{}",
                role, expected.0, expected.1, shape.0, shape.1
            )));
        }
        Ok(())
    }
}

impl Drop for TrmmBuffers {
    fn drop(&mut self) {
        log::trace!("releasing trmm buffers for m = {}, n = {}", self.m, self.n);
    }
}
