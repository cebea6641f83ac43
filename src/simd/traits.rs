//! Lane-level operations every vector backend provides.
//!
//! The kernels are written once against these traits and the backend chosen
//! by the build script (`avx2`, `neon` or `fallback`) supplies `F32x8`.

/// Pointer alignment check for a vector type.
pub trait Alignment<T> {
    /// Returns `true` if `ptr` satisfies the vector's preferred alignment.
    fn is_aligned(ptr: *const T) -> bool;
}

/// Loading a full vector from memory.
pub trait SimdLoad<T> {
    type Output;

    /// Loads the first `LANES` elements of `slice`, picking the aligned or
    /// unaligned instruction from the slice's address.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `LANES` elements.
    fn from_slice(slice: &[T]) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must be aligned for the vector type and point to at least `LANES`
    /// readable elements.
    unsafe fn load_aligned(ptr: *const T) -> Self::Output;

    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` readable elements.
    unsafe fn load_unaligned(ptr: *const T) -> Self::Output;
}

/// Storing a full vector to memory.
pub trait SimdStore<T> {
    /// Writes all lanes into the first `LANES` elements of `slice`.
    ///
    /// # Panics
    ///
    /// Panics if `slice` holds fewer than `LANES` elements.
    fn store_to(&self, slice: &mut [T]);

    /// # Safety
    ///
    /// `ptr` must be aligned for the vector type and point to at least `LANES`
    /// writable elements.
    unsafe fn store_aligned_at(&self, ptr: *mut T);

    /// # Safety
    ///
    /// `ptr` must point to at least `LANES` writable elements.
    unsafe fn store_unaligned_at(&self, ptr: *mut T);
}

/// Register-only arithmetic used by the multiply-accumulate kernels.
pub trait SimdFma<T>: Sized + Copy {
    /// Number of lanes in one vector.
    const LANES: usize;

    /// All lanes set to `0`.
    fn zeros() -> Self;

    /// All lanes set to `value` (broadcast).
    fn splat(value: T) -> Self;

    /// `self + a * b` lane-wise. The hardware backends fuse it into a single
    /// rounding; the portable one rounds the product first.
    fn fma(self, a: Self, b: Self) -> Self;

    /// Lanes copied out into an array-backed vector.
    fn to_vec(self) -> Vec<T>;
}
