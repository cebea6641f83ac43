//! AVX2 8-lane f32 SIMD vector implementation.
//!
//! `F32x8` wraps a single `__m256` register. The multiply-accumulate is
//! `_mm256_fmadd_ps`, so the build script only selects this backend when the
//! CPU reports both AVX2 and FMA.
//!
//! # Supported Operations
//!
//! - `from_slice()`, `load_aligned()`, `load_unaligned()`: loading
//! - `store_to()`, `store_aligned_at()`, `store_unaligned_at()`: storing
//! - `zeros()`, `splat()`, `fma()`: register arithmetic

#[cfg(target_arch = "x86")]
use std::arch::x86::*;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::{Alignment, SimdFma, SimdLoad, SimdStore};

/// Number of f32 elements that fit in an AVX2 256-bit vector.
pub(crate) const LANE_COUNT: usize = 8;

/// AVX2 SIMD vector containing 8 packed f32 values.
///
/// # Usage
///
/// ```rust
/// # #[cfg(all(target_arch = "x86_64", target_feature = "avx2", target_feature = "fma"))]
/// # {
/// use trmm::simd::{F32x8, SimdFma, SimdLoad, SimdStore};
///
/// let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
/// let c = [1.0f32; 8];
/// let mut out = [0.0f32; 8];
///
/// // out = c + a * 2
/// F32x8::from_slice(&c)
///     .fma(F32x8::from_slice(&a), F32x8::splat(2.0))
///     .store_to(&mut out);
/// assert_eq!(out, [3.0, 5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 17.0]);
/// # }
/// ```
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    /// AVX2 256-bit vector register containing 8 packed f32 values
    pub elements: __m256,
}

impl Alignment<f32> for F32x8 {
    /// Checks if a pointer is 32-byte aligned, the requirement of
    /// `_mm256_load_ps` and `_mm256_store_ps`.
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        let ptr = ptr as usize;

        ptr % core::mem::align_of::<__m256>() == 0
    }
}

impl SimdLoad<f32> for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn from_slice(slice: &[f32]) -> Self::Output {
        let lanes = &slice[..LANE_COUNT];

        match F32x8::is_aligned(lanes.as_ptr()) {
            true => unsafe { Self::load_aligned(lanes.as_ptr()) },
            false => unsafe { Self::load_unaligned(lanes.as_ptr()) },
        }
    }

    /// Loads 8 elements from 32-byte aligned memory with `_mm256_load_ps`.
    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_load_ps(ptr),
        }
    }

    /// Loads 8 elements from unaligned memory with `_mm256_loadu_ps`.
    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            elements: _mm256_loadu_ps(ptr),
        }
    }
}

impl SimdStore<f32> for F32x8 {
    #[inline(always)]
    fn store_to(&self, slice: &mut [f32]) {
        let lanes = &mut slice[..LANE_COUNT];

        match F32x8::is_aligned(lanes.as_ptr()) {
            true => unsafe { self.store_aligned_at(lanes.as_mut_ptr()) },
            false => unsafe { self.store_unaligned_at(lanes.as_mut_ptr()) },
        }
    }

    /// Stores 8 elements to 32-byte aligned memory with `_mm256_store_ps`.
    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        _mm256_store_ps(ptr, self.elements)
    }

    /// Stores 8 elements to unaligned memory with `_mm256_storeu_ps`.
    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        _mm256_storeu_ps(ptr, self.elements)
    }
}

impl SimdFma<f32> for F32x8 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    fn zeros() -> Self {
        Self {
            elements: unsafe { _mm256_setzero_ps() },
        }
    }

    /// Broadcasts `value` into every lane with `_mm256_set1_ps`.
    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self {
            elements: unsafe { _mm256_set1_ps(value) },
        }
    }

    /// `self + a * b` with `_mm256_fmadd_ps` (single rounding).
    #[inline(always)]
    fn fma(self, a: Self, b: Self) -> Self {
        Self {
            elements: unsafe { _mm256_fmadd_ps(a.elements, b.elements, self.elements) },
        }
    }

    #[inline(always)]
    fn to_vec(self) -> Vec<f32> {
        let mut out = vec![0.0f32; LANE_COUNT];
        unsafe { self.store_unaligned_at(out.as_mut_ptr()) };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::alloc::{alloc, dealloc, Layout};

    /// Helper function to create aligned memory for testing
    #[inline(always)]
    fn alloc_aligned(size: usize, align: usize) -> *mut f32 {
        let layout = Layout::from_size_align(size * std::mem::size_of::<f32>(), align).unwrap();
        unsafe { alloc(layout) as *mut f32 }
    }

    /// Helper function to deallocate aligned memory for testing
    #[inline(always)]
    fn dealloc_aligned(ptr: *mut f32, size: usize, align: usize) {
        let layout = Layout::from_size_align(size * std::mem::size_of::<f32>(), align).unwrap();
        unsafe { dealloc(ptr as *mut u8, layout) };
    }

    mod alignment_tests {
        use super::*;

        #[test]
        fn test_is_aligned_32_byte_boundary() {
            let aligned_ptr = alloc_aligned(8, 32);
            assert!(F32x8::is_aligned(aligned_ptr));
            dealloc_aligned(aligned_ptr, 8, 32);
        }

        #[test]
        fn test_is_not_aligned() {
            let aligned_ptr = alloc_aligned(9, 32);
            let unaligned_ptr = unsafe { aligned_ptr.add(1) };
            assert!(!F32x8::is_aligned(unaligned_ptr));
            dealloc_aligned(aligned_ptr, 9, 32);
        }
    }

    mod load_store_tests {
        use super::*;

        #[test]
        fn test_aligned_roundtrip() {
            let original = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];

            let aligned_src = alloc_aligned(8, 32);
            let aligned_dst = alloc_aligned(8, 32);

            unsafe {
                std::ptr::copy_nonoverlapping(original.as_ptr(), aligned_src, 8);
            }

            let vec = unsafe { F32x8::load_aligned(aligned_src) };
            unsafe { vec.store_aligned_at(aligned_dst) };

            let result = unsafe { std::slice::from_raw_parts(aligned_dst, 8) };
            assert_eq!(result, &original);

            dealloc_aligned(aligned_src, 8, 32);
            dealloc_aligned(aligned_dst, 8, 32);
        }

        #[test]
        fn test_unaligned_slice_roundtrip() {
            let data: Vec<f32> = (0..9).map(|x| x as f32).collect();
            let vec = F32x8::from_slice(&data[1..]);

            let mut out = vec![0.0f32; 9];
            vec.store_to(&mut out[1..]);

            assert_eq!(&out[1..], &data[1..]);
            assert_eq!(out[0], 0.0);
        }

        #[test]
        fn test_special_float_values() {
            let special = [
                f32::INFINITY,
                f32::NEG_INFINITY,
                f32::NAN,
                0.0,
                -0.0,
                f32::MIN,
                f32::MAX,
                f32::EPSILON,
            ];

            let result = F32x8::from_slice(&special).to_vec();

            assert_eq!(result[0], f32::INFINITY);
            assert_eq!(result[1], f32::NEG_INFINITY);
            assert!(result[2].is_nan());
            assert_eq!(result[4], -0.0);
            assert_eq!(result[6], f32::MAX);
        }
    }

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn test_fma_single_rounding() {
            // 1 + e*e is not representable after rounding the product first
            let e = f32::EPSILON;
            let a = F32x8::splat(1.0 + e);
            let c = F32x8::splat(-1.0);
            let fused = c.fma(a, a).to_vec();
            let expected = (1.0f32 + e).mul_add(1.0 + e, -1.0);
            assert!(fused.iter().all(|&x| x == expected));
        }

        #[test]
        fn test_fma_accumulates() {
            let mut acc = F32x8::zeros();
            let a = F32x8::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
            for _ in 0..3 {
                acc = acc.fma(a, F32x8::splat(0.5));
            }
            assert_eq!(acc.to_vec(), vec![1.5, 3.0, 4.5, 6.0, 7.5, 9.0, 10.5, 12.0]);
        }
    }
}
