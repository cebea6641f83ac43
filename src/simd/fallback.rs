//! Portable 8-lane vector for targets without a dedicated backend.
//!
//! The array form is simple enough for the compiler to auto-vectorize when
//! the target has any SIMD unit at all.

use crate::simd::{Alignment, SimdFma, SimdLoad, SimdStore};

/// Number of f32 elements in the vector.
pub(crate) const LANE_COUNT: usize = 8;

/// 8 f32 values held in a plain array.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct F32x8 {
    pub elements: [f32; LANE_COUNT],
}

impl Alignment<f32> for F32x8 {
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % core::mem::align_of::<f32>() == 0
    }
}

impl SimdLoad<f32> for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn from_slice(slice: &[f32]) -> Self::Output {
        let mut elements = [0.0f32; LANE_COUNT];
        elements.copy_from_slice(&slice[..LANE_COUNT]);
        Self { elements }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self::load_unaligned(ptr)
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self::from_slice(std::slice::from_raw_parts(ptr, LANE_COUNT))
    }
}

impl SimdStore<f32> for F32x8 {
    #[inline(always)]
    fn store_to(&self, slice: &mut [f32]) {
        slice[..LANE_COUNT].copy_from_slice(&self.elements);
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        self.store_unaligned_at(ptr)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        self.store_to(std::slice::from_raw_parts_mut(ptr, LANE_COUNT))
    }
}

impl SimdFma<f32> for F32x8 {
    const LANES: usize = LANE_COUNT;

    #[inline(always)]
    fn zeros() -> Self {
        Self::splat(0.0)
    }

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self {
            elements: [value; LANE_COUNT],
        }
    }

    /// `self + a * b`, unfused.
    #[inline(always)]
    fn fma(self, a: Self, b: Self) -> Self {
        let mut elements = self.elements;
        for ((acc, x), y) in elements.iter_mut().zip(a.elements).zip(b.elements) {
            *acc += x * y;
        }
        Self { elements }
    }

    #[inline(always)]
    fn to_vec(self) -> Vec<f32> {
        self.elements.to_vec()
    }
}
