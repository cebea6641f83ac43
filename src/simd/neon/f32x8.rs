//! NEON 8-lane f32 vector built from two `float32x4_t` halves.

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::simd::{Alignment, SimdFma, SimdLoad, SimdStore};

/// Number of f32 elements in the register pair.
pub(crate) const LANE_COUNT: usize = 8;

/// Number of f32 elements in one NEON register.
const HALF: usize = 4;

/// NEON-alignment of the first element in bytes.
pub(crate) const NEON_ALIGNMENT: usize = 16;

/// 8 packed f32 values in two NEON registers: lanes 0..4 in `lo`, 4..8 in `hi`.
#[derive(Copy, Clone, Debug)]
pub struct F32x8 {
    pub lo: float32x4_t,
    pub hi: float32x4_t,
}

impl Alignment<f32> for F32x8 {
    #[inline(always)]
    fn is_aligned(ptr: *const f32) -> bool {
        (ptr as usize) % NEON_ALIGNMENT == 0
    }
}

impl SimdLoad<f32> for F32x8 {
    type Output = Self;

    #[inline(always)]
    fn from_slice(slice: &[f32]) -> Self::Output {
        let lanes = &slice[..LANE_COUNT];
        // vld1q_f32 has no alignment requirement
        unsafe { Self::load_unaligned(lanes.as_ptr()) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const f32) -> Self::Output {
        Self::load_unaligned(ptr)
    }

    #[inline(always)]
    unsafe fn load_unaligned(ptr: *const f32) -> Self::Output {
        Self {
            lo: vld1q_f32(ptr),
            hi: vld1q_f32(ptr.add(HALF)),
        }
    }
}

impl SimdStore<f32> for F32x8 {
    #[inline(always)]
    fn store_to(&self, slice: &mut [f32]) {
        let lanes = &mut slice[..LANE_COUNT];
        unsafe { self.store_unaligned_at(lanes.as_mut_ptr()) }
    }

    #[inline(always)]
    unsafe fn store_aligned_at(&self, ptr: *mut f32) {
        self.store_unaligned_at(ptr)
    }

    #[inline(always)]
    unsafe fn store_unaligned_at(&self, ptr: *mut f32) {
        vst1q_f32(ptr, self.lo);
        vst1q_f32(ptr.add(HALF), self.hi);
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
        unsafe {
            Self {
                lo: vdupq_n_f32(value),
                hi: vdupq_n_f32(value),
            }
        }
    }

    /// `self + a * b` with `vfmaq_f32` on each half.
    #[inline(always)]
    fn fma(self, a: Self, b: Self) -> Self {
        unsafe {
            Self {
                lo: vfmaq_f32(self.lo, a.lo, b.lo),
                hi: vfmaq_f32(self.hi, a.hi, b.hi),
            }
        }
    }

    #[inline(always)]
    fn to_vec(self) -> Vec<f32> {
        let mut out = vec![0.0f32; LANE_COUNT];
        unsafe { self.store_unaligned_at(out.as_mut_ptr()) };
        out
    }
}
