//! 8-lane single-precision vectors.
//!
//! Exactly one backend is compiled, selected by `build.rs`:
//!
//! - `avx2`: one `__m256` register, `_mm256_fmadd_ps`.
//! - `neon`: two `float32x4_t` registers, `vfmaq_f32`.
//! - `fallback`: a plain `[f32; 8]` with a separate multiply and add.
//!
//! Each backend exports an `F32x8` with the same API, re-exported here.

#[cfg(avx2)]
pub mod avx2;

#[cfg(neon)]
pub mod neon;

#[cfg(not(any(avx2, neon)))]
pub mod fallback;

pub mod traits;

pub use traits::{Alignment, SimdFma, SimdLoad, SimdStore};

#[cfg(avx2)]
pub use avx2::f32x8::F32x8;

#[cfg(neon)]
pub use neon::f32x8::F32x8;

#[cfg(not(any(avx2, neon)))]
pub use fallback::F32x8;

/// Name of the compiled vector backend.
pub const fn backend_name() -> &'static str {
    if cfg!(avx2) {
        "avx2"
    } else if cfg!(neon) {
        "neon"
    } else {
        "fallback"
    }
}
