//! ARM NEON SIMD implementations.
//!
//! NEON registers are 128 bits wide, so the 8-lane vector the kernels expect
//! is carried as a pair of `float32x4_t` registers.
//!
//! # Architecture Requirements
//!
//! - **Target Architecture**: AArch64 (NEON is part of the baseline ISA)
//!
//! # Available Types
//!
//! - [`f32x8::F32x8`]: two 128-bit registers holding 8 single-precision values

pub mod f32x8;
