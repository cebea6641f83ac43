//! AVX2 SIMD implementations for 256-bit vector operations.
//!
//! # Architecture Requirements
//!
//! - **CPU Support**: Intel Haswell (2013+) or AMD Excavator (2015+), with FMA3
//! - **Target Architecture**: x86 or x86_64
//! - **Runtime Detection**: The build system enables this module only when the
//!   host CPU reports `avx2` and `fma`
//!
//! # Available Types
//!
//! - [`f32x8::F32x8`]: 256-bit vector containing 8 packed single-precision values

pub mod f32x8;
