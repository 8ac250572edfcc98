//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks the chorus engine is assembled from:
//!
//! - **`lfo`**: a rotating-vector sine oscillator that sweeps each
//!   voice's delay time.
//!
//! - **`delay_line`**: a multi-channel ring buffer with a fractional,
//!   per-sample delay read through linear interpolation.
//!
//! - **`filter`**: a Butterworth high-pass biquad that keeps the wet
//!   signal's low end clean.
//!
//! - **`mixer`**: the dry/wet blend with linear or equal-power law.
//!
//! - **`ramp`**: linear smoothing for control values.
//!
//! - **`sample`**: the `f32`/`f64` abstraction all of the above share.

pub mod delay_line;
pub mod filter;
pub mod lfo;
pub mod mixer;
pub mod ramp;
pub mod sample;
