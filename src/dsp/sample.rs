//! # Sample Type
//!
//! Every DSP block in this crate is generic over the sample type so the
//! same algorithm runs as an `f32` pipeline (what the plugin uses) or an
//! `f64` pipeline (handy for offline rendering and for tests that want
//! to compare against exact reference values).

use std::fmt::Debug;

use num_traits::{Float, FloatConst};

/// A floating-point audio sample.
///
/// `Float` brings the arithmetic and `sin`/`sqrt`/`ceil`; `FloatConst`
/// brings `PI` and `FRAC_1_SQRT_2`. The extra [`Sample::cast`] exists
/// because engine constants and the host's sample rate arrive as `f64`,
/// and `NumCast::from` returns an `Option` we would have to unwrap on
/// the audio thread.
pub trait Sample: Float + FloatConst + Default + Debug + Send + Sync + 'static {
    /// Convert an `f64` constant into this sample type (rounding for `f32`).
    fn cast(value: f64) -> Self;

    /// Widen to `f64` (exact for both implementations).
    fn as_f64(self) -> f64;
}

impl Sample for f32 {
    #[inline]
    fn cast(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Sample for f64 {
    #[inline]
    fn cast(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}
