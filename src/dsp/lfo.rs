//! # Low-Frequency Oscillator (Rotating Vector)
//!
//! Each chorus voice sweeps its delay time with a slow sine wave. Rather
//! than calling `sin()` once per sample, we rotate a 2D vector `(x, y)`
//! around the unit circle by a fixed angle every sample and read off `x`:
//!
//! ```text
//! x' = x - e * y
//! y' = e * x' + y        e = 2 * sin(π * rate / sample_rate)
//! ```
//!
//! Note that the second line uses the *new* `x'`. This "magic circle"
//! form is stable: the vector orbits instead of spiralling in or out.
//! Over millions of samples floating-point rounding still nudges its
//! length away from 1, so we renormalize once per block. Any drift would
//! otherwise show up directly as a change in modulation depth.

use super::sample::Sample;

/// A sine LFO driven by recursive rotation of a unit vector.
#[derive(Debug, Clone)]
pub struct Lfo<T: Sample> {
    x: T,
    y: T,
    /// Rotation coefficient `2 * sin(π * rate / sample_rate)`.
    e: T,
    rate: T,
    sample_rate: T,
}

impl<T: Sample> Default for Lfo<T> {
    fn default() -> Self {
        let mut lfo = Self {
            x: T::one(),
            y: T::zero(),
            e: T::zero(),
            rate: T::one(),
            sample_rate: T::cast(44100.0),
        };
        lfo.update_coefficient();
        lfo
    }
}

impl<T: Sample> Lfo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the sample rate. The phase is kept.
    pub fn set_sample_rate(&mut self, sample_rate: T) {
        self.sample_rate = sample_rate;
        self.update_coefficient();
    }

    /// Change the oscillation frequency in Hz. The phase is kept so a
    /// moving rate knob bends the sweep rather than restarting it.
    pub fn set_rate(&mut self, rate: T) {
        self.rate = rate;
        self.update_coefficient();
    }

    pub fn rate(&self) -> T {
        self.rate
    }

    /// Return the vector to its starting phase `(1, 0)`.
    pub fn reset(&mut self) {
        self.x = T::one();
        self.y = T::zero();
    }

    /// Length of the `(x, y)` vector. Exactly 1 right after
    /// normalization; drifts very slightly between blocks.
    pub fn magnitude(&self) -> T {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Renormalize, then lazily yield the next `len` samples.
    ///
    /// The oscillator only advances as far as the iterator is consumed.
    pub fn process(&mut self, len: usize) -> impl Iterator<Item = T> + '_ {
        self.normalize();
        (0..len).map(move |_| self.tick())
    }

    #[inline]
    fn tick(&mut self) -> T {
        self.x = self.x - self.e * self.y;
        self.y = self.e * self.x + self.y;
        self.x
    }

    fn normalize(&mut self) {
        let magnitude = self.magnitude();
        // A zero vector has no direction to restore; leave it silent.
        if magnitude != T::zero() {
            self.x = self.x / magnitude;
            self.y = self.y / magnitude;
        }
    }

    fn update_coefficient(&mut self) {
        let two = T::one() + T::one();
        self.e = two * (T::PI() * self.rate / self.sample_rate).sin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renormalizing once per 512-sample block keeps the vector on the
    /// unit circle over a long run (about four minutes at 44.1 kHz).
    /// Within a block the rotation wobbles the length by roughly `e / 2`.
    #[test]
    fn test_magnitude_stays_bounded() {
        for rate in [0.1_f32, 1.0, 6.5, 10.0] {
            let mut lfo = Lfo::<f32>::new();
            lfo.set_sample_rate(44100.0);
            lfo.set_rate(rate);

            for _ in 0..20_000 {
                lfo.process(512).for_each(drop);
                let m = lfo.magnitude();
                assert!(
                    (m - 1.0).abs() < 2e-3,
                    "Magnitude drifted to {m} at rate {rate}"
                );
            }
        }
    }

    /// At 1 Hz and a 1000 Hz sample rate, 250 samples is a quarter turn,
    /// so x should pass through zero.
    #[test]
    fn test_produces_sine_at_requested_rate() {
        let mut lfo = Lfo::<f64>::new();
        lfo.set_sample_rate(1000.0);
        lfo.set_rate(1.0);

        let samples: Vec<f64> = lfo.process(1000).collect();

        let max = samples.iter().cloned().fold(f64::MIN, f64::max);
        let min = samples.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max > 0.99 && max < 1.01, "Peak should be ~1, got {max}");
        assert!(min < -0.99 && min > -1.01, "Trough should be ~-1, got {min}");

        // Zero crossings of x: once going down (quarter turn) and once
        // going up (three-quarter turn).
        let crossings = samples
            .windows(2)
            .filter(|w| w[0].signum() != w[1].signum())
            .count();
        assert_eq!(crossings, 2, "One full cycle should cross zero twice");
    }

    #[test]
    fn test_rate_change_keeps_phase() {
        let mut lfo = Lfo::<f64>::new();
        lfo.set_sample_rate(1000.0);
        lfo.set_rate(2.0);
        let before = lfo.process(100).last().unwrap_or_default();

        lfo.set_rate(0.0);
        let after: Vec<f64> = lfo.process(10).collect();

        // With rate 0 the vector stops rotating right where it was (give
        // or take the renormalization at the top of the block).
        assert!((after[0] - before).abs() < 1e-2, "Expected ~{before}, got {}", after[0]);
        for value in &after {
            assert_eq!(*value, after[0], "A stopped LFO should hold its value");
        }
    }

    #[test]
    fn test_reset_restarts_phase() {
        let mut lfo = Lfo::<f32>::new();
        lfo.set_rate(5.0);
        let first: Vec<f32> = lfo.process(64).collect();

        lfo.process(1000).for_each(drop);
        lfo.reset();
        let again: Vec<f32> = lfo.process(64).collect();

        for (a, b) in first.iter().zip(&again) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_vector_skips_normalization() {
        let mut lfo = Lfo::<f32>::new();
        lfo.x = 0.0;
        lfo.y = 0.0;

        let samples: Vec<f32> = lfo.process(16).collect();
        assert!(samples.iter().all(|s| *s == 0.0 && s.is_finite()));
    }
}
