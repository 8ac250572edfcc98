//! # Two-Pole High-Pass Filter (Biquad)
//!
//! Stacked, slightly detuned copies of a bass note turn muddy quickly.
//! An optional high-pass on the wet signal keeps the low end of the
//! chorus clean while the dry path keeps the full bass.
//!
//! ## The Filter Equation
//!
//! ```text
//! y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
//! ```
//!
//! Two poles give a 12 dB/octave slope, twice as steep as a one-pole.
//! With Q fixed at 1/√2 the response is Butterworth: maximally flat in
//! the pass band with no resonant bump at the cutoff.
//!
//! ## Computing the Coefficients
//!
//! Bilinear-transform high-pass (the "Audio EQ Cookbook" form):
//!
//! ```text
//! w0    = 2π * cutoff / sample_rate
//! alpha = sin(w0) / (2 * Q)
//!
//! b0 =  (1 + cos w0) / 2      a0 = 1 + alpha
//! b1 = -(1 + cos w0)          a1 = -2 * cos w0
//! b2 =  (1 + cos w0) / 2      a2 = 1 - alpha
//! ```
//!
//! Everything is divided through by `a0` so the loop needs no division.

use super::sample::Sample;

/// A second-order Butterworth high-pass filter for one channel.
#[derive(Debug, Clone)]
pub struct HighPassFilter<T: Sample> {
    b0: T,
    b1: T,
    b2: T,
    a1: T,
    a2: T,

    // Direct form I history.
    x1: T,
    x2: T,
    y1: T,
    y2: T,
}

impl<T: Sample> Default for HighPassFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> HighPassFilter<T> {
    /// Create a filter initialized to passthrough (`b0 = 1`, all else 0).
    pub fn new() -> Self {
        Self {
            b0: T::one(),
            b1: T::zero(),
            b2: T::zero(),
            a1: T::zero(),
            a2: T::zero(),
            x1: T::zero(),
            x2: T::zero(),
            y1: T::zero(),
            y2: T::zero(),
        }
    }

    /// Recompute the coefficients for `cutoff_hz` at `sample_rate`.
    ///
    /// The cutoff is clamped to `[20 Hz, 0.49 * sample_rate]`; right at
    /// Nyquist `sin(w0)` collapses and the coefficients stop making sense.
    /// Below a 40.8 Hz sample rate the upper bound wins.
    pub fn set_cutoff(&mut self, cutoff_hz: f64, sample_rate: f64) {
        let safe_cutoff = cutoff_hz.max(20.0).min(sample_rate * 0.49);

        let w0 = std::f64::consts::TAU * safe_cutoff / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * std::f64::consts::FRAC_1_SQRT_2);

        let norm = 1.0 / (1.0 + alpha);
        self.b0 = T::cast((1.0 + cos_w0) * 0.5 * norm);
        self.b1 = T::cast(-(1.0 + cos_w0) * norm);
        self.b2 = self.b0;
        self.a1 = T::cast(-2.0 * cos_w0 * norm);
        self.a2 = T::cast((1.0 - alpha) * norm);
    }

    /// Process one sample through the filter.
    #[inline]
    pub fn process(&mut self, input: T) -> T {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter a block in place.
    pub fn process_block(&mut self, block: &mut [T]) {
        for sample in block {
            *sample = self.process(*sample);
        }
    }

    /// Clear the filter history. Coefficients are kept.
    pub fn reset(&mut self) {
        self.x1 = T::zero();
        self.x2 = T::zero();
        self.y1 = T::zero();
        self.y2 = T::zero();
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Peak absolute output over the last half of a run of `input`.
    fn settled_peak(filter: &mut HighPassFilter<f64>, input: impl Fn(usize) -> f64) -> f64 {
        let len = 20_000;
        let mut peak = 0.0_f64;
        for i in 0..len {
            let output = filter.process(input(i));
            if i >= len / 2 {
                peak = peak.max(output.abs());
            }
        }
        peak
    }

    /// Before any cutoff is set the filter is transparent.
    #[test]
    fn test_passthrough_before_configuration() {
        let mut filter = HighPassFilter::<f32>::new();
        for input in [1.0, 0.5, -0.3] {
            assert!((filter.process(input) - input).abs() < 1e-6);
        }
    }

    /// A high-pass filter blocks DC completely once it settles.
    #[test]
    fn test_dc_is_removed() {
        let mut filter = HighPassFilter::new();
        filter.set_cutoff(150.0, 44100.0);

        let peak = settled_peak(&mut filter, |_| 1.0);
        assert!(peak < 1e-6, "DC should be removed, got {peak}");
    }

    /// The highest representable frequency (alternating ±1) passes at
    /// unity gain.
    #[test]
    fn test_nyquist_passes() {
        let mut filter = HighPassFilter::new();
        filter.set_cutoff(150.0, 44100.0);

        let peak = settled_peak(&mut filter, |i| if i % 2 == 0 { 1.0 } else { -1.0 });
        assert!((peak - 1.0).abs() < 1e-3, "Nyquist should pass at unity, got {peak}");
    }

    /// Butterworth: a sine right at the cutoff comes out 3 dB down.
    #[test]
    fn test_cutoff_is_minus_3db() {
        let sample_rate = 48000.0;
        let cutoff = 1000.0;
        let mut filter = HighPassFilter::new();
        filter.set_cutoff(cutoff, sample_rate);

        let peak = settled_peak(&mut filter, |i| {
            (std::f64::consts::TAU * cutoff * i as f64 / sample_rate).sin()
        });
        assert!(
            (peak - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-2,
            "Expected ~0.707 at the cutoff, got {peak}"
        );
    }

    /// Below 40.8 Hz the Nyquist guard is lower than the 20 Hz floor.
    #[test]
    fn test_tiny_sample_rate_stays_finite() {
        let mut filter = HighPassFilter::<f64>::new();
        filter.set_cutoff(150.0, 32.0);

        for i in 0..64 {
            let output = filter.process(if i % 2 == 0 { 1.0 } else { -0.5 });
            assert!(output.is_finite());
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = HighPassFilter::<f32>::new();
        filter.set_cutoff(500.0, 44100.0);
        filter.process(1.0);
        filter.process(-1.0);
        filter.reset();

        assert_eq!(filter.y1, 0.0);
        assert_eq!(filter.x1, 0.0);
        // Silence in, silence out after a reset.
        assert_eq!(filter.process(0.0), 0.0);
    }
}
