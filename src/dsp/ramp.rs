//! # Linear Ramp
//!
//! A smoothed value that walks from its current value to a new target in
//! a fixed number of equal steps. Jumping a control value instantly
//! (say, the modulation depth) makes the delay read head leap, which is
//! audible as a click. Spreading the change over ~50 ms removes it.
//!
//! ```text
//! value
//!   ▲        target ─────────────
//!   │              ╱
//!   │            ╱   one `step` per sample
//!   │          ╱
//!   │ ───────╱  current
//!   └────────────────────────────► samples
//!            ◄──── ramp_len ────►
//! ```

use super::sample::Sample;

/// Linear interpolation from `current` to `target` over `ramp_len` samples.
#[derive(Debug, Clone)]
pub struct Ramp<T: Sample> {
    current: T,
    target: T,
    step: T,
    /// Samples left before `current` lands on `target`.
    remaining: usize,
    /// Length of a full ramp, set by [`reset`](Self::reset).
    ramp_len: usize,
}

impl<T: Sample> Ramp<T> {
    /// Create a ramp resting at `value` with a zero-length ramp (changes
    /// are immediate until [`reset`](Self::reset) sets a real length).
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            target: value,
            step: T::zero(),
            remaining: 0,
            ramp_len: 0,
        }
    }

    /// Set the ramp length from a duration and snap to the target.
    ///
    /// Any ramp in progress is abandoned: after a reset the value is
    /// already where it was heading.
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        self.ramp_len = (sample_rate * ramp_seconds).floor().max(0.0) as usize;
        self.current = self.target;
        self.step = T::zero();
        self.remaining = 0;
    }

    /// Start ramping toward `target`. Setting the same target again does
    /// not restart the ramp.
    pub fn set_target(&mut self, target: T) {
        if target == self.target {
            return;
        }
        self.target = target;

        if self.ramp_len == 0 {
            self.current = target;
            self.remaining = 0;
            return;
        }

        self.remaining = self.ramp_len;
        self.step = (self.target - self.current) / T::cast(self.ramp_len as f64);
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next(&mut self) -> T {
        if self.remaining == 0 {
            return self.target;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            // Land exactly on the target instead of accumulating rounding.
            self.current = self.target;
        } else {
            self.current = self.current + self.step;
        }
        self.current
    }

    #[cfg(test)]
    pub fn current(&self) -> T {
        self.current
    }

    #[cfg(test)]
    pub fn target(&self) -> T {
        self.target
    }

    #[cfg(test)]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}
