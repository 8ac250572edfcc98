//! # Modulated Delay Line (Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! specified time delay. In a chorus the delay time never sits still: a
//! slow LFO sweeps it back and forth every sample, which bends the pitch
//! of the delayed copy slightly sharp and flat.
//!
//! ## How a Ring Buffer Works
//!
//! Imagine a circular tape loop. A "write head" records incoming audio
//! onto the tape, and a "read head" plays it back from a position further
//! behind on the tape. The distance between the two heads is the delay.
//!
//! Each channel owns its own loop and write head. The delay (the gap
//! between the heads) is shared by all channels of one line, because one
//! chorus voice sweeps both sides of the stereo image together.
//!
//! ## Read Before Write
//!
//! Per sample tick the chorus calls, in this order:
//!
//! 1. [`set_delay`](DelayLine::set_delay) with this sample's delay length
//! 2. [`pop_sample`](DelayLine::pop_sample) to read the delayed value
//! 3. [`push_sample`](DelayLine::push_sample) to store `input + feedback`
//!    and advance the write head
//!
//! Because we read before we write, a delay of `1.0` returns the sample
//! pushed on the *previous* tick. Anything fed back on tick `i` can be
//! heard on tick `i + 1` at the earliest. That one-sample floor is why the
//! delay is clamped to at least one sample.
//!
//! ## Linear Interpolation
//!
//! Swept delay times are almost never whole numbers of samples, so we
//! blend the two stored neighbors:
//!
//! ```text
//! result = sample_a * (1 - frac) + sample_b * frac
//! ```

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;

use super::sample::Sample;

/// One channel's circular tape and write head.
#[derive(Debug, Clone)]
struct Ring<T: Sample> {
    buffer: Vec<T>,
    /// Where the next pushed sample will be stored.
    write_pos: usize,
}

/// A multi-channel ring buffer with a fractional, per-sample delay.
///
/// All storage is allocated in [`new`](Self::new). Changing the delay
/// only moves the read head, so nothing here allocates on the audio thread.
#[derive(Debug, Clone)]
pub struct DelayLine<T: Sample> {
    rings: Vec<Ring<T>>,

    /// Cached ring length, shared by every channel.
    buffer_len: usize,

    /// Whole-sample part of the current delay.
    delay_int: usize,

    /// Fractional part of the current delay, in `[0, 1)`.
    delay_frac: T,
}

impl<T: Sample> DelayLine<T> {
    /// Create a delay line able to hold `capacity` samples per channel.
    ///
    /// The longest usable delay is `capacity - 2` samples: one slot for
    /// the write head and one for the interpolation neighbour.
    pub fn new(capacity: NonZeroUsize, num_channels: usize) -> Self {
        let buffer_len = capacity.get().max(3);
        Self {
            rings: (0..num_channels)
                .map(|_| Ring {
                    buffer: vec![T::zero(); buffer_len],
                    write_pos: 0,
                })
                .collect(),
            buffer_len,
            delay_int: 1,
            delay_frac: T::zero(),
        }
    }

    #[cfg(test)]
    pub fn num_channels(&self) -> usize {
        self.rings.len()
    }

    /// Longest delay, in samples, that [`set_delay`](Self::set_delay) accepts.
    pub fn max_delay(&self) -> usize {
        self.buffer_len - 2
    }

    /// Set the read offset behind the write head, in (fractional) samples.
    ///
    /// Clamped to `[1, max_delay]`.
    pub fn set_delay(&mut self, delay_samples: T) {
        nih_debug_assert!(delay_samples.is_finite());

        let max = T::cast(self.max_delay() as f64);
        let clamped = delay_samples.max(T::one()).min(max);

        // For 441.3 samples: delay_int = 441, delay_frac = 0.3.
        let whole = clamped.floor();
        self.delay_int = whole.to_usize().unwrap_or(1);
        self.delay_frac = clamped - whole;
    }

    /// The current delay in samples, after clamping.
    #[cfg(test)]
    pub fn delay(&self) -> T {
        T::cast(self.delay_int as f64) + self.delay_frac
    }

    /// Read the delayed sample for `channel` at the current delay.
    ///
    /// ```text
    /// index_a = (write_pos + buffer_len - delay_int) % buffer_len
    /// index_b = one slot older than index_a
    /// ```
    #[inline]
    pub fn pop_sample(&self, channel: usize) -> T {
        let ring = &self.rings[channel];

        let index_a = (ring.write_pos + self.buffer_len - self.delay_int) % self.buffer_len;
        let index_b = (index_a + self.buffer_len - 1) % self.buffer_len;

        let sample_a = ring.buffer[index_a];
        let sample_b = ring.buffer[index_b];

        sample_a * (T::one() - self.delay_frac) + sample_b * self.delay_frac
    }

    /// Store `sample` at `channel`'s write head and advance it by one.
    #[inline]
    pub fn push_sample(&mut self, channel: usize, sample: T) {
        let ring = &mut self.rings[channel];
        ring.buffer[ring.write_pos] = sample;
        ring.write_pos = (ring.write_pos + 1) % self.buffer_len;
    }

    /// Zero every channel and rewind the write heads. The buffers keep
    /// their size, and the delay setting is kept.
    pub fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.buffer.fill(T::zero());
            ring.write_pos = 0;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_line(capacity: usize, channels: usize) -> DelayLine<f32> {
        DelayLine::new(NonZeroUsize::new(capacity).unwrap(), channels)
    }

    /// Verify basic push-then-pop at an exact sample position.
    #[test]
    fn test_push_and_pop_exact() {
        let mut dl = delay_line(100, 1);

        dl.push_sample(0, 0.75);
        dl.set_delay(1.0);

        let result = dl.pop_sample(0);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
    }

    /// Verify linear interpolation between two samples.
    #[test]
    fn test_interpolation() {
        let mut dl = delay_line(100, 1);

        // 0.0 then 1.0. Reading 1.5 samples back lands halfway between.
        dl.push_sample(0, 0.0);
        dl.push_sample(0, 1.0);
        dl.set_delay(1.5);

        let result = dl.pop_sample(0);
        assert!((result - 0.5).abs() < 1e-6, "Expected 0.5, got {result}");
    }

    /// Verify the ring wraps correctly past its boundaries.
    #[test]
    fn test_wrapping() {
        let mut dl = delay_line(4, 1);

        // Six pushes into four slots: the oldest two are overwritten.
        for i in 0..6 {
            dl.push_sample(0, i as f32);
        }

        dl.set_delay(1.0);
        assert!((dl.pop_sample(0) - 5.0).abs() < 1e-6);
        dl.set_delay(2.0);
        assert!((dl.pop_sample(0) - 4.0).abs() < 1e-6);
    }

    /// Delays outside `[1, max_delay]` are clamped, never wrapped.
    #[test]
    fn test_delay_is_clamped() {
        let mut dl = delay_line(10, 1);

        dl.set_delay(0.0);
        assert_eq!(dl.delay(), 1.0);

        dl.set_delay(-25.0);
        assert_eq!(dl.delay(), 1.0);

        dl.set_delay(1000.0);
        assert_eq!(dl.delay(), 8.0);
    }

    /// Read-before-write: a sample pushed on this tick is only visible
    /// from the next tick on.
    #[test]
    fn test_pop_before_push_has_one_sample_latency() {
        let mut dl = delay_line(16, 1);
        dl.set_delay(1.0);

        let mut outputs = Vec::new();
        for input in [1.0, 2.0, 3.0] {
            outputs.push(dl.pop_sample(0));
            dl.push_sample(0, input);
        }

        assert_eq!(outputs, vec![0.0, 1.0, 2.0]);
    }

    /// Channels have independent tapes under a shared delay.
    #[test]
    fn test_channels_are_independent() {
        let mut dl = delay_line(16, 2);
        dl.push_sample(0, 0.25);
        dl.push_sample(1, -0.5);
        dl.push_sample(0, 0.0);
        dl.set_delay(2.0);

        assert!((dl.pop_sample(0) - 0.25).abs() < 1e-6);
        // Channel 1 only received one sample, so two back is still silence.
        assert!(dl.pop_sample(1).abs() < 1e-6);
    }

    /// Verify that reset silences every channel but keeps the delay.
    #[test]
    fn test_reset() {
        let mut dl = delay_line(10, 2);

        dl.push_sample(0, 0.5);
        dl.push_sample(1, 0.5);
        dl.set_delay(3.25);
        dl.reset();

        assert!((dl.delay() - 3.25).abs() < 1e-6);
        for delay in [1.0, 2.0, 5.0, 8.0] {
            dl.set_delay(delay);
            assert!(dl.pop_sample(0).abs() < 1e-6);
            assert!(dl.pop_sample(1).abs() < 1e-6);
        }
    }
}
