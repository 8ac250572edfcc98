//! # Chorus Voice
//!
//! One voice is an LFO plus the delay line it sweeps. Four of them run
//! side by side at slightly different rates; the ear hears the detuned,
//! drifting copies as one thick "ensemble" sound.
//!
//! ## From LFO Sample to Delay Length
//!
//! ```text
//! delay_ms      = max(1, MAX_MODULATION_MS * lfo * depth_scale + centre_ms)
//! delay_samples = delay_ms * sample_rate / 1000
//! ```
//!
//! `depth_scale` is the smoothed `depth * 0.2`, so at full depth the read
//! head swings ±4 ms around the centre delay. The 1 ms floor keeps the
//! read head from ever reaching (or passing) the write head.

use std::num::NonZeroUsize;

use crate::dsp::delay_line::DelayLine;
use crate::dsp::lfo::Lfo;
use crate::dsp::sample::Sample;

/// Furthest (in ms) modulation can push the delay away from its centre
/// before depth scaling.
pub const MAX_MODULATION_MS: f64 = 20.0;

/// Shortest delay modulation may produce, in ms.
pub const MIN_DELAY_MS: f64 = 1.0;

/// Map one raw LFO sample to a delay length in samples.
///
/// `ms_to_samples` is `sample_rate / 1000`.
#[inline]
pub fn modulated_delay_samples<T: Sample>(
    lfo_sample: T,
    depth_scale: T,
    centre_delay_ms: T,
    ms_to_samples: T,
) -> T {
    let swing = T::cast(MAX_MODULATION_MS) * lfo_sample * depth_scale;
    let delay_ms = (swing + centre_delay_ms).max(T::cast(MIN_DELAY_MS));
    delay_ms * ms_to_samples
}

/// How much of voice `voice` lands in output `channel`.
///
/// Voices alternate between channels: a voice gives `spread` to its
/// favoured channel (`voice % num_channels`) and `1 - spread` to the
/// other, so at `spread = 1` the voices are hard-panned and at `0.5`
/// every voice sits in the middle.
///
/// In mono every voice favours the only channel, so the wet level is
/// `2 * spread` times a stereo channel's: about 1.9x the input at the
/// default spread of 0.95.
#[inline]
pub fn stereo_weight<T: Sample>(voice: usize, channel: usize, num_channels: usize, spread: T) -> T {
    if voice % num_channels == channel {
        spread
    } else {
        T::one() - spread
    }
}

/// Everything one voice owns: its oscillator, its delay line, and the
/// per-sample delay lengths computed for the current block.
#[derive(Debug, Clone)]
pub struct VoiceState<T: Sample> {
    pub lfo: Lfo<T>,
    pub delay: DelayLine<T>,
    pub delay_times: Vec<T>,
}

impl<T: Sample> Default for VoiceState<T> {
    /// An unprepared voice: no channels, no block buffer.
    fn default() -> Self {
        Self {
            lfo: Lfo::new(),
            delay: DelayLine::new(NonZeroUsize::MIN, 0),
            delay_times: Vec::new(),
        }
    }
}

impl<T: Sample> VoiceState<T> {
    /// Allocate this voice's buffers. Only called from prepare.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        capacity: NonZeroUsize,
        max_block_size: usize,
        num_channels: usize,
    ) {
        self.lfo.set_sample_rate(T::cast(sample_rate));
        self.delay = DelayLine::new(capacity, num_channels);
        self.delay_times = vec![T::zero(); max_block_size];
    }

    /// Fill `delay_times[..depth_scale.len()]` from the LFO.
    pub fn compute_delay_times(&mut self, depth_scale: &[T], centre_delay_ms: T, ms_to_samples: T) {
        let len = depth_scale.len();
        let modulation = self.lfo.process(len);

        for ((slot, lfo_sample), depth) in self.delay_times[..len]
            .iter_mut()
            .zip(modulation)
            .zip(depth_scale)
        {
            *slot = modulated_delay_samples(lfo_sample, *depth, centre_delay_ms, ms_to_samples);
        }
    }

    pub fn reset(&mut self) {
        self.lfo.reset();
        self.delay.reset();
    }
}
