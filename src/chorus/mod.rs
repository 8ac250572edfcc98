//! # Lush Chorus Engine
//!
//! Four modulated delay lines ("voices") mixed into a stereo image.
//!
//! ```text
//!                    ┌─► voice 0: LFO ─► delay line ─┐ × spread (L) / 1-spread (R)
//!                    ├─► voice 1: LFO ─► delay line ─┤ × 1-spread (L) / spread (R)
//! Input ──┬─────────►├─► voice 2: LFO ─► delay line ─┤      ...
//!         │          └─► voice 3: LFO ─► delay line ─┤
//!         │                     ▲                    ▼
//!         │                     └── × feedback ◄── Σ / (4 × 0.5) ─► [High-pass] ─┐
//!         │                                                                     │
//!         └──────────── dry ──────────────────────────────► [Dry/Wet mixer] ◄───┘──► Output
//! ```
//!
//! ## Lifecycle
//!
//! An engine starts unprepared. [`ChorusEngine::prepare`] sizes every
//! buffer for a sample rate, maximum block size and channel count; after
//! that [`ChorusEngine::process`] may be called any number of times and
//! never allocates. Preparing again with a new configuration reallocates.
//!
//! Processing before `prepare` is a programming error and panics, as do
//! blocks longer than the prepared maximum or with the wrong channel count.

pub mod voice;

use std::num::NonZeroUsize;

use nih_plug::nih_log;

use crate::dsp::filter::HighPassFilter;
use crate::dsp::mixer::{DryWetMixer, MixingLaw};
use crate::dsp::ramp::Ramp;
use crate::dsp::sample::Sample;
use voice::{stereo_weight, VoiceState, MAX_MODULATION_MS};

/// Number of chorus voices. Fixed at build time.
pub const NUM_VOICES: usize = 4;

/// Channel counts the engine can be prepared for.
pub const MAX_CHANNELS: usize = 2;

/// Depth 1.0 maps to this LFO amplitude before the modulation swing.
pub const DEPTH_SCALE: f64 = 0.2;

/// Upper end of the depth control.
pub const MAX_DEPTH: f64 = 1.0;
/// Shortest centre delay, in ms.
pub const MIN_CENTRE_DELAY_MS: f64 = 1.0;
/// Longest centre delay, in ms. Sizes the delay buffers.
pub const MAX_CENTRE_DELAY_MS: f64 = 100.0;
/// Fastest base LFO rate, in Hz.
pub const MAX_RATE_HZ: f64 = 20.0;
/// Stereo spread at which every voice sits in the centre.
pub const MIN_SPREAD: f64 = 0.5;
/// Feedback ceiling. Below 1 so the loop always decays.
pub const MAX_FEEDBACK: f64 = 0.95;
/// Lowest high-pass cutoff, in Hz.
pub const MIN_HIGH_PASS_HZ: f64 = 20.0;
/// Highest high-pass cutoff, in Hz.
pub const MAX_HIGH_PASS_HZ: f64 = 20000.0;

/// Time for a depth change to fully take effect.
const DEPTH_RAMP_SECONDS: f64 = 0.05;

/// Voice sum is divided by this so the wet level doesn't depend on the
/// number of voices.
const VOICE_NORMALIZATION: f64 = NUM_VOICES as f64 * 0.5;

/// The audio configuration fixed at prepare time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub max_block_size: usize,
    pub num_channels: usize,
}

/// Per-channel capacity, in samples, needed for the longest delay any
/// parameter combination can ask for (plus write head and interpolation
/// slots).
pub fn delay_capacity(sample_rate: f64) -> NonZeroUsize {
    let max_delay_ms = MAX_MODULATION_MS * MAX_DEPTH * DEPTH_SCALE + MAX_CENTRE_DELAY_MS;
    let max_delay_samples = (max_delay_ms * sample_rate / 1000.0).ceil() as usize;
    NonZeroUsize::new(max_delay_samples + 2).unwrap_or(NonZeroUsize::MIN)
}

/// Clamp an incoming parameter value, rejecting NaN.
fn clamp_param<T: Sample>(value: T, min: f64, max: f64) -> Option<T> {
    if value.is_nan() {
        return None;
    }
    Some(value.max(T::cast(min)).min(T::cast(max)))
}

/// The four-voice modulated delay chorus.
pub struct ChorusEngine<T: Sample> {
    config: Option<EngineConfig>,

    voices: [VoiceState<T>; NUM_VOICES],

    /// Smoothed `depth * DEPTH_SCALE`.
    depth_scale: Ramp<T>,
    /// `depth_scale` expanded to one value per sample of the current
    /// block, shared by all voices.
    depth_scale_block: Vec<T>,

    high_pass: Vec<HighPassFilter<T>>,
    dry_wet: DryWetMixer<T>,

    rate: T,
    rate_spread: T,
    depth: T,
    mix: T,
    centre_delay: T,
    spread: T,
    feedback: T,
    high_pass_cutoff: T,
    high_pass_enabled: bool,
}

impl<T: Sample> Default for ChorusEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> ChorusEngine<T> {
    /// Create an unprepared engine with the default voicing.
    pub fn new() -> Self {
        let depth = T::cast(0.25);
        let mix = T::cast(0.5);

        let mut engine = Self {
            config: None,
            voices: std::array::from_fn(|_| VoiceState::default()),
            depth_scale: Ramp::new(depth * T::cast(DEPTH_SCALE)),
            depth_scale_block: Vec::new(),
            high_pass: Vec::new(),
            dry_wet: DryWetMixer::new(mix),
            rate: T::cast(6.5),
            rate_spread: T::cast(0.95),
            depth,
            mix,
            centre_delay: T::cast(17.0),
            spread: T::cast(0.95),
            feedback: T::zero(),
            high_pass_cutoff: T::cast(150.0),
            high_pass_enabled: false,
        };
        engine.update_voice_rates();
        engine
    }

    // ─── Lifecycle ────────────────────────────────────────────────────

    /// Allocate every buffer for this configuration, then reset.
    ///
    /// # Panics
    ///
    /// If the sample rate or block size is not positive, or the channel
    /// count is not 1 or 2.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize) {
        assert!(
            sample_rate.is_finite() && sample_rate > 0.0,
            "sample rate must be positive, got {sample_rate}"
        );
        assert!(max_block_size > 0, "max block size must be positive");
        assert!(
            (1..=MAX_CHANNELS).contains(&num_channels),
            "chorus supports 1 or 2 channels, got {num_channels}"
        );

        let capacity = delay_capacity(sample_rate);
        for voice in &mut self.voices {
            voice.prepare(sample_rate, capacity, max_block_size, num_channels);
        }
        self.depth_scale_block = vec![T::zero(); max_block_size];

        self.high_pass = (0..num_channels).map(|_| HighPassFilter::new()).collect();
        self.dry_wet.prepare(sample_rate, max_block_size, num_channels);

        self.config = Some(EngineConfig {
            sample_rate,
            max_block_size,
            num_channels,
        });

        self.update_voice_rates();
        self.update_high_pass();
        self.reset();

        nih_log!(
            "chorus prepared: {sample_rate} Hz, {max_block_size} samples, {num_channels} channel(s), {} sample delay capacity",
            capacity
        );
    }

    /// Silence every buffer, restart the LFOs and finish all ramps.
    /// Nothing is reallocated. Does nothing on an unprepared engine.
    pub fn reset(&mut self) {
        let Some(config) = self.config else {
            return;
        };

        for voice in &mut self.voices {
            voice.reset();
        }
        for filter in &mut self.high_pass {
            filter.reset();
        }
        self.depth_scale.reset(config.sample_rate, DEPTH_RAMP_SECONDS);
        self.dry_wet.reset(config.sample_rate);
    }

    /// The configuration from the last `prepare`, if any.
    pub fn config(&self) -> Option<EngineConfig> {
        self.config
    }

    /// Whether `process` may be called.
    pub fn is_prepared(&self) -> bool {
        self.config.is_some()
    }

    // ─── Parameters ───────────────────────────────────────────────────
    //
    // Out-of-range values are clamped and NaN is ignored. Setting a
    // parameter to its current value does nothing.

    /// Base LFO rate in Hz, clamped to `[0, 20]`.
    pub fn set_rate(&mut self, rate: T) {
        let Some(rate) = clamp_param(rate, 0.0, MAX_RATE_HZ) else {
            return;
        };
        if rate != self.rate {
            self.rate = rate;
            self.update_voice_rates();
        }
    }

    /// Per-voice rate factor in `[0, 1]`: voice `i` runs at
    /// `rate * rate_spread^i`.
    pub fn set_rate_spread(&mut self, rate_spread: T) {
        let Some(rate_spread) = clamp_param(rate_spread, 0.0, 1.0) else {
            return;
        };
        if rate_spread != self.rate_spread {
            self.rate_spread = rate_spread;
            self.update_voice_rates();
        }
    }

    /// Modulation depth in `[0, 1]`. Ramps in over 50 ms.
    pub fn set_depth(&mut self, depth: T) {
        let Some(depth) = clamp_param(depth, 0.0, MAX_DEPTH) else {
            return;
        };
        if depth != self.depth {
            self.depth = depth;
            self.depth_scale.set_target(depth * T::cast(DEPTH_SCALE));
        }
    }

    /// Wet proportion in `[0, 1]`. Ramps in over 50 ms.
    pub fn set_mix(&mut self, mix: T) {
        let Some(mix) = clamp_param(mix, 0.0, 1.0) else {
            return;
        };
        if mix != self.mix {
            self.mix = mix;
            self.dry_wet.set_mix(mix);
        }
    }

    /// Centre delay in ms, clamped to `[1, 100]`.
    pub fn set_delay(&mut self, delay_ms: T) {
        if let Some(delay_ms) = clamp_param(delay_ms, MIN_CENTRE_DELAY_MS, MAX_CENTRE_DELAY_MS) {
            self.centre_delay = delay_ms;
        }
    }

    /// Stereo spread in `[0.5, 1]`.
    pub fn set_spread(&mut self, spread: T) {
        if let Some(spread) = clamp_param(spread, MIN_SPREAD, 1.0) {
            self.spread = spread;
        }
    }

    /// Feedback amount, clamped to `[0, 0.95]` so the loop always decays.
    pub fn set_feedback_amount(&mut self, feedback: T) {
        if let Some(feedback) = clamp_param(feedback, 0.0, MAX_FEEDBACK) {
            self.feedback = feedback;
        }
    }

    /// Switch the wet high-pass on or off. Either way its history is cleared.
    pub fn set_enable_high_pass(&mut self, enable: bool) {
        if enable == self.high_pass_enabled {
            return;
        }
        self.high_pass_enabled = enable;
        // Don't let history from the last time it was on leak back in.
        for filter in &mut self.high_pass {
            filter.reset();
        }
    }

    /// High-pass cutoff in Hz, clamped to `[20, 20000]`.
    pub fn set_high_pass_cutoff(&mut self, cutoff_hz: T) {
        let Some(cutoff_hz) = clamp_param(cutoff_hz, MIN_HIGH_PASS_HZ, MAX_HIGH_PASS_HZ) else {
            return;
        };
        if cutoff_hz != self.high_pass_cutoff {
            self.high_pass_cutoff = cutoff_hz;
            self.update_high_pass();
        }
    }

    /// Dry/wet crossfade law. Takes effect on the next sample.
    pub fn set_mixing_law(&mut self, law: MixingLaw) {
        self.dry_wet.set_law(law);
    }

    /// Base LFO rate in Hz (the first voice's rate).
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Rate factor between successive voices.
    pub fn rate_spread(&self) -> T {
        self.rate_spread
    }

    /// Target depth. The applied depth may still be ramping toward it.
    pub fn depth(&self) -> T {
        self.depth
    }

    /// Target mix. The applied mix may still be ramping toward it.
    pub fn mix(&self) -> T {
        self.mix
    }

    /// Centre delay in ms.
    pub fn delay(&self) -> T {
        self.centre_delay
    }

    /// Stereo spread in `[0.5, 1]`.
    pub fn spread(&self) -> T {
        self.spread
    }

    /// Feedback amount in `[0, 0.95]`.
    pub fn feedback_amount(&self) -> T {
        self.feedback
    }

    /// Whether the wet high-pass is active.
    pub fn high_pass_enabled(&self) -> bool {
        self.high_pass_enabled
    }

    /// High-pass cutoff in Hz.
    pub fn high_pass_cutoff(&self) -> T {
        self.high_pass_cutoff
    }

    /// The current dry/wet crossfade law.
    pub fn mixing_law(&self) -> MixingLaw {
        self.dry_wet.law()
    }

    /// The LFO rate each voice is currently running at.
    pub fn voice_rates(&self) -> [T; NUM_VOICES] {
        std::array::from_fn(|i| self.voices[i].lfo.rate())
    }

    /// How long the effect keeps sounding after the input stops, in
    /// samples. One pass through the longest current delay, times the
    /// number of feedback repeats it takes to fall to -60 dB.
    pub fn tail_samples(&self) -> u32 {
        let Some(config) = self.config else {
            return 0;
        };

        let swing_ms = MAX_MODULATION_MS * self.depth.as_f64() * DEPTH_SCALE;
        let delay_samples = (self.centre_delay.as_f64() + swing_ms) * config.sample_rate / 1000.0;

        let feedback = self.feedback.as_f64();
        if feedback > 0.001 {
            let repeats = -3.0 / feedback.log10(); // log10(0.001) = -3
            (repeats * delay_samples).ceil() as u32
        } else {
            delay_samples.ceil() as u32
        }
    }

    fn update_voice_rates(&mut self) {
        let mut rate = self.rate;
        for voice in &mut self.voices {
            voice.lfo.set_rate(rate);
            rate = rate * self.rate_spread;
        }
    }

    fn update_high_pass(&mut self) {
        let Some(config) = self.config else {
            return;
        };
        for filter in &mut self.high_pass {
            filter.set_cutoff(self.high_pass_cutoff.as_f64(), config.sample_rate);
        }
    }

    // ─── Processing ───────────────────────────────────────────────────

    /// Process `input` into `output`. With `is_bypassed` the input is
    /// copied across and no engine state moves: LFO phase, delay buffers
    /// and ramps are frozen for the block.
    ///
    /// # Panics
    ///
    /// If the engine is unprepared, the channel counts don't match the
    /// prepared configuration, or the block is longer than prepared for.
    pub fn process<I, O>(&mut self, input: &[I], output: &mut [O], is_bypassed: bool)
    where
        I: AsRef<[T]>,
        O: AsMut<[T]>,
    {
        let len = self.check_block(input);
        assert_eq!(output.len(), input.len(), "input/output channel count mismatch");
        for channel in output.iter_mut() {
            assert_eq!(channel.as_mut().len(), len, "input/output block length mismatch");
        }

        if is_bypassed {
            for (out, inp) in output.iter_mut().zip(input) {
                out.as_mut().copy_from_slice(inp.as_ref());
            }
            return;
        }

        self.dry_wet.push_dry(input);
        self.render(output, len);
    }

    /// Process a block in place. See [`process`](Self::process).
    pub fn process_in_place<B>(&mut self, block: &mut [B], is_bypassed: bool)
    where
        B: AsRef<[T]> + AsMut<[T]>,
    {
        let len = self.check_block(block);
        if is_bypassed {
            return;
        }

        self.dry_wet.push_dry(block);
        self.render(block, len);
    }

    /// Enforce the processing preconditions and return the block length.
    fn check_block<I: AsRef<[T]>>(&self, block: &[I]) -> usize {
        let Some(config) = self.config else {
            panic!("ChorusEngine::process called before prepare");
        };
        assert_eq!(
            block.len(),
            config.num_channels,
            "engine prepared for {} channel(s)",
            config.num_channels
        );

        let len = block.first().map_or(0, |channel| channel.as_ref().len());
        assert!(
            len <= config.max_block_size,
            "block of {len} samples exceeds prepared maximum of {}",
            config.max_block_size
        );
        for channel in block {
            assert_eq!(channel.as_ref().len(), len, "channels differ in length");
        }
        len
    }

    /// The wet path. The dry input has already been pushed into
    /// `dry_wet`; `output` is overwritten with the final mix.
    fn render<O: AsMut<[T]>>(&mut self, output: &mut [O], len: usize) {
        let Some(config) = self.config else {
            return;
        };
        let num_channels = config.num_channels;
        let ms_to_samples = T::cast(config.sample_rate / 1000.0);

        // 1. Smoothed depth, one value per sample, shared by every voice.
        for slot in &mut self.depth_scale_block[..len] {
            *slot = self.depth_scale.next();
        }

        // 2. Each voice's LFO becomes a per-sample delay length.
        for voice in &mut self.voices {
            voice.compute_delay_times(
                &self.depth_scale_block[..len],
                self.centre_delay,
                ms_to_samples,
            );
        }

        // 3. Read, feed back and sum the voices.
        let normalization = T::cast(VOICE_NORMALIZATION);
        let feedback = self.feedback;
        for (channel, out) in output.iter_mut().enumerate() {
            let out = &mut out.as_mut()[..len];
            let dry = self.dry_wet.dry(channel);
            let weights: [T; NUM_VOICES] =
                std::array::from_fn(|v| stereo_weight(v, channel, num_channels, self.spread));

            for (i, (out_sample, &input)) in out.iter_mut().zip(dry).enumerate() {
                let mut wet = T::zero();
                for (voice, &weight) in self.voices.iter_mut().zip(&weights) {
                    voice.delay.set_delay(voice.delay_times[i]);
                    let delayed = voice.delay.pop_sample(channel) * weight;
                    voice.delay.push_sample(channel, input + delayed * feedback);
                    wet = wet + delayed;
                }
                *out_sample = wet / normalization;
            }
        }

        // 4. Optional high-pass on the wet signal.
        if self.high_pass_enabled {
            for (filter, out) in self.high_pass.iter_mut().zip(output.iter_mut()) {
                filter.process_block(&mut out.as_mut()[..len]);
            }
        }

        // 5. Blend the dry input back in.
        self.dry_wet.mix_wet(output);
    }
}
