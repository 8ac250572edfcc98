//! # Dry/Wet Mixer
//!
//! Blends the untouched input (dry) with the chorus output (wet):
//!
//! ```text
//! Linear:      out = dry * (1 - mix)         + wet * mix
//! EqualPower:  out = dry * cos(mix * π / 2)  + wet * sin(mix * π / 2)
//! ```
//!
//! Linear keeps the amplitudes summing to one, which is transparent when
//! dry and wet are similar. Equal power keeps the *energy* constant,
//! avoiding the dip in loudness a linear crossfade has around 50% when
//! the two signals are uncorrelated.
//!
//! The wet path overwrites the audio buffer, so the dry input has to be
//! copied aside first. Processing is two explicit steps bracketing the
//! wet computation: [`DryWetMixer::push_dry`] then [`DryWetMixer::mix_wet`].
//! The wet path adds no latency of its own, so the dry copy is not delayed.

use nih_plug::prelude::Enum;
use serde::{Deserialize, Serialize};

use super::ramp::Ramp;
use super::sample::Sample;

/// How the mix proportion maps to dry and wet gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingLaw {
    #[default]
    #[id = "linear"]
    Linear,
    #[id = "equal_power"]
    #[name = "Equal Power"]
    EqualPower,
}

impl MixingLaw {
    /// Return `(dry_gain, wet_gain)` for a mix proportion in `[0, 1]`.
    ///
    /// The end points are exact for both laws: `cos(π/2)` is not quite
    /// zero in floating point.
    #[inline]
    pub fn gains<T: Sample>(self, mix: T) -> (T, T) {
        if mix <= T::zero() {
            return (T::one(), T::zero());
        }
        if mix >= T::one() {
            return (T::zero(), T::one());
        }
        match self {
            MixingLaw::Linear => (T::one() - mix, mix),
            MixingLaw::EqualPower => {
                let angle = mix * T::FRAC_PI_2();
                (angle.cos(), angle.sin())
            }
        }
    }
}

/// Holds a copy of the dry input and blends it back into the wet block.
#[derive(Debug, Clone)]
pub struct DryWetMixer<T: Sample> {
    dry: Vec<Vec<T>>,
    /// Samples captured by the last `push_dry`.
    len: usize,
    mix: Ramp<T>,
    law: MixingLaw,
}

impl<T: Sample> DryWetMixer<T> {
    /// Time the mix proportion takes to reach a new value.
    const MIX_RAMP_SECONDS: f64 = 0.05;

    pub fn new(mix: T) -> Self {
        Self {
            dry: Vec::new(),
            len: 0,
            mix: Ramp::new(mix),
            law: MixingLaw::default(),
        }
    }

    /// Size the dry buffers. Allocates, so call it from prepare only.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize) {
        self.dry = vec![vec![T::zero(); max_block_size]; num_channels];
        self.len = 0;
        self.mix.reset(sample_rate, Self::MIX_RAMP_SECONDS);
    }

    /// Clear the dry copy and finish any mix ramp in progress.
    pub fn reset(&mut self, sample_rate: f64) {
        for channel in &mut self.dry {
            channel.fill(T::zero());
        }
        self.len = 0;
        self.mix.reset(sample_rate, Self::MIX_RAMP_SECONDS);
    }

    pub fn set_mix(&mut self, mix: T) {
        self.mix.set_target(mix);
    }

    pub fn set_law(&mut self, law: MixingLaw) {
        self.law = law;
    }

    pub fn law(&self) -> MixingLaw {
        self.law
    }

    /// Copy the input block aside before the wet path overwrites it.
    pub fn push_dry<I: AsRef<[T]>>(&mut self, input: &[I]) {
        nih_plug::nih_debug_assert_eq!(input.len(), self.dry.len());

        let mut len = 0;
        for (dry, channel) in self.dry.iter_mut().zip(input) {
            let channel = channel.as_ref();
            dry[..channel.len()].copy_from_slice(channel);
            len = channel.len();
        }
        self.len = len;
    }

    /// The dry samples captured by the last [`push_dry`](Self::push_dry).
    pub fn dry(&self, channel: usize) -> &[T] {
        &self.dry[channel][..self.len]
    }

    /// Blend the stored dry block into `wet`, in place.
    ///
    /// The mix ramp advances once per sample frame, shared by all channels.
    pub fn mix_wet<W: AsMut<[T]>>(&mut self, wet: &mut [W]) {
        for i in 0..self.len {
            let (dry_gain, wet_gain) = self.law.gains(self.mix.next());
            for (dry, channel) in self.dry.iter().zip(wet.iter_mut()) {
                let sample = &mut channel.as_mut()[i];
                *sample = dry[i] * dry_gain + *sample * wet_gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer(mix: f64, law: MixingLaw) -> DryWetMixer<f64> {
        let mut mixer = DryWetMixer::new(mix);
        mixer.set_law(law);
        mixer.prepare(44100.0, 4, 2);
        mixer
    }

    #[test]
    fn test_linear_gains() {
        let (dry, wet) = MixingLaw::Linear.gains(0.25_f64);
        assert!((dry - 0.75).abs() < 1e-12);
        assert!((wet - 0.25).abs() < 1e-12);
    }

    /// Equal power keeps dry² + wet² = 1 everywhere on the fader.
    #[test]
    fn test_equal_power_gains_keep_energy() {
        for step in 0..=10 {
            let mix = step as f64 / 10.0;
            let (dry, wet) = MixingLaw::EqualPower.gains(mix);
            assert!((dry * dry + wet * wet - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mix_zero_is_exact_dry() {
        for law in [MixingLaw::Linear, MixingLaw::EqualPower] {
            let mut mixer = mixer(0.0, law);
            let input = [vec![0.1, -0.2, 0.3, -0.4], vec![0.5, 0.6, -0.7, 0.8]];
            mixer.push_dry(&input);

            let mut wet = [vec![9.0; 4], vec![-9.0; 4]];
            mixer.mix_wet(&mut wet);

            assert_eq!(wet, input, "mix = 0 must return the dry input ({law:?})");
        }
    }

    #[test]
    fn test_mix_one_is_wet_only() {
        for law in [MixingLaw::Linear, MixingLaw::EqualPower] {
            let mut mixer = mixer(1.0, law);
            mixer.push_dry(&[vec![1.0; 4], vec![1.0; 4]]);

            let mut wet = [vec![0.25; 4], vec![-0.25; 4]];
            mixer.mix_wet(&mut wet);

            assert_eq!(wet, [vec![0.25; 4], vec![-0.25; 4]], "{law:?}");
        }
    }

    /// In f32, `cos(π/2)` alone would leave a dry residue around 1e-8.
    #[test]
    fn test_equal_power_end_points_are_exact_in_f32() {
        assert_eq!(MixingLaw::EqualPower.gains(1.0_f32), (0.0, 1.0));
        assert_eq!(MixingLaw::EqualPower.gains(0.0_f32), (1.0, 0.0));

        let mut mixer = DryWetMixer::new(1.0_f32);
        mixer.set_law(MixingLaw::EqualPower);
        mixer.prepare(44100.0, 4, 1);
        mixer.push_dry(&[vec![0.8_f32; 4]]);

        let mut wet = [vec![0.0_f32; 4]];
        mixer.mix_wet(&mut wet);
        assert_eq!(wet, [vec![0.0_f32; 4]]);
    }

    /// A partial block only touches the samples that were pushed.
    #[test]
    fn test_short_block() {
        let mut mixer = mixer(0.5, MixingLaw::Linear);
        mixer.push_dry(&[vec![1.0, 1.0], vec![0.0, 0.0]]);
        assert_eq!(mixer.dry(0), &[1.0, 1.0]);

        let mut wet = [vec![0.0, 0.0], vec![1.0, 1.0]];
        mixer.mix_wet(&mut wet);

        assert_eq!(wet, [vec![0.5, 0.5], vec![0.5, 0.5]]);
    }

    /// A new mix value ramps in instead of jumping.
    #[test]
    fn test_mix_change_is_smoothed() {
        let mut mixer = DryWetMixer::new(0.0_f64);
        mixer.prepare(1000.0, 100, 1);
        mixer.set_mix(1.0);

        mixer.push_dry(&[vec![1.0; 100]]);
        let mut wet = [vec![0.0; 100]];
        mixer.mix_wet(&mut wet);

        // 50 ms at 1 kHz: 50 steps from dry to wet.
        assert!(wet[0][0] > 0.9, "First sample should still be mostly dry");
        assert!((wet[0][24] - 0.5).abs() < 1e-9);
        assert!(wet[0][49..].iter().all(|s| *s == 0.0));
    }
}
