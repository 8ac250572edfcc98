//! # Settings Snapshot
//!
//! A plain, copyable record of every user-facing chorus value. The plugin
//! takes one from its host parameters at the top of each block and pushes
//! it into the engine; offline tools can store one as JSON and load it
//! into a fresh engine later.
//!
//! Missing JSON fields fall back to the defaults, so older snapshots keep
//! loading when new fields are added.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chorus::ChorusEngine;
use crate::dsp::mixer::MixingLaw;
use crate::dsp::sample::Sample;
use crate::params::ChorusParams;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not encode chorus settings: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed chorus settings: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusSettings {
    /// LFO rate of the first voice, in Hz.
    pub rate: f32,
    pub depth: f32,
    pub mix: f32,
    /// Centre delay, in ms.
    pub delay: f32,
    pub spread: f32,
    pub rate_spread: f32,
    pub feedback: f32,
    pub highpass_cutoff: f32,
    pub highpass_enabled: bool,
    pub mixing_law: MixingLaw,
}

impl Default for ChorusSettings {
    fn default() -> Self {
        Self {
            rate: 6.5,
            depth: 0.25,
            mix: 0.5,
            delay: 17.0,
            spread: 0.95,
            rate_spread: 0.95,
            feedback: 0.0,
            highpass_cutoff: 150.0,
            highpass_enabled: false,
            mixing_law: MixingLaw::Linear,
        }
    }
}

impl ChorusSettings {
    /// Read the current (unsmoothed) host parameter values.
    pub fn from_params(params: &ChorusParams) -> Self {
        Self {
            rate: params.rate.value(),
            depth: params.depth.value(),
            mix: params.mix.value(),
            delay: params.delay.value(),
            spread: params.spread.value(),
            rate_spread: params.rate_spread.value(),
            feedback: params.feedback.value(),
            highpass_cutoff: params.highpass_cutoff.value(),
            highpass_enabled: params.highpass_enabled.value(),
            mixing_law: params.mixing_law.value(),
        }
    }

    /// Capture an engine's current parameter values.
    pub fn from_engine<T: Sample>(engine: &ChorusEngine<T>) -> Self {
        Self {
            rate: engine.rate().as_f64() as f32,
            depth: engine.depth().as_f64() as f32,
            mix: engine.mix().as_f64() as f32,
            delay: engine.delay().as_f64() as f32,
            spread: engine.spread().as_f64() as f32,
            rate_spread: engine.rate_spread().as_f64() as f32,
            feedback: engine.feedback_amount().as_f64() as f32,
            highpass_cutoff: engine.high_pass_cutoff().as_f64() as f32,
            highpass_enabled: engine.high_pass_enabled(),
            mixing_law: engine.mixing_law(),
        }
    }

    /// Push every value through the engine's setters. Unchanged values
    /// are no-ops, so this is cheap to call once per block.
    pub fn apply<T: Sample>(&self, engine: &mut ChorusEngine<T>) {
        let cast = |value: f32| T::cast(f64::from(value));

        engine.set_rate(cast(self.rate));
        engine.set_rate_spread(cast(self.rate_spread));
        engine.set_depth(cast(self.depth));
        engine.set_mix(cast(self.mix));
        engine.set_delay(cast(self.delay));
        engine.set_spread(cast(self.spread));
        engine.set_feedback_amount(cast(self.feedback));
        engine.set_high_pass_cutoff(cast(self.highpass_cutoff));
        engine.set_enable_high_pass(self.highpass_enabled);
        engine.set_mixing_law(self.mixing_law);
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(SettingsError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Decode)
    }
}
