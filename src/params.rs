//! # Plugin Parameters
//!
//! Parameters are the knobs and switches the user sees in the DAW. Each
//! parameter has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to
//!   save and recall presets. Once published, never change these IDs
//!   or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** and a **default value**.
//!
//! ## No Smoothers Here
//!
//! The chorus engine reads these once per block and does its own
//! smoothing where it matters (depth and mix ramp over 50 ms inside the
//! engine). Rate, delay and spread changes are already continuous: the
//! LFO keeps its phase and the delay line interpolates.

use nih_plug::prelude::*;
use std::sync::Arc;

use crate::dsp::mixer::MixingLaw;

/// All user-facing parameters for the Lush Chorus plugin.
#[derive(Params)]
pub struct ChorusParams {
    /// **Rate**: how fast the first voice's delay time sweeps, in Hz.
    #[id = "rate"]
    pub rate: FloatParam,

    /// **Rate Spread**: each successive voice runs at this fraction of
    /// the previous voice's rate, so the four sweeps drift apart instead
    /// of moving in lockstep.
    #[id = "rate_spread"]
    pub rate_spread: FloatParam,

    /// **Depth**: how far the delay time swings around the centre.
    #[id = "depth"]
    pub depth: FloatParam,

    /// **Mix**: the balance between dry and chorused signal.
    #[id = "mix"]
    pub mix: FloatParam,

    /// **Delay**: the centre delay the voices sweep around, in ms.
    ///
    /// Short (1-10 ms) gives flanger-like shimmer, 15-25 ms is the
    /// classic chorus, longer starts to sound like doubling.
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Stereo Spread**: how hard each voice is panned toward its side.
    /// Stored as 0.5-1.0 and displayed as 0-100.
    #[id = "spread"]
    pub spread: FloatParam,

    /// **Feedback**: how much of each voice is fed back into its own
    /// delay line. Capped at 95% so the loop always decays.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **High-Pass**: cutoff of the optional high-pass on the wet signal.
    #[id = "highpass_cutoff"]
    pub highpass_cutoff: FloatParam,

    /// **High-Pass On**: whether the wet high-pass is in the signal path.
    #[id = "highpass_enabled"]
    pub highpass_enabled: BoolParam,

    /// **Mix Law**: linear or equal-power dry/wet crossfade.
    #[id = "mix_law"]
    pub mixing_law: EnumParam<MixingLaw>,

    /// Host bypass. When on, audio passes through untouched and the
    /// engine's LFOs and delay lines are frozen.
    #[id = "bypass"]
    pub bypass: BoolParam,
}

/// Display the 0.5-1.0 spread range as 0-100.
fn spread_to_string() -> Arc<dyn Fn(f32) -> String + Send + Sync> {
    Arc::new(|value| format!("{:.0}", (value - 0.5) * 200.0))
}

fn string_to_spread() -> Arc<dyn Fn(&str) -> Option<f32> + Send + Sync> {
    Arc::new(|string| {
        string
            .trim_end_matches([' ', '%'])
            .parse::<f32>()
            .ok()
            .map(|percent| percent / 200.0 + 0.5)
    })
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self {
            rate: FloatParam::new("Rate", 6.5, FloatRange::Linear { min: 0.0, max: 10.0 })
                .with_unit(" Hz")
                .with_step_size(0.01),

            rate_spread: FloatParam::new(
                "Rate Spread",
                0.95,
                FloatRange::Linear { min: 0.01, max: 1.0 },
            )
            .with_unit("%")
            .with_step_size(0.01)
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            depth: FloatParam::new("Depth", 0.25, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_step_size(0.01)
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            mix: FloatParam::new("Mix", 0.5, FloatRange::Linear { min: 0.0, max: 1.0 })
                .with_unit("%")
                .with_step_size(0.01)
                .with_value_to_string(formatters::v2s_f32_percentage(0))
                .with_string_to_value(formatters::s2v_f32_percentage()),

            delay: FloatParam::new("Delay", 17.0, FloatRange::Linear { min: 1.0, max: 50.0 })
                .with_unit(" ms")
                .with_step_size(1.0),

            spread: FloatParam::new(
                "Stereo Spread",
                0.95,
                FloatRange::Linear { min: 0.5, max: 1.0 },
            )
            .with_unit("%")
            .with_step_size(0.005)
            .with_value_to_string(spread_to_string())
            .with_string_to_value(string_to_spread()),

            feedback: FloatParam::new(
                "Feedback",
                0.0,
                FloatRange::Linear {
                    min: 0.0,
                    max: 0.95, // Capped below 1.0 for stability
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(0))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            highpass_cutoff: FloatParam::new(
                "High-Pass",
                150.0,
                FloatRange::Skewed {
                    min: 20.0,
                    max: 2000.0,
                    // Frequency perception is roughly logarithmic, so give
                    // the low end more knob travel.
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(1.0),

            highpass_enabled: BoolParam::new("High-Pass On", false),

            mixing_law: EnumParam::new("Mix Law", MixingLaw::Linear),

            bypass: BoolParam::new("Bypass", false).make_bypass(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let params = ChorusParams::default();
        let settings = crate::settings::ChorusSettings::from_params(&params);
        assert_eq!(settings, crate::settings::ChorusSettings::default());
        assert!(!params.bypass.value());
    }

    #[test]
    fn test_spread_display() {
        let to_string = spread_to_string();
        assert_eq!(to_string(0.5), "0");
        assert_eq!(to_string(0.95), "90");
        assert_eq!(to_string(1.0), "100");

        let to_value = string_to_spread();
        assert_eq!(to_value("50"), Some(0.75));
        assert_eq!(to_value("100%"), Some(1.0));
        assert_eq!(to_value("wide"), None);
    }
}
