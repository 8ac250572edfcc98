//! # Lush Chorus: A Four-Voice AU/VST3/CLAP Chorus Plugin
//!
//! A chorus built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! Four delay lines, each swept by its own slow sine LFO at a slightly
//! different rate, are panned across the stereo field and blended with
//! the dry signal. Outputs Audio Unit (AUv2), VST3 and CLAP from a single
//! codebase.
//!
//! ## Signal Flow
//!
//! ```text
//! Input ──┬────────────────────────────────────────────── dry ──────┐
//!         │                                                         │
//!         │   ┌──────── × feedback ◄─────────┐                      │
//!         │   ▼                              │                      │
//!         └─►(+)─► [Delay line × 4] ─► Σ voices × stereo spread     │
//!                    ▲                       │                      │
//!             [LFO × 4] swept delay time     ▼                      │
//!                                      [High-pass]* ─► wet ─► [Dry/Wet] ──► Output
//! ```
//!
//! The engine itself (`chorus`, `dsp`) knows nothing about plugin hosts;
//! this file only translates between nih-plug and the engine.

pub mod chorus;
pub mod dsp;
pub mod params;
pub mod settings;

use std::num::NonZeroU32;
use std::sync::Arc;

use chorus::ChorusEngine;
use nih_plug::prelude::*;
use params::ChorusParams;
use settings::ChorusSettings;

/// The main plugin struct.
///
/// Parameters (`ChorusParams`) are shared with the host via `Arc` and can
/// be read from any thread. The engine is owned exclusively by the audio
/// thread and only touched in `initialize()`, `reset()` and `process()`.
/// Each parameter is a single atomic value read once per block, so a
/// knob moving mid-block costs at most one block of staleness.
struct LushChorus {
    params: Arc<ChorusParams>,
    engine: ChorusEngine<f32>,
}

impl Default for LushChorus {
    fn default() -> Self {
        Self {
            params: Arc::new(ChorusParams::default()),
            // Unprepared until initialize() tells us the sample rate and
            // block size.
            engine: ChorusEngine::new(),
        }
    }
}

impl Plugin for LushChorus {
    const NAME: &'static str = "Lush Chorus";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first: the voices alternate between left and right, so
    // stereo is where the effect is meant to live. Mono still works,
    // with every voice landing in the one channel.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are consumed once per block, so there is nothing to
    // gain from splitting blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is first loaded, or when the audio
    /// configuration changes. This is the only place the engine allocates.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        if !(1..=chorus::MAX_CHANNELS).contains(&num_channels) {
            nih_log!("lush chorus: unsupported channel count {num_channels}");
            return false;
        }

        // Apply the saved parameters before prepare so the ramps start
        // at their targets instead of sweeping in from the defaults.
        ChorusSettings::from_params(&self.params).apply(&mut self.engine);
        self.engine.prepare(
            f64::from(buffer_config.sample_rate),
            buffer_config.max_buffer_size as usize,
            num_channels,
        );

        true
    }

    /// Called when playback stops or the transport jumps. Clears the
    /// delay lines so stale audio doesn't bleed into the next playback.
    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One snapshot per block: rate and filter changes recompute the
        // per-voice coefficients right here, never mid-block.
        ChorusSettings::from_params(&self.params).apply(&mut self.engine);

        let is_bypassed = self.params.bypass.value();
        self.engine.process_in_place(buffer.as_slice(), is_bypassed);

        ProcessStatus::Tail(self.engine.tail_samples())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for LushChorus {
    const CLAP_ID: &'static str = "com.loveless-audio.lush-chorus";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A four-voice modulated delay chorus with stereo spread");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Chorus,
    ];
}

impl Vst3Plugin for LushChorus {
    // The `*b"..."` syntax creates a `[u8; 16]` from a 16-character
    // ASCII string literal.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssLushChorus1";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Modulation];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 so Logic Pro
// (Audio Units only) can load it.

nih_export_clap!(LushChorus);
nih_export_vst3!(LushChorus);

clap_wrapper::export_auv2!();
