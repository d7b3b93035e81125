//! Engine — the outward surface over buffers, files and animations.
//!
//! Every operation borrows the buffers it touches for the length of the
//! call; the engine itself only carries configuration.

use std::path::Path;

use tracing::info;

use super::buffer::AudioBuffer;
use super::effect::{EffectKind, apply_effect};
use super::mixer::mix;
use super::oscillator::Waveform;
use super::renderer::write_wav;
use super::sampler::{SampleRange, sample};
use super::synth::{Note, synthesize};
use crate::animation::Animation;
use crate::config::EngineConfig;
use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Add one enveloped note to `buffer`.
    ///
    /// `waveform` is the numeric code: 0 sine, 1 saw, 2 square, 3 triangle,
    /// 4 noise. An unknown code fails before the buffer is touched.
    #[allow(clippy::too_many_arguments)]
    pub fn synthesize(
        &self,
        buffer: &mut AudioBuffer,
        start_ms: f64,
        attack_ms: f64,
        sustain_ms: f64,
        decay_ms: f64,
        frequency: f64,
        amplitude: f64,
        waveform: u32,
    ) -> Result<(), EngineError> {
        let note = Note {
            start_ms,
            attack_ms,
            sustain_ms,
            decay_ms,
            frequency,
            amplitude,
            waveform: Waveform::try_from(waveform)?,
        };
        self.synthesize_note(buffer, &note);
        Ok(())
    }

    pub fn synthesize_note(&self, buffer: &mut AudioBuffer, note: &Note) {
        synthesize(buffer, note);
    }

    /// Apply the effect with numeric `code` across the whole buffer.
    pub fn apply_effect(&self, buffer: &mut AudioBuffer, animation: &Animation, code: u32) {
        apply_effect(buffer, animation, EffectKind::from(code));
    }

    pub fn write_file(&self, buffer: &AudioBuffer, path: impl AsRef<Path>) -> Result<(), EngineError> {
        write_wav(path, buffer)
    }

    /// Import part of a WAV file into `buffer`. A `duration_ms` of 0 reads
    /// to the end of the file. Returns the number of frames added.
    pub fn read_into_buffer(
        &self,
        buffer: &mut AudioBuffer,
        path: impl AsRef<Path>,
        target_start_ms: f64,
        source_start_ms: f64,
        duration_ms: f64,
    ) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let range = SampleRange {
            target_start_ms,
            source_start_ms,
            duration_ms,
        };
        let frames = sample(path, buffer, range, &self.config.resample)?;
        info!(path = %path.display(), frames, "Read WAV into buffer");
        Ok(frames)
    }

    /// Add part of `source` into `target`. Returns the number of frames mixed.
    pub fn mix_buffers(
        &self,
        target: &mut AudioBuffer,
        source: &AudioBuffer,
        target_start_ms: f64,
        source_start_ms: f64,
        duration_ms: f64,
    ) -> usize {
        mix(target, source, target_start_ms, source_start_ms, duration_ms)
    }
}
