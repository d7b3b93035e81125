//! Wave synthesizer — writes one enveloped oscillator note, additively.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::buffer::AudioBuffer;
use super::envelope::NoteEnvelope;
use super::oscillator::{Oscillator, Waveform};

/// Parameters of a single note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Where the attack begins, in ms from the start of the buffer.
    pub start_ms: f64,
    pub attack_ms: f64,
    pub sustain_ms: f64,
    pub decay_ms: f64,
    pub frequency: f64,
    /// Peak amplitude in sample units (up to 32767).
    pub amplitude: f64,
    pub waveform: Waveform,
}

impl Note {
    pub fn envelope(&self) -> NoteEnvelope {
        NoteEnvelope::from_ms(self.start_ms, self.attack_ms, self.sustain_ms, self.decay_ms)
    }
}

/// Add `note` into `buffer`, growing the buffer to the note's end first.
///
/// The mono signal is written to both channels.
pub fn synthesize(buffer: &mut AudioBuffer, note: &Note) {
    let envelope = note.envelope();
    let mut osc = Oscillator::new(note.waveform, note.frequency);

    debug!(
        waveform = ?note.waveform,
        frequency = note.frequency,
        frames = envelope.len(),
        "Synthesizing note"
    );

    let Some(len) = envelope.end.checked_mul(2) else {
        warn!(end = envelope.end, "Note ends beyond any addressable frame, skipping");
        return;
    };
    buffer.grow_to(len);
    for frame in envelope.start..envelope.end {
        let value = envelope.gain_at(frame) * note.amplitude * osc.sample(frame);
        let sample = value as i16 as u16;
        buffer.add_frame(frame, sample, sample);
    }
}
