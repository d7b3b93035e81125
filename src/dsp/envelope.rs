//! Attack / sustain / decay envelope of a single note.

use super::buffer::frame_from_ms;

/// Linear attack ramp, flat sustain, then a linear decay ramp, in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEnvelope {
    pub start: usize,
    pub attack_end: usize,
    pub sustain_end: usize,
    pub end: usize,
}

impl NoteEnvelope {
    /// Build from millisecond durations, starting at `start_ms`.
    pub fn from_ms(start_ms: f64, attack_ms: f64, sustain_ms: f64, decay_ms: f64) -> Self {
        let attack_end_ms = start_ms + attack_ms.max(0.0);
        let sustain_end_ms = attack_end_ms + sustain_ms.max(0.0);
        let end_ms = sustain_end_ms + decay_ms.max(0.0);

        NoteEnvelope {
            start: frame_from_ms(start_ms),
            attack_end: frame_from_ms(attack_end_ms),
            sustain_end: frame_from_ms(sustain_end_ms),
            end: frame_from_ms(end_ms),
        }
    }

    /// Number of frames the note spans.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gain in `[0, 1]` at `frame`.
    pub fn gain_at(&self, frame: usize) -> f64 {
        let frame = frame as f64;

        let attack = if frame < self.attack_end as f64 {
            let span = (self.attack_end - self.start) as f64;
            ((frame - self.start as f64) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let decay = if frame > self.sustain_end as f64 {
            let span = (self.end - self.sustain_end) as f64;
            (1.0 - (frame - self.sustain_end as f64) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };

        attack * decay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_and_decay_ramps() {
        // 100ms = 4410 frames
        let env = NoteEnvelope::from_ms(0.0, 100.0, 0.0, 100.0);
        assert_eq!(env.attack_end, 4410);
        assert_eq!(env.sustain_end, 4410);
        assert_eq!(env.end, 8820);

        assert_eq!(env.gain_at(0), 0.0);
        assert!((env.gain_at(2205) - 0.5).abs() < 1e-9);
        assert_eq!(env.gain_at(4410), 1.0);
        assert!((env.gain_at(6615) - 0.5).abs() < 1e-9);
        assert!(env.gain_at(8819) < 1e-3);
    }

    #[test]
    fn sustain_is_flat() {
        let env = NoteEnvelope::from_ms(10.0, 5.0, 50.0, 5.0);
        for frame in env.attack_end..=env.sustain_end {
            assert_eq!(env.gain_at(frame), 1.0);
        }
    }

    #[test]
    fn zero_length_ramps_are_full_gain() {
        let env = NoteEnvelope::from_ms(0.0, 0.0, 20.0, 0.0);
        assert_eq!(env.gain_at(0), 1.0);
        assert_eq!(env.gain_at(env.end - 1), 1.0);
        assert_eq!(env.len(), 882);
    }
}
