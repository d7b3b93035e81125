//! Oscillators addressed by absolute frame number.
//!
//! Every waveform is a pure function of the frame index, so notes written
//! separately into one buffer stay phase-aligned with each other.

use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};

use super::buffer::SAMPLE_RATE_HZ;
use crate::error::EngineError;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

impl TryFrom<u32> for Waveform {
    type Error = EngineError;

    /// Host waveform codes: 0 sine, 1 saw, 2 square, 3 triangle, 4 noise.
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Waveform::Sine),
            1 => Ok(Waveform::Saw),
            2 => Ok(Waveform::Square),
            3 => Ok(Waveform::Triangle),
            4 => Ok(Waveform::Noise),
            other => Err(EngineError::UnknownWaveform(other)),
        }
    }
}

/// A waveform at a fixed frequency, sampled on the 44.1 kHz frame grid.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub waveform: Waveform,
    pub frequency: f64,
    /// Whole frames per cycle for the periodic non-sine shapes.
    period_frames: usize,
    rng: ThreadRng,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64) -> Self {
        let period = (SAMPLE_RATE_HZ as f64 / frequency).floor();
        let period_frames = if period.is_finite() && period >= 1.0 {
            period as usize
        } else if period.is_infinite() && period > 0.0 {
            usize::MAX
        } else {
            1
        };

        Oscillator {
            waveform,
            frequency,
            period_frames,
            rng: rand::thread_rng(),
        }
    }

    /// Value in `[-1, 1]` at `frame`.
    pub fn sample(&mut self, frame: usize) -> f64 {
        match self.waveform {
            Waveform::Sine => self.sine(frame),
            Waveform::Saw => self.saw(frame),
            Waveform::Square => self.square(frame),
            Waveform::Triangle => self.saw(frame).abs() * 2.0 - 1.0,
            Waveform::Noise => self.rng.gen_range(-1.0..=1.0),
        }
    }

    fn sine(&self, frame: usize) -> f64 {
        (2.0 * PI * frame as f64 * self.frequency / SAMPLE_RATE_HZ as f64).sin()
    }

    /// Rises from -1 towards +1 over one period, then drops.
    fn saw(&self, frame: usize) -> f64 {
        let position = frame % self.period_frames;
        position as f64 / self.period_frames as f64 * 2.0 - 1.0
    }

    fn square(&self, frame: usize) -> f64 {
        if frame % self.period_frames < self.period_frames / 2 {
            1.0
        } else {
            -1.0
        }
    }
}
