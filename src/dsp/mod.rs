//! DSP — the fixed-format stereo buffer and everything that writes into it.
//!
//! Buffers are always 44.1 kHz, two channels, 16-bit. Synthesis, effects,
//! WAV import and mixing all add into an existing buffer rather than
//! replacing its content.

pub mod buffer;
pub mod effect;
pub mod engine;
pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
pub mod sampler;
pub mod synth;
pub mod wav;
