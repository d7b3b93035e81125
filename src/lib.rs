pub mod animation;
pub mod config;
pub mod dsp;
pub mod error;

pub use animation::{Animation, Interpolation, Keyframe, NumericValue};
pub use config::{EngineConfig, ResampleConfig};
pub use dsp::buffer::AudioBuffer;
pub use dsp::effect::EffectKind;
pub use dsp::engine::Engine;
pub use dsp::oscillator::Waveform;
pub use dsp::synth::Note;
pub use error::{EngineError, WavError};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
