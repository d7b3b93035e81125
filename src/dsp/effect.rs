//! Animated effects applied in place over a whole buffer.
//!
//! The effect walks the buffer one frame per tick, reading each tick's
//! channel snapshot from the animation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::buffer::{AMP_MAX, AudioBuffer, SAMPLE_MS};
use crate::animation::{Animation, ChannelSnapshot, process_all_channels};

/// Animation channel read by [`EffectKind::Distortion`] as the dry/wet mix.
pub const DISTORTION_DRY_WET: u32 = 0;
/// Animation channel read by [`EffectKind::Distortion`] as the clip threshold.
pub const DISTORTION_THRESHOLD: u32 = 1;

/// Effects the processor knows how to apply.
///
/// Codes without a transform are kept as `Unsupported` and leave the buffer
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Distortion,
    Unsupported(u32),
}

impl From<u32> for EffectKind {
    fn from(code: u32) -> Self {
        match code {
            0 => EffectKind::Distortion,
            other => EffectKind::Unsupported(other),
        }
    }
}

/// Blend from `dry` towards `wet` by `mix` in `[0, 1]`.
fn fader(dry: i16, wet: i16, mix: f64) -> i16 {
    ((wet as f64 - dry as f64) * mix + dry as f64) as i16
}

/// Hard clip with an animated threshold, cross-faded by dry/wet.
///
/// Channel 0: dry/wet in `[0, 1]`. Channel 1: threshold as a fraction of
/// full scale. Either channel missing, or a dry/wet of 0, passes through.
fn distort(input: u16, values: &ChannelSnapshot) -> u16 {
    let (Some(dry_wet), Some(threshold)) = (
        values.get(&DISTORTION_DRY_WET),
        values.get(&DISTORTION_THRESHOLD),
    ) else {
        return input;
    };

    let dry_wet = dry_wet.as_f64();
    if dry_wet == 0.0 {
        return input;
    }

    let signed = input as i16;
    let top = (AMP_MAX * threshold.as_f64()) as i16;
    let bottom = top.saturating_neg();

    let mut clipped = signed;
    if clipped > top {
        clipped = top;
    }
    if clipped < bottom {
        clipped = bottom;
    }

    fader(signed, clipped, dry_wet) as u16
}

/// Run `kind` over every frame of `buffer`, driven by `animation`.
pub fn apply_effect(buffer: &mut AudioBuffer, animation: &Animation, kind: EffectKind) {
    let transform: fn(u16, &ChannelSnapshot) -> u16 = match kind {
        EffectKind::Distortion => distort,
        EffectKind::Unsupported(code) => {
            debug!(code, "No transform for effect code, leaving buffer untouched");
            return;
        }
    };

    let duration_ms = buffer.duration_ms();
    let samples = buffer.samples_mut();
    let mut index = 0;
    process_all_channels(animation, SAMPLE_MS, 0.0, duration_ms, |_, values| {
        if index + 1 < samples.len() {
            samples[index] = transform(samples[index], values);
            samples[index + 1] = transform(samples[index + 1], values);
        }
        index += 2;
    });
}
