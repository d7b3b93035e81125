//! Keyframe animation — typed control points and their dense interpolation.

pub mod interpolate;
pub mod keyframe;
pub mod value;

pub use interpolate::{
    ChannelSnapshot, interpolate, process_all_channels, process_channel_as_bool,
    process_channel_as_f64, process_channel_as_int,
};
pub use keyframe::{Animation, ChannelId, Interpolation, Keyframe, insert};
pub use value::{NumericValue, ValueKind};
