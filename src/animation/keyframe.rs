//! Keyframes and the per-channel keyframe store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::NumericValue;

/// Identifier of an animated parameter stream.
pub type ChannelId = u32;

/// How a channel moves away from a keyframe towards the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Constant,
    Linear,
    Cubic,
    Cosine,
    Exponential,
}

/// A timestamped control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub channel: ChannelId,
    /// Offset from the start of the buffer, in milliseconds.
    pub time_ms: f64,
    pub interpolation: Interpolation,
    pub value: NumericValue,
}

impl Keyframe {
    pub fn new(
        channel: ChannelId,
        time_ms: f64,
        interpolation: Interpolation,
        value: impl Into<NumericValue>,
    ) -> Self {
        Keyframe {
            channel,
            time_ms,
            interpolation,
            value: value.into(),
        }
    }
}

/// Total order over keyframe times, so `f64` can key a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct TimeKey(f64);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Keyframes grouped by channel, each channel ordered by time.
///
/// Serializes as a flat list of keyframes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Animation {
    channels: BTreeMap<ChannelId, BTreeMap<TimeKey, Keyframe>>,
}

impl Animation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyframe, replacing any keyframe already at the same
    /// channel and time.
    pub fn insert(&mut self, keyframe: Keyframe) {
        self.channels
            .entry(keyframe.channel)
            .or_default()
            .insert(TimeKey(keyframe.time_ms), keyframe);
    }

    /// Channel ids in ascending order.
    pub fn channel_ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.channels.keys().copied()
    }

    /// The keyframes of one channel in time order (empty if unknown).
    pub fn keyframes(&self, channel: ChannelId) -> Vec<&Keyframe> {
        self.channels
            .get(&channel)
            .map(|frames| frames.values().collect())
            .unwrap_or_default()
    }

    /// Total number of keyframes across all channels.
    pub fn len(&self) -> usize {
        self.channels.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Keyframe>> for Animation {
    fn from(keyframes: Vec<Keyframe>) -> Self {
        keyframes.into_iter().collect()
    }
}

impl From<Animation> for Vec<Keyframe> {
    fn from(animation: Animation) -> Self {
        animation
            .channels
            .into_values()
            .flat_map(BTreeMap::into_values)
            .collect()
    }
}

impl FromIterator<Keyframe> for Animation {
    fn from_iter<I: IntoIterator<Item = Keyframe>>(iter: I) -> Self {
        let mut animation = Animation::new();
        for keyframe in iter {
            animation.insert(keyframe);
        }
        animation
    }
}

/// Insert `keyframe` into `animation`, overwriting on a (channel, time) clash.
pub fn insert(animation: &mut Animation, keyframe: Keyframe) {
    animation.insert(keyframe);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_come_back_time_ordered() {
        let mut anim = Animation::new();
        anim.insert(Keyframe::new(0, 300.0, Interpolation::Linear, 3.0));
        anim.insert(Keyframe::new(0, 100.0, Interpolation::Linear, 1.0));
        anim.insert(Keyframe::new(0, 200.5, Interpolation::Linear, 2.0));

        let times: Vec<f64> = anim.keyframes(0).iter().map(|k| k.time_ms).collect();
        assert_eq!(times, vec![100.0, 200.5, 300.0]);
    }

    #[test]
    fn same_time_overwrites() {
        let mut anim = Animation::new();
        insert(&mut anim, Keyframe::new(2, 50.0, Interpolation::Constant, 1_i64));
        insert(&mut anim, Keyframe::new(2, 50.0, Interpolation::Cosine, 9_i64));

        let frames = anim.keyframes(2);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].value, NumericValue::Int(9));
        assert_eq!(frames[0].interpolation, Interpolation::Cosine);
    }

    #[test]
    fn channels_are_independent() {
        let mut anim = Animation::new();
        anim.insert(Keyframe::new(1, 0.0, Interpolation::Linear, 0.0));
        anim.insert(Keyframe::new(0, 0.0, Interpolation::Linear, true));

        assert_eq!(anim.channel_ids().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(anim.len(), 2);
        assert!(anim.keyframes(5).is_empty());
    }

    #[test]
    fn json_round_trip() {
        let json = r#"[
            {"channel": 0, "time_ms": 0.0, "interpolation": "linear", "value": 0.0},
            {"channel": 0, "time_ms": 1000.0, "interpolation": "constant", "value": 1.0},
            {"channel": 1, "time_ms": 0.0, "interpolation": "exponential", "value": 4}
        ]"#;
        let anim: Animation = serde_json::from_str(json).expect("parse failed");
        assert_eq!(anim.len(), 3);
        assert_eq!(anim.keyframes(1)[0].value, NumericValue::Int(4));

        let text = serde_json::to_string(&anim).unwrap();
        let back: Animation = serde_json::from_str(&text).unwrap();
        assert_eq!(back.keyframes(0), anim.keyframes(0));
    }
}
