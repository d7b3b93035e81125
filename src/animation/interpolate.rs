//! Interpolation engine — turns sparse keyframes into dense, per-tick values.
//!
//! Ticks sit on a grid anchored at 0 ms: tick `k` is at `k * period_ms`.
//! Each channel walks its keyframes with a four-slot window and fills the
//! ticks between the middle two, using the outer two as tangent context.
//! After the last keyframe the channel holds its final value until the
//! caller's bound.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use tracing::debug;

use super::keyframe::{Animation, ChannelId, Interpolation, Keyframe};
use super::value::{NumericValue, ValueKind};

/// Every animated channel's value at one tick.
pub type ChannelSnapshot = BTreeMap<ChannelId, NumericValue>;

/// Tolerance, in ticks, for deciding which grid point a time lands on.
const TICK_EPSILON: f64 = 1e-6;

/// Window slots: `[after_b, b, a, before_a]`, most recent first.
type Window = [usize; 4];

/// Blend between `a` and `b` at `alpha` in `[0, 1]`.
///
/// `before_a` and `after_b` are only read by [`Interpolation::Cubic`].
pub fn interpolate(
    kind: Interpolation,
    a: f64,
    b: f64,
    before_a: f64,
    after_b: f64,
    alpha: f64,
) -> f64 {
    match kind {
        Interpolation::Constant => a,
        Interpolation::Linear => (b - a) * alpha + a,
        Interpolation::Cubic => {
            let mu2 = alpha * alpha;
            let a0 = after_b - b - before_a + a;
            let a1 = before_a - a - a0;
            let a2 = b - before_a;
            a0 * alpha * mu2 + a1 * mu2 + a2 * alpha + a
        }
        Interpolation::Cosine => {
            let ease = (1.0 - (alpha * PI).cos()) / 2.0;
            a * (1.0 - ease) + b * ease
        }
        Interpolation::Exponential => a * (b / a).powf(alpha),
    }
}

/// First tick index at or after `time_ms`.
fn first_tick(time_ms: f64, period_ms: f64) -> i64 {
    (time_ms / period_ms - TICK_EPSILON).ceil() as i64
}

fn tick_time(tick: i64, period_ms: f64) -> f64 {
    tick as f64 * period_ms
}

/// Fill the ticks in `[time(a), time(b))` for the window's middle pair.
fn emit_segment<E, S>(
    frames: &[&Keyframe],
    window: &Window,
    period_ms: f64,
    until_tick: i64,
    extract: &E,
    sink: &mut S,
) where
    E: Fn(&NumericValue) -> f64,
    S: FnMut(i64, f64),
{
    let from = frames[window[2]];
    let to = frames[window[1]];

    let first = first_tick(from.time_ms, period_ms);
    let end = first_tick(to.time_ms, period_ms).min(until_tick);
    if first >= end {
        return;
    }

    let a = extract(&from.value);
    let b = extract(&to.value);
    let before_a = extract(&frames[window[3]].value);
    let after_b = extract(&frames[window[0]].value);

    if from.interpolation == Interpolation::Exponential && (a == 0.0 || b / a < 0.0) {
        debug!(
            channel = from.channel,
            from_ms = from.time_ms,
            to_ms = to.time_ms,
            "Skipping exponential segment outside the power domain ({a} -> {b})"
        );
        return;
    }

    let span = to.time_ms - from.time_ms;
    for tick in first..end {
        let alpha = ((tick_time(tick, period_ms) - from.time_ms) / span).clamp(0.0, 1.0);
        let value = interpolate(from.interpolation, a, b, before_a, after_b, alpha);
        if value.is_finite() {
            sink(tick, value);
        }
    }
}

/// Walk one channel, calling `sink(tick, value)` in increasing tick order.
///
/// Returns `false` when the channel has no keyframes or the period is not
/// positive.
fn process_channel<E, S>(
    animation: &Animation,
    channel: ChannelId,
    period_ms: f64,
    until_ms: f64,
    extract: E,
    mut sink: S,
) -> bool
where
    E: Fn(&NumericValue) -> f64,
    S: FnMut(i64, f64),
{
    let frames = animation.keyframes(channel);
    let Some(last) = frames.last() else {
        return false;
    };
    if !(period_ms > 0.0 && period_ms.is_finite()) {
        return false;
    }

    let until_tick = if until_ms.is_finite() {
        first_tick(until_ms, period_ms)
    } else {
        i64::MAX
    };

    // All slots start on the first keyframe; each visit shifts the window.
    let mut window: Window = [0; 4];
    for index in 0..frames.len() {
        window = [index, window[0], window[1], window[2]];
        emit_segment(&frames, &window, period_ms, until_tick, &extract, &mut sink);
    }
    // Two more shifts so the final segment gets its turn in the middle.
    for _ in 0..2 {
        window = [window[0], window[0], window[1], window[2]];
        emit_segment(&frames, &window, period_ms, until_tick, &extract, &mut sink);
    }

    if until_ms.is_finite() {
        let held = extract(&last.value);
        for tick in first_tick(last.time_ms, period_ms)..until_tick {
            sink(tick, held);
        }
    }

    true
}

/// Process `channel` under the interpretation `kind`, delivering typed values.
fn process_typed<S>(
    animation: &Animation,
    channel: ChannelId,
    kind: ValueKind,
    period_ms: f64,
    until_ms: f64,
    mut sink: S,
) -> bool
where
    S: FnMut(i64, NumericValue),
{
    match kind {
        ValueKind::Bool => process_channel(
            animation,
            channel,
            period_ms,
            until_ms,
            |v| if v.as_bool() { 1.0 } else { 0.0 },
            |tick, x| sink(tick, NumericValue::Bool(x >= 0.5)),
        ),
        ValueKind::Int => process_channel(
            animation,
            channel,
            period_ms,
            until_ms,
            |v| v.as_i64() as f64,
            |tick, x| sink(tick, NumericValue::Int(x.round() as i64)),
        ),
        ValueKind::Float => process_channel(
            animation,
            channel,
            period_ms,
            until_ms,
            NumericValue::as_f64,
            |tick, x| sink(tick, NumericValue::Float(x)),
        ),
    }
}

/// Interpolate `channel` as booleans (threshold 0.5).
///
/// `sink` receives `(time_ms, value)` for every tick before `until_ms`.
pub fn process_channel_as_bool(
    animation: &Animation,
    channel: ChannelId,
    period_ms: f64,
    until_ms: f64,
    mut sink: impl FnMut(f64, bool),
) -> bool {
    process_typed(animation, channel, ValueKind::Bool, period_ms, until_ms, |tick, v| {
        sink(tick_time(tick, period_ms), v.as_bool())
    })
}

/// Interpolate `channel` as integers (rounded to nearest).
pub fn process_channel_as_int(
    animation: &Animation,
    channel: ChannelId,
    period_ms: f64,
    until_ms: f64,
    mut sink: impl FnMut(f64, i64),
) -> bool {
    process_typed(animation, channel, ValueKind::Int, period_ms, until_ms, |tick, v| {
        sink(tick_time(tick, period_ms), v.as_i64())
    })
}

/// Interpolate `channel` as floating-point values.
pub fn process_channel_as_f64(
    animation: &Animation,
    channel: ChannelId,
    period_ms: f64,
    until_ms: f64,
    mut sink: impl FnMut(f64, f64),
) -> bool {
    process_typed(animation, channel, ValueKind::Float, period_ms, until_ms, |tick, v| {
        sink(tick_time(tick, period_ms), v.as_f64())
    })
}

/// Merge every channel into one snapshot per tick over `[start_ms, end_ms)`.
///
/// Each channel is interpreted as the type of its first keyframe. The sink
/// is called once per tick, in time order, with the tick's time and its
/// snapshot; ticks where no channel has data get an empty snapshot.
/// Returns the number of ticks delivered.
pub fn process_all_channels(
    animation: &Animation,
    period_ms: f64,
    start_ms: f64,
    end_ms: f64,
    mut sink: impl FnMut(f64, &ChannelSnapshot),
) -> usize {
    if !(period_ms > 0.0 && period_ms.is_finite()) || !(end_ms > start_ms) {
        return 0;
    }

    let num_samples = ((end_ms - start_ms) / period_ms + TICK_EPSILON).floor() as usize;
    let mut snapshots = vec![ChannelSnapshot::new(); num_samples];
    let origin = start_ms / period_ms;

    for channel in animation.channel_ids() {
        let frames = animation.keyframes(channel);
        let Some(first) = frames.first() else {
            continue;
        };
        let kind = first.value.kind();

        process_typed(animation, channel, kind, period_ms, end_ms, |tick, value| {
            let index = (tick as f64 - origin + TICK_EPSILON).floor();
            if index >= 0.0 && (index as usize) < num_samples {
                snapshots[index as usize].entry(channel).or_insert(value);
            }
        });
    }

    for (index, snapshot) in snapshots.iter().enumerate() {
        sink(start_ms + index as f64 * period_ms, snapshot);
    }

    num_samples
}
