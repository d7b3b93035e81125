//! Mixer — sums one buffer into another at a time offset.

use tracing::{debug, warn};

use super::buffer::{AudioBuffer, frame_from_ms};

/// Add a range of `source` into `target`.
///
/// Frames `[source_start_ms, source_start_ms + duration_ms)` of the source
/// land at `target_start_ms` in the target. A `duration_ms` of 0 or less
/// takes the rest of the source. The range is clamped to the source; the target grows
/// to fit. Returns the number of frames mixed.
pub fn mix(
    target: &mut AudioBuffer,
    source: &AudioBuffer,
    target_start_ms: f64,
    source_start_ms: f64,
    duration_ms: f64,
) -> usize {
    let first = frame_from_ms(source_start_ms).min(source.frames());
    let last = if duration_ms > 0.0 {
        frame_from_ms(source_start_ms + duration_ms).min(source.frames())
    } else {
        source.frames()
    };
    if first >= last {
        return 0;
    }

    let offset = frame_from_ms(target_start_ms);
    let count = last - first;
    let Some(len) = offset.checked_add(count).and_then(|end| end.checked_mul(2)) else {
        warn!(offset, "Mix target position is beyond any addressable frame");
        return 0;
    };
    debug!(frames = count, offset, "Mixing buffer");

    target.grow_to(len);
    let src = source.samples();
    for (i, frame) in (first..last).enumerate() {
        target.add_frame(offset + i, src[frame * 2], src[frame * 2 + 1]);
    }

    count
}
