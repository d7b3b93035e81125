//! WAV sampler — imports a time range of any PCM WAV file into a buffer.
//!
//! The source may be mono or stereo, any sample rate, and 8 to 64 bits
//! deep. Frames are picked by truncation at each 44.1 kHz output time and
//! added onto whatever the target already holds.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use super::buffer::{AudioBuffer, SAMPLE_MS, SAMPLE_RATE_HZ, frame_from_ms};
use super::wav::{WavHeader, read_header};
use crate::config::ResampleConfig;
use crate::error::EngineError;

/// Absorbs floating error when converting a time to a source frame.
const FRAME_EPSILON: f64 = 1e-6;

/// Which part of the source goes where in the target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleRange {
    pub target_start_ms: f64,
    pub source_start_ms: f64,
    /// Zero or negative means "to the end of the file".
    pub duration_ms: f64,
}

/// One sample as a signed 16-bit word.
///
/// 8-bit PCM is unsigned and gets re-centred; deeper samples keep their
/// most significant 16 bits.
fn decode_sample(bytes: &[u8], bits_per_sample: u16) -> u16 {
    if bits_per_sample == 8 {
        return ((bytes[0] ^ 0x80) as u16) << 8;
    }
    let word = bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (b as u64) << (8 * i));
    (word >> (bits_per_sample - 16)) as u16
}

/// Left and right samples of one source frame; mono is duplicated.
fn decode_frame(header: &WavHeader, frame: &[u8]) -> (u16, u16) {
    let width = header.bytes_per_sample();
    let left = decode_sample(&frame[..width], header.bits_per_sample);
    if header.channels == 1 {
        (left, left)
    } else {
        (left, decode_sample(&frame[width..2 * width], header.bits_per_sample))
    }
}

/// Convert raw source bytes to 44.1 kHz stereo frames.
///
/// `first_frame` is the absolute target frame the output starts at; its
/// parity picks the direction of the bias. At most `max_frames` frames
/// are produced, fewer if the source runs out.
fn resample(
    header: &WavHeader,
    bytes: &[u8],
    first_frame: usize,
    max_frames: usize,
    config: &ResampleConfig,
) -> Vec<(u16, u16)> {
    let frame_bytes = header.frame_bytes();
    let available = bytes.len() / frame_bytes;
    let same_rate = header.sample_rate == SAMPLE_RATE_HZ;
    let source_rate = header.sample_rate as f64;

    let mut out = Vec::with_capacity(max_frames.min(available.saturating_mul(2)));
    for j in 0..max_frames {
        let source_frame = if same_rate {
            j
        } else {
            let bias = if (first_frame + j) % 2 == 0 {
                config.bias_ms
            } else {
                -config.bias_ms
            };
            let time_ms = (j as f64 * SAMPLE_MS + bias).max(0.0);
            (time_ms / 1000.0 * source_rate + FRAME_EPSILON).floor() as usize
        };

        if source_frame >= available {
            break;
        }
        let at = source_frame * frame_bytes;
        out.push(decode_frame(header, &bytes[at..at + frame_bytes]));
    }
    out
}

/// Read up to `len` bytes at `offset`; a truncated file yields what exists.
fn read_range<R: Read + Seek>(reader: &mut R, offset: u64, len: u64) -> Result<Vec<u8>, EngineError> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut bytes = Vec::with_capacity(len as usize);
    reader.take(len).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < len {
        warn!(
            expected = len,
            found = bytes.len(),
            "WAV data ends before its declared size"
        );
    }
    Ok(bytes)
}

/// Import `range` of the WAV stream in `reader` into `target`.
///
/// Returns the number of frames added. The target is only touched once the
/// header and the requested bytes have been read successfully.
pub fn sample_from<R: Read + Seek>(
    reader: &mut R,
    target: &mut AudioBuffer,
    range: SampleRange,
    config: &ResampleConfig,
) -> Result<usize, EngineError> {
    let header = read_header(reader)?;

    let duration_ms = if range.duration_ms > 0.0 {
        range.duration_ms
    } else {
        header.duration_ms()
    };

    let start = header.byte_offset(range.source_start_ms);
    let end = header.byte_offset(range.source_start_ms + duration_ms);
    let bytes = read_range(reader, header.data_offset + start, end - start)?;

    let first_frame = frame_from_ms(range.target_start_ms);
    let max_frames = frame_from_ms(range.target_start_ms + duration_ms).saturating_sub(first_frame);
    let frames = resample(&header, &bytes, first_frame, max_frames, config);

    debug!(
        source_rate = header.sample_rate,
        source_channels = header.channels,
        source_bytes = bytes.len(),
        frames = frames.len(),
        first_frame,
        "Sampled WAV"
    );

    if frames.is_empty() {
        return Ok(0);
    }
    let len = first_frame
        .checked_add(frames.len())
        .and_then(|end| end.checked_mul(2))
        .ok_or(EngineError::BufferTooLarge { samples: usize::MAX })?;
    target.grow_to(len);
    for (i, &(left, right)) in frames.iter().enumerate() {
        target.add_frame(first_frame + i, left, right);
    }
    Ok(frames.len())
}

/// Import `range` of the WAV file at `path` into `target`.
pub fn sample(
    path: impl AsRef<Path>,
    target: &mut AudioBuffer,
    range: SampleRange,
    config: &ResampleConfig,
) -> Result<usize, EngineError> {
    let mut reader = BufReader::new(File::open(path)?);
    sample_from(&mut reader, target, range, config)
}

/// Import the whole WAV file at `path`, placed at `target_start_ms`.
pub fn sample_full(
    path: impl AsRef<Path>,
    target: &mut AudioBuffer,
    target_start_ms: f64,
    config: &ResampleConfig,
) -> Result<usize, EngineError> {
    let range = SampleRange {
        target_start_ms,
        ..SampleRange::default()
    };
    sample(path, target, range, config)
}
