//! The engine's fixed-format audio buffer.
//!
//! 44100 Hz, 16-bit, stereo, interleaved `[L, R, L, R, …]`. Samples are
//! stored as raw `u16` words; they are two's-complement signed values and
//! every write into the buffer is a wrapping add.

/// Output sample rate in Hz.
pub const SAMPLE_RATE_HZ: u32 = 44100;
/// Interleaved channel count.
pub const CHANNELS: u16 = 2;
pub const BITS_PER_SAMPLE: u16 = 16;
/// One tick of the sample grid, in milliseconds.
pub const SAMPLE_MS: f64 = 1000.0 / SAMPLE_RATE_HZ as f64;
/// Largest positive sample amplitude.
pub const AMP_MAX: f64 = 32767.0;

/// Absorbs floating error when converting milliseconds to frames.
const FRAME_EPSILON: f64 = 1e-6;

/// Frame number (sample pair) at `ms`, truncating.
///
/// NaN and non-positive times map to frame 0; times past the addressable
/// range saturate at `usize::MAX`.
pub fn frame_from_ms(ms: f64) -> usize {
    if ms.is_nan() || ms <= 0.0 {
        return 0;
    }
    if ms == f64::INFINITY {
        return usize::MAX;
    }
    (ms / SAMPLE_MS + FRAME_EPSILON).floor() as usize
}

/// Buffer index of the left sample of the frame at `ms`. Always even.
pub fn index_from_ms(ms: f64) -> usize {
    frame_from_ms(ms).saturating_mul(CHANNELS as usize)
}

/// A growable interleaved stereo buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<u16>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing interleaved samples. An odd trailing sample is dropped.
    pub fn from_samples(mut samples: Vec<u16>) -> Self {
        if samples.len() % 2 == 1 {
            samples.pop();
        }
        AudioBuffer { samples }
    }

    /// Zero-filled buffer holding `frames` sample pairs.
    pub fn silent(frames: usize) -> Self {
        AudioBuffer {
            samples: vec![0; frames * CHANNELS as usize],
        }
    }

    /// Number of `u16` samples (twice the frame count).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / CHANNELS as usize
    }

    pub fn duration_ms(&self) -> f64 {
        self.frames() as f64 * SAMPLE_MS
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.samples
    }

    /// Signed view of the sample at `index`.
    pub fn signed(&self, index: usize) -> i16 {
        self.samples[index] as i16
    }

    /// Grow (zero-filled) so that at least `len` samples exist. Never shrinks.
    pub fn grow_to(&mut self, len: usize) {
        let len = len + len % 2;
        if self.samples.len() < len {
            self.samples.resize(len, 0);
        }
    }

    /// Add a sample pair at `frame`, growing the buffer if needed.
    pub fn add_frame(&mut self, frame: usize, left: u16, right: u16) {
        let index = frame * CHANNELS as usize;
        self.grow_to(index + 2);
        self.samples[index] = self.samples[index].wrapping_add(left);
        self.samples[index + 1] = self.samples[index + 1].wrapping_add(right);
    }

    /// Raw little-endian bytes, laid out exactly as a WAV data chunk.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

impl From<Vec<i16>> for AudioBuffer {
    fn from(pcm: Vec<i16>) -> Self {
        AudioBuffer::from_samples(pcm.into_iter().map(|s| s as u16).collect())
    }
}
