//! RIFF/WAVE header parsing and geometry.
//!
//! Only the canonical layout is understood: `RIFF`, `WAVE`, a `fmt ` chunk
//! and the `data` chunk immediately after it.

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::error::{EngineError, WavError};

/// Integer PCM encoding tag.
pub const FORMAT_PCM: u16 = 1;

/// Absorbs floating error when converting milliseconds to frames.
const FRAME_EPSILON: f64 = 1e-6;

/// What the `fmt ` and `data` chunk headers of a file say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    /// Block alignment as declared by the file.
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Absolute file offset of the first sample byte.
    pub data_offset: u64,
    /// Declared size of the data chunk in bytes.
    pub data_size: u32,
}

impl WavHeader {
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8) as usize
    }

    /// Bytes per frame, derived from channel count and bit depth.
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * self.bytes_per_sample()
    }

    /// Duration of the whole data chunk in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.data_size as f64 / self.byte_rate as f64 * 1000.0
    }

    /// Offset into the data chunk of the frame at `ms`, clamped to the chunk.
    pub fn byte_offset(&self, ms: f64) -> u64 {
        if ms <= 0.0 || ms.is_nan() {
            return 0;
        }
        let frame = (ms / 1000.0 * self.sample_rate as f64 + FRAME_EPSILON).floor();
        let offset = frame * self.frame_bytes() as f64;
        offset.min(self.data_size as f64) as u64
    }
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, EngineError> {
    let mut word = [0u8; 2];
    reader.read_exact(&mut word)?;
    Ok(u16::from_le_bytes(word))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, EngineError> {
    let mut word = [0u8; 4];
    reader.read_exact(&mut word)?;
    Ok(u32::from_le_bytes(word))
}

fn expect_tag<R: Read>(reader: &mut R, expected: &'static str) -> Result<(), EngineError> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;
    if found != expected.as_bytes() {
        return Err(WavError::BadMagic { expected, found }.into());
    }
    Ok(())
}

/// Parse and validate the header, leaving `reader` at the first data byte.
pub fn read_header<R: Read + Seek>(reader: &mut R) -> Result<WavHeader, EngineError> {
    reader.seek(SeekFrom::Start(0))?;

    expect_tag(reader, "RIFF")?;
    let _riff_size = read_u32(reader)?;
    expect_tag(reader, "WAVE")?;
    expect_tag(reader, "fmt ")?;

    let fmt_size = read_u32(reader)?;
    if fmt_size < 16 {
        return Err(WavError::FormatChunkTooSmall(fmt_size).into());
    }

    let encoding = read_u16(reader)?;
    if encoding != FORMAT_PCM {
        return Err(WavError::UnsupportedEncoding(encoding).into());
    }

    let channels = read_u16(reader)?;
    if !(1..=2).contains(&channels) {
        return Err(WavError::UnsupportedChannelCount(channels).into());
    }

    let sample_rate = read_u32(reader)?;
    let byte_rate = read_u32(reader)?;
    let block_align = read_u16(reader)?;
    let bits_per_sample = read_u16(reader)?;

    if bits_per_sample == 0 || bits_per_sample > 64 || bits_per_sample % 8 != 0 {
        return Err(WavError::UnsupportedBitDepth(bits_per_sample).into());
    }
    if sample_rate == 0 || byte_rate == 0 {
        return Err(WavError::InvalidRate { sample_rate, byte_rate }.into());
    }

    // The data chunk header follows the fmt chunk, whatever its size.
    let data_header = 20 + fmt_size as u64;
    reader.seek(SeekFrom::Start(data_header))?;
    expect_tag(reader, "data")?;
    let data_size = read_u32(reader)?;

    let header = WavHeader {
        channels,
        sample_rate,
        byte_rate,
        block_align,
        bits_per_sample,
        data_offset: data_header + 8,
        data_size,
    };

    if block_align as usize != header.frame_bytes() {
        warn!(
            declared = block_align,
            derived = header.frame_bytes(),
            "Block alignment disagrees with channels and bit depth, using derived"
        );
    }
    debug!(
        channels,
        sample_rate,
        bits_per_sample,
        data_size,
        "Parsed WAV header"
    );

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A minimal header with the given fields and `data_len` zero bytes.
    fn header_bytes(
        encoding: u16,
        channels: u16,
        sample_rate: u32,
        bits: u16,
        data_len: u32,
    ) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let byte_rate = sample_rate * block_align as u32;
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&encoding.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        buf.resize(buf.len() + data_len as usize, 0);
        buf
    }

    fn parse(bytes: Vec<u8>) -> Result<WavHeader, EngineError> {
        read_header(&mut Cursor::new(bytes))
    }

    #[test]
    fn parses_canonical_header() {
        let header = parse(header_bytes(1, 1, 22050, 8, 22050)).expect("valid header");
        assert_eq!(header.channels, 1);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.frame_bytes(), 1);
        assert_eq!(header.data_offset, 44);
        assert!((header.duration_ms() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn honours_extended_fmt_chunk() {
        let mut bytes = header_bytes(1, 2, 44100, 16, 8);
        // Grow fmt to 18 bytes (cbSize = 0) and shift the data chunk.
        bytes[16..20].copy_from_slice(&18u32.to_le_bytes());
        bytes.splice(36..36, [0u8, 0u8]);
        let header = parse(bytes).expect("valid header");
        assert_eq!(header.data_offset, 46);
        assert_eq!(header.data_size, 8);
    }

    #[test]
    fn rejects_bad_riff_magic() {
        let mut bytes = header_bytes(1, 2, 44100, 16, 4);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert!(matches!(
            parse(bytes),
            Err(EngineError::Wav(WavError::BadMagic { expected: "RIFF", .. }))
        ));
    }

    #[test]
    fn rejects_non_pcm_and_wide_layouts() {
        assert!(matches!(
            parse(header_bytes(3, 2, 44100, 32, 8)),
            Err(EngineError::Wav(WavError::UnsupportedEncoding(3)))
        ));
        assert!(matches!(
            parse(header_bytes(1, 3, 44100, 16, 6)),
            Err(EngineError::Wav(WavError::UnsupportedChannelCount(3)))
        ));
        assert!(matches!(
            parse(header_bytes(1, 2, 44100, 12, 6)),
            Err(EngineError::Wav(WavError::UnsupportedBitDepth(12)))
        ));
    }

    #[test]
    fn rejects_missing_data_chunk() {
        let mut bytes = header_bytes(1, 2, 44100, 16, 4);
        bytes[36..40].copy_from_slice(b"LIST");
        assert!(matches!(
            parse(bytes),
            Err(EngineError::Wav(WavError::BadMagic { expected: "data", .. }))
        ));
    }

    #[test]
    fn byte_offsets_are_frame_aligned_and_clamped() {
        let header = parse(header_bytes(1, 2, 48000, 24, 600)).unwrap();
        assert_eq!(header.frame_bytes(), 6);
        // 1ms at 48kHz = 48 frames.
        assert_eq!(header.byte_offset(1.0), 288);
        assert_eq!(header.byte_offset(0.51) % 6, 0);
        assert_eq!(header.byte_offset(10_000.0), 600);
    }
}
