//! WAV renderer — writes an AudioBuffer as a 16-bit stereo PCM WAV file.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::info;

use super::buffer::{AudioBuffer, BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE_HZ};
use super::wav::FORMAT_PCM;
use crate::error::EngineError;

/// Bytes between the start of the RIFF size field's payload and the data.
const HEADER_OVERHEAD: u32 = 36;

/// Write `buffer` to any seekable sink, returning the bytes written.
///
/// Chunk sizes are written as placeholders and patched once the sample
/// data is out.
pub fn write_wav_to<W: Write + Seek>(writer: &mut W, buffer: &AudioBuffer) -> Result<u64, EngineError> {
    let too_large = || EngineError::BufferTooLarge {
        samples: buffer.len(),
    };
    let expected_data = u32::try_from(buffer.len() * 2).map_err(|_| too_large())?;
    expected_data.checked_add(HEADER_OVERHEAD).ok_or_else(too_large)?;

    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let byte_rate = SAMPLE_RATE_HZ * block_align as u32;
    let start = writer.stream_position()?;

    // RIFF header (size patched below)
    writer.write_all(b"RIFF")?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&FORMAT_PCM.to_le_bytes())?;
    writer.write_all(&CHANNELS.to_le_bytes())?;
    writer.write_all(&SAMPLE_RATE_HZ.to_le_bytes())?;
    writer.write_all(&byte_rate.to_le_bytes())?;
    writer.write_all(&block_align.to_le_bytes())?;
    writer.write_all(&BITS_PER_SAMPLE.to_le_bytes())?;

    // data chunk (size patched below)
    writer.write_all(b"data")?;
    let data_size_pos = writer.stream_position()?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&buffer.to_le_bytes())?;

    let end = writer.stream_position()?;
    let data_size = (end - data_size_pos - 4) as u32;

    writer.seek(SeekFrom::Start(data_size_pos))?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.seek(SeekFrom::Start(start + 4))?;
    writer.write_all(&(HEADER_OVERHEAD + data_size).to_le_bytes())?;
    writer.seek(SeekFrom::Start(end))?;

    Ok(end - start)
}

/// Encode `buffer` as WAV bytes in memory.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, EngineError> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.len() * 2));
    write_wav_to(&mut cursor, buffer)?;
    Ok(cursor.into_inner())
}

/// Write `buffer` to a WAV file at `path`, replacing any existing file.
pub fn write_wav(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<(), EngineError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write_wav_to(&mut writer, buffer)?;
    writer.flush()?;
    info!(path = %path.display(), bytes = written, frames = buffer.frames(), "Wrote WAV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize) -> AudioBuffer {
        let pcm: Vec<i16> = (0..frames * 2).map(|i| (i as i16).wrapping_mul(97)).collect();
        AudioBuffer::from(pcm)
    }

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav(&tone(100)).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let format = u16::from_le_bytes([wav[20], wav[21]]);
        assert_eq!(format, 1);
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
        let byte_rate = u32::from_le_bytes([wav[28], wav[29], wav[30], wav[31]]);
        assert_eq!(byte_rate, 176400);
        let block_align = u16::from_le_bytes([wav[32], wav[33]]);
        assert_eq!(block_align, 4);
        let bits = u16::from_le_bytes([wav[34], wav[35]]);
        assert_eq!(bits, 16);
    }

    #[test]
    fn wav_size_correct() {
        // 0.5s = 22050 frames * 2 channels * 2 bytes = 88200 data bytes
        let wav = encode_wav(&AudioBuffer::silent(22050)).unwrap();

        let riff_size = u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 88200);
        assert_eq!(riff_size, 36 + 88200);
        assert_eq!(wav.len(), 44 + 88200);
    }

    #[test]
    fn samples_follow_the_header_little_endian() {
        let buf = tone(8);
        let wav = encode_wav(&buf).unwrap();
        assert_eq!(&wav[44..], buf.to_le_bytes().as_slice());
    }

    #[test]
    fn empty_buffer_writes_bare_header() {
        let wav = encode_wav(&AudioBuffer::new()).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 0);
    }

    #[test]
    fn writes_file_matching_memory_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let buf = tone(441);

        write_wav(&path, &buf).expect("write failed");
        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, encode_wav(&buf).unwrap());
    }

    #[test]
    fn readable_by_hound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hound.wav");
        let buf = tone(64);
        write_wav(&path, &buf).unwrap();

        let mut reader = hound::WavReader::open(&path).expect("hound rejected output");
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        let expected: Vec<i16> = buf.samples().iter().map(|&s| s as i16).collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(matches!(
            write_wav(&path, &tone(4)),
            Err(EngineError::Io(_))
        ));
    }
}
