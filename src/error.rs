use std::fmt;
use std::io;

#[derive(Debug)]
pub enum EngineError {
    Io(io::Error),
    Wav(WavError),
    /// The buffer holds more sample bytes than a RIFF chunk can describe.
    BufferTooLarge { samples: usize },
    UnknownWaveform(u32),
    Config(serde_json::Error),
}

/// Reasons a WAV stream is refused by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WavError {
    BadMagic { expected: &'static str, found: [u8; 4] },
    FormatChunkTooSmall(u32),
    UnsupportedEncoding(u16),
    UnsupportedChannelCount(u16),
    UnsupportedBitDepth(u16),
    InvalidRate { sample_rate: u32, byte_rate: u32 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Io(e) => write!(f, "I/O error: {e}"),
            EngineError::Wav(e) => write!(f, "WAV error: {e}"),
            EngineError::BufferTooLarge { samples } => {
                write!(f, "Buffer of {samples} samples is too large for a WAV data chunk")
            }
            EngineError::UnknownWaveform(code) => write!(f, "Unknown waveform code {code}"),
            EngineError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(e) => Some(e),
            EngineError::Wav(e) => Some(e),
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavError::BadMagic { expected, found } => write!(
                f,
                "Expected '{expected}' marker, found '{}'",
                String::from_utf8_lossy(found)
            ),
            WavError::FormatChunkTooSmall(size) => {
                write!(f, "Format chunk is {size} bytes, need at least 16")
            }
            WavError::UnsupportedEncoding(code) => {
                write!(f, "Unsupported encoding {code}, only integer PCM (1) is read")
            }
            WavError::UnsupportedChannelCount(n) => {
                write!(f, "Unsupported channel count {n}, expected 1 or 2")
            }
            WavError::UnsupportedBitDepth(bits) => {
                write!(f, "Unsupported bit depth {bits}")
            }
            WavError::InvalidRate { sample_rate, byte_rate } => write!(
                f,
                "Invalid rates: sample rate {sample_rate} Hz, byte rate {byte_rate} B/s"
            ),
        }
    }
}

impl std::error::Error for WavError {}

impl From<io::Error> for EngineError {
    fn from(e: io::Error) -> Self {
        EngineError::Io(e)
    }
}

impl From<WavError> for EngineError {
    fn from(e: WavError) -> Self {
        EngineError::Wav(e)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Config(e)
    }
}
