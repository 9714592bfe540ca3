//! Error types for FYM decoding and playback

use emu8910::Emu8910Error;

/// Error type for FYM replayer operations
#[derive(thiserror::Error, Debug)]
pub enum ReplayerError {
    /// Malformed FYM header or frame data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// zlib inflate failure or size limit hit
    #[error("Decompression error: {0}")]
    DecompressionError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the chip emulation (usually a rejected configuration)
    #[error("Chip error: {0}")]
    ChipError(#[from] Emu8910Error),

    /// Failure while writing an export file
    #[error("Export error: {0}")]
    ExportError(String),
}

/// Result type for replayer operations
pub type Result<T> = std::result::Result<T, ReplayerError>;
