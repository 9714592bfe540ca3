//! FYM register-dump decoder
//!
//! An FYM file (after inflating) is a small little-endian header followed by
//! 14 register columns:
//!
//! ```text
//! offset  size  field
//! 0       4     data offset (absolute, start of register columns)
//! 4       4     frame count
//! 8       4     loop frame
//! 12      4     chip clock in Hz
//! 16      4     frame rate in Hz
//! 20      ...   track name, NUL-terminated
//! ...     ...   author name, NUL-terminated
//! offset  14*N  R0 for every frame, then R1 for every frame, ... R13
//! ```
//!
//! R13 holds `0xFF` on frames where the envelope shape is not rewritten.

use emu8910::{FrameRoutine, RegisterFile};

use crate::compression::decompress_if_needed;
use crate::{ReplayerError, Result};

/// Registers stored per frame
pub const FYM_REGISTERS: usize = 14;

/// Parsed FYM header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FymHeader {
    /// Absolute offset of the register columns
    pub data_offset: usize,
    /// Number of frames
    pub frame_count: usize,
    /// Frame playback jumps back to after the last frame
    pub loop_frame: usize,
    /// Chip clock in Hz
    pub clock_rate: u32,
    /// Frame rate in Hz
    pub frame_rate: u32,
    /// Track title
    pub track_name: String,
    /// Track author
    pub author_name: String,
}

impl FymHeader {
    /// Parse and validate the header of an inflated dump
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut offset = 0;
        let data_offset = read_u32_le(data, &mut offset, "data offset")? as usize;
        let frame_count = read_u32_le(data, &mut offset, "frame count")? as usize;
        let loop_frame = read_u32_le(data, &mut offset, "loop frame")? as usize;
        let clock_rate = read_u32_le(data, &mut offset, "clock rate")?;
        let frame_rate = read_u32_le(data, &mut offset, "frame rate")?;
        let track_name = read_cstring(data, &mut offset, "track name")?;
        let author_name = read_cstring(data, &mut offset, "author name")?;

        if frame_count == 0 {
            return Err(ReplayerError::ParseError("FYM has no frames".into()));
        }
        if loop_frame >= frame_count {
            return Err(ReplayerError::ParseError(format!(
                "FYM loop frame {loop_frame} is past the last frame ({frame_count} frames)"
            )));
        }

        let end = frame_count
            .checked_mul(FYM_REGISTERS)
            .and_then(|size| size.checked_add(data_offset))
            .ok_or_else(|| ReplayerError::ParseError("FYM frame data size overflow".into()))?;
        if end > data.len() {
            return Err(ReplayerError::ParseError(format!(
                "FYM truncated in frame data: need {end} bytes, have {}",
                data.len()
            )));
        }

        Ok(Self {
            data_offset,
            frame_count,
            loop_frame,
            clock_rate,
            frame_rate,
            track_name,
            author_name,
        })
    }

    /// Length of one pass through the dump, in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.frame_rate == 0 {
            0.0
        } else {
            self.frame_count as f64 / self.frame_rate as f64
        }
    }
}

fn read_u32_le(data: &[u8], offset: &mut usize, field: &str) -> Result<u32> {
    let bytes = data
        .get(*offset..*offset + 4)
        .ok_or_else(|| ReplayerError::ParseError(format!("FYM header truncated in {field}")))?;
    *offset += 4;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a NUL-terminated string, one char per byte
fn read_cstring(data: &[u8], offset: &mut usize, field: &str) -> Result<String> {
    let rest = data.get(*offset..).unwrap_or_default();
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ReplayerError::ParseError(format!("FYM {field} is not terminated")))?;
    *offset += len + 1;
    Ok(rest[..len].iter().map(|&b| b as char).collect())
}

/// Frame-by-frame reader over an inflated FYM dump
///
/// Wraps around to the loop frame forever; [`FymReader::loop_count`] tells
/// how many times the end was reached.
#[derive(Debug, Clone)]
pub struct FymReader {
    data: Vec<u8>,
    header: FymHeader,
    frame: usize,
    loop_count: u32,
}

impl FymReader {
    /// Create a reader over an already inflated dump
    pub fn new(data: Vec<u8>) -> Result<Self> {
        let header = FymHeader::parse(&data)?;
        tracing::debug!(
            frames = header.frame_count,
            loop_frame = header.loop_frame,
            clock = header.clock_rate,
            rate = header.frame_rate,
            "parsed FYM header"
        );
        Ok(Self {
            data,
            header,
            frame: 0,
            loop_count: 0,
        })
    }

    /// Create a reader from file contents, inflating them if needed
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        Self::new(decompress_if_needed(bytes)?)
    }

    /// Return the current row and advance
    ///
    /// Reaching the end bumps the loop counter and jumps to the loop frame.
    pub fn get_next_frame(&mut self) -> [u8; FYM_REGISTERS] {
        let base = self.header.data_offset + self.frame;
        let frames = self.header.frame_count;
        let row = std::array::from_fn(|r| self.data[base + r * frames]);

        self.frame += 1;
        if self.frame >= frames {
            self.loop_count += 1;
            self.frame = self.header.loop_frame;
            tracing::debug!(loop_count = self.loop_count, "FYM wrapped to loop frame");
        }
        row
    }

    /// Go back to the first frame and clear the loop counter
    pub fn rewind(&mut self) {
        self.frame = 0;
        self.loop_count = 0;
    }

    /// Parsed header
    pub fn header(&self) -> &FymHeader {
        &self.header
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.header.frame_count
    }

    /// Loop target frame
    pub fn loop_frame(&self) -> usize {
        self.header.loop_frame
    }

    /// Chip clock in Hz
    pub fn clock_rate(&self) -> u32 {
        self.header.clock_rate
    }

    /// Frame rate in Hz
    pub fn frame_rate(&self) -> u32 {
        self.header.frame_rate
    }

    /// Track title
    pub fn track_name(&self) -> &str {
        &self.header.track_name
    }

    /// Track author
    pub fn author_name(&self) -> &str {
        &self.header.author_name
    }

    /// Times the end of the dump has been reached
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Index of the frame the next call returns
    pub fn current_frame(&self) -> usize {
        self.frame
    }
}

impl FrameRoutine for FymReader {
    /// Load the next row; a `0xFF` shape byte leaves R13 alone
    fn on_frame(&mut self, registers: &mut RegisterFile) {
        let row = self.get_next_frame();
        registers.load_row(&row);
    }
}
