//! FYM playback
//!
//! Glues a [`FymReader`] into the chip's frame callback. The chip clock and
//! the frame rate come from the file header; everything else comes from the
//! [`ChipConfig`] passed in.

use std::path::Path;

use emu8910::{ChipConfig, Psg49};

use crate::parser::{FymHeader, FymReader};
use crate::Result;

/// Chip plus FYM reader, rendering stereo samples
#[derive(Debug)]
pub struct FymPlayer {
    chip: Psg49,
    reader: FymReader,
}

impl FymPlayer {
    /// Build a player for a parsed dump
    ///
    /// The header's clock and frame rate override those in `config`.
    pub fn new(reader: FymReader, config: ChipConfig) -> Result<Self> {
        let config = config
            .with_clock_frequency(reader.clock_rate() as f64)
            .with_frame_frequency(reader.frame_rate() as f64);
        let chip = Psg49::new(config)?;

        tracing::info!(
            track = reader.track_name(),
            author = reader.author_name(),
            frames = reader.frame_count(),
            "loaded FYM track"
        );

        Ok(Self { chip, reader })
    }

    /// Build a player from file contents (compressed or not)
    pub fn from_bytes(data: &[u8], config: ChipConfig) -> Result<Self> {
        Self::new(FymReader::from_compressed(data)?, config)
    }

    /// Load and build a player from a file
    pub fn load_file<P: AsRef<Path>>(path: P, config: ChipConfig) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), bytes = data.len(), "read FYM file");
        Self::from_bytes(&data, config)
    }

    /// Produce one stereo sample
    #[inline]
    pub fn step(&mut self) -> (f32, f32) {
        self.chip.step_with(&mut self.reader)
    }

    /// Fill an interleaved stereo buffer
    pub fn render(&mut self, out: &mut [f32]) {
        self.chip.render_with(out, &mut self.reader);
    }

    /// Times playback has wrapped to the loop frame
    pub fn loop_count(&self) -> u32 {
        self.reader.loop_count()
    }

    /// Header of the loaded dump
    pub fn metadata(&self) -> &FymHeader {
        self.reader.header()
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.chip.output_sample_rate()
    }

    /// Length of one pass through the dump, in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.reader.header().duration_seconds()
    }

    /// Start over from the first frame
    ///
    /// Chip and filter state carry on, so there is no click.
    pub fn rewind(&mut self) {
        self.reader.rewind();
    }

    /// Underlying chip
    pub fn chip(&self) -> &Psg49 {
        &self.chip
    }

    /// Underlying chip, e.g. for panning
    pub fn chip_mut(&mut self) -> &mut Psg49 {
        &mut self.chip
    }

    /// Underlying reader
    pub fn reader(&self) -> &FymReader {
        &self.reader
    }

    /// Human-readable track summary
    pub fn format_info(&self) -> String {
        let header = self.metadata();
        format!(
            "  Song: {}\n  Author: {}\n  Duration: {:.2}s ({} frames @ {}Hz, loop at {})\n  Chip Clock: {} Hz",
            header.track_name,
            header.author_name,
            header.duration_seconds(),
            header.frame_count,
            header.frame_rate,
            header.loop_frame,
            header.clock_rate
        )
    }
}
