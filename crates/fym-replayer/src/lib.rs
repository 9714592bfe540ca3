//! FYM Register-Dump Replayer
//!
//! Decodes FYM files (zlib-packed AY-3-8910 register dumps, one 14-register
//! row per frame) and plays them through the [`emu8910`] chip emulator.
//!
//! # Features
//!
//! - Transparent zlib decompression
//! - Header validation with descriptive errors
//! - Endless playback with a loop counter
//! - WAV export (`export-wav` feature)
//! - `fym-play` command-line renderer (`cli` feature)
//!
//! # Example
//!
//! ```no_run
//! use emu8910::ChipConfig;
//! use fym_replayer::FymPlayer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut player = FymPlayer::load_file("song.fym", ChipConfig::default())?;
//! println!("{}", player.format_info());
//!
//! let mut block = vec![0.0f32; 2 * 882];
//! player.render(&mut block);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod compression;
pub mod error;
pub mod parser;
pub mod player;

// Export module - WAV export (optional)
#[cfg(feature = "export-wav")]
pub mod export;

pub use compression::{decompress_if_needed, is_zlib_compressed};
pub use error::{ReplayerError, Result};
pub use parser::{FymHeader, FymReader, FYM_REGISTERS};
pub use player::FymPlayer;

#[cfg(feature = "export-wav")]
pub use export::{export_to_wav, render_to_wav, RenderLimit};
