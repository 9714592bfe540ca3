//! AY-3-8910 PSG Emulator
//!
//! A tick-accurate emulation of the General Instrument AY-3-8910 / Yamaha YM2149
//! programmable sound generator, paired with a resampling pipeline that turns the
//! chip's irregular internal update rate into a fixed-rate stereo stream.
//!
//! # Features
//! - Three square-wave tone channels and a shared 17-bit LFSR noise source
//! - Six-class envelope automaton producing a 0-31 level
//! - Nonlinear 32-entry DAC curve and per-channel stereo panning
//! - 8x oversampling with cubic interpolation
//! - Windowed-sinc (Blackman-Harris) decimation filter with persistent state
//! - Moving-average DC blocker on the final samples
//! - Frame callback fired from inside [`Psg49::step`] for register-dump replayers
//!
//! # Quick start
//! ```no_run
//! use emu8910::{ChipConfig, Psg49, Register};
//!
//! let mut chip = Psg49::new(ChipConfig::default()).unwrap();
//! chip.registers_mut().write(Register::Mixer, 0b0011_1110); // tone A only
//! chip.registers_mut().write(Register::AFine, 200);
//! chip.registers_mut().write(Register::AVolume, 0x0F);
//!
//! let (left, right) = chip.step();
//! ```
//!
//! ## Feeding registers once per frame
//! ```no_run
//! use emu8910::{ChipConfig, Psg49, RegisterFile};
//!
//! let mut chip = Psg49::new(ChipConfig::default()).unwrap();
//! chip.set_frame_routine(|regs: &mut RegisterFile| {
//!     regs.load_row(&[200, 0, 0, 0, 0, 0, 0, 0x3E, 15, 0, 0, 0, 0, 0xFF]);
//! });
//!
//! let mut block = vec![0.0f32; 2 * 882];
//! chip.render(&mut block);
//! ```

#![warn(missing_docs)]

pub mod chip;
pub mod clock;
pub mod config;
pub mod dac;
pub mod dsp;
pub mod envelope;
pub mod generators;
pub mod mixer;
pub mod registers;

/// Error types for the PSG core
///
/// Only construction and the runtime setters can fail; the per-sample path
/// has no error channel.
#[derive(thiserror::Error, Debug)]
pub enum Emu8910Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Emu8910Error>;

// Public API exports
pub use chip::{FrameRoutine, Psg49};
pub use config::ChipConfig;
pub use dac::DacTable;
pub use dsp::{BiasFilter, DecimationFilter, FirDesign, Interpolator};
pub use envelope::{EnvelopeClass, EnvelopeGenerator};
pub use generators::{NoiseChannel, ToneChannel};
pub use mixer::MixerFlags;
pub use registers::{Register, RegisterFile};
