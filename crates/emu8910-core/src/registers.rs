//! PSG Register Definitions
//!
//! Defines the 14 sound registers (R0-R13) that control the chip. Values are
//! stored exactly as written and only masked to their hardware bit-width when
//! the chip maps them onto its generators, so out-of-range writes are never
//! rejected.

use std::fmt;

/// Number of sound registers in one frame row
pub const REGISTER_COUNT: usize = 14;

/// Envelope shape value meaning "not written since the last latch"
///
/// Register dumps use it to mark frames where R13 was left alone, and the chip
/// stores it back into R13 after latching a single-cycle shape.
pub const ENV_SHAPE_UNCHANGED: u8 = 0xFF;

/// PSG Register Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Channel A period (low byte) - R0
    AFine = 0x00,
    /// Channel A period (high nibble) - R1
    ACoarse = 0x01,
    /// Channel B period (low byte) - R2
    BFine = 0x02,
    /// Channel B period (high nibble) - R3
    BCoarse = 0x03,
    /// Channel C period (low byte) - R4
    CFine = 0x04,
    /// Channel C period (high nibble) - R5
    CCoarse = 0x05,
    /// Noise period - R6
    NoisePeriod = 0x06,
    /// Mixer control (tone/noise disable bits) - R7
    Mixer = 0x07,
    /// Channel A amplitude - R8
    AVolume = 0x08,
    /// Channel B amplitude - R9
    BVolume = 0x09,
    /// Channel C amplitude - R10
    CVolume = 0x0A,
    /// Envelope period (low byte) - R11
    EnvFine = 0x0B,
    /// Envelope period (high byte) - R12
    EnvCoarse = 0x0C,
    /// Envelope shape - R13
    EnvShape = 0x0D,
}

impl Register {
    /// All sound registers in address order
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::AFine,
        Register::ACoarse,
        Register::BFine,
        Register::BCoarse,
        Register::CFine,
        Register::CCoarse,
        Register::NoisePeriod,
        Register::Mixer,
        Register::AVolume,
        Register::BVolume,
        Register::CVolume,
        Register::EnvFine,
        Register::EnvCoarse,
        Register::EnvShape,
    ];

    /// Convert a raw register number (0-13) to Register enum
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL.get(addr as usize).copied()
    }

    /// Get the register address value
    pub fn addr(&self) -> u8 {
        *self as u8
    }

    /// Bit mask applied when the register is mapped onto the generators
    pub fn mask(&self) -> u8 {
        match self {
            Register::ACoarse | Register::BCoarse | Register::CCoarse => 0x0F,
            Register::NoisePeriod => 0x1F,
            Register::Mixer => 0x3F,
            Register::AVolume | Register::BVolume | Register::CVolume => 0x1F,
            Register::EnvShape => 0x0F,
            _ => 0xFF,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::AFine => write!(f, "R0 (Channel A Period Fine)"),
            Register::ACoarse => write!(f, "R1 (Channel A Period Coarse)"),
            Register::BFine => write!(f, "R2 (Channel B Period Fine)"),
            Register::BCoarse => write!(f, "R3 (Channel B Period Coarse)"),
            Register::CFine => write!(f, "R4 (Channel C Period Fine)"),
            Register::CCoarse => write!(f, "R5 (Channel C Period Coarse)"),
            Register::NoisePeriod => write!(f, "R6 (Noise Period)"),
            Register::Mixer => write!(f, "R7 (Mixer Control)"),
            Register::AVolume => write!(f, "R8 (Channel A Amplitude)"),
            Register::BVolume => write!(f, "R9 (Channel B Amplitude)"),
            Register::CVolume => write!(f, "R10 (Channel C Amplitude)"),
            Register::EnvFine => write!(f, "R11 (Envelope Period Fine)"),
            Register::EnvCoarse => write!(f, "R12 (Envelope Period Coarse)"),
            Register::EnvShape => write!(f, "R13 (Envelope Shape)"),
        }
    }
}

/// The chip's register file
///
/// Writes land unmasked; [`RegisterFile::clamp`] brings every field back into
/// its bit-width once per chip tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
    a_fine: u8,
    a_coarse: u8,
    b_fine: u8,
    b_coarse: u8,
    c_fine: u8,
    c_coarse: u8,
    noise_period: u8,
    mixer: u8,
    a_volume: u8,
    b_volume: u8,
    c_volume: u8,
    env_fine: u8,
    env_coarse: u8,
    env_shape: u8,
}

impl RegisterFile {
    /// Create a register file with every register cleared
    pub fn new() -> Self {
        RegisterFile {
            a_fine: 0,
            a_coarse: 0,
            b_fine: 0,
            b_coarse: 0,
            c_fine: 0,
            c_coarse: 0,
            noise_period: 0,
            mixer: 0,
            a_volume: 0,
            b_volume: 0,
            c_volume: 0,
            env_fine: 0,
            env_coarse: 0,
            env_shape: 0,
        }
    }

    fn slot(&mut self, reg: Register) -> &mut u8 {
        match reg {
            Register::AFine => &mut self.a_fine,
            Register::ACoarse => &mut self.a_coarse,
            Register::BFine => &mut self.b_fine,
            Register::BCoarse => &mut self.b_coarse,
            Register::CFine => &mut self.c_fine,
            Register::CCoarse => &mut self.c_coarse,
            Register::NoisePeriod => &mut self.noise_period,
            Register::Mixer => &mut self.mixer,
            Register::AVolume => &mut self.a_volume,
            Register::BVolume => &mut self.b_volume,
            Register::CVolume => &mut self.c_volume,
            Register::EnvFine => &mut self.env_fine,
            Register::EnvCoarse => &mut self.env_coarse,
            Register::EnvShape => &mut self.env_shape,
        }
    }

    /// Write a register value (stored as-is, masked on the next map)
    pub fn write(&mut self, reg: Register, value: u8) {
        *self.slot(reg) = value;
    }

    /// Write by raw address; addresses above R13 are ignored
    pub fn write_addr(&mut self, addr: u8, value: u8) {
        if let Some(reg) = Register::from_addr(addr) {
            self.write(reg, value);
        }
    }

    /// Read the stored register value
    pub fn read(&self, reg: Register) -> u8 {
        match reg {
            Register::AFine => self.a_fine,
            Register::ACoarse => self.a_coarse,
            Register::BFine => self.b_fine,
            Register::BCoarse => self.b_coarse,
            Register::CFine => self.c_fine,
            Register::CCoarse => self.c_coarse,
            Register::NoisePeriod => self.noise_period,
            Register::Mixer => self.mixer,
            Register::AVolume => self.a_volume,
            Register::BVolume => self.b_volume,
            Register::CVolume => self.c_volume,
            Register::EnvFine => self.env_fine,
            Register::EnvCoarse => self.env_coarse,
            Register::EnvShape => self.env_shape,
        }
    }

    /// Load a full frame row (R0-R13)
    ///
    /// An R13 value of [`ENV_SHAPE_UNCHANGED`] leaves the shape register
    /// untouched, which is how register dumps encode "no envelope write".
    pub fn load_row(&mut self, row: &[u8; REGISTER_COUNT]) {
        for (reg, &value) in Register::ALL.iter().zip(row.iter()) {
            if *reg == Register::EnvShape && value == ENV_SHAPE_UNCHANGED {
                continue;
            }
            self.write(*reg, value);
        }
    }

    /// Snapshot of all registers in address order
    pub fn dump(&self) -> [u8; REGISTER_COUNT] {
        Register::ALL.map(|reg| self.read(reg))
    }

    /// Mask every register to its hardware bit-width
    ///
    /// The shape register keeps the "unchanged" sentinel intact.
    pub fn clamp(&mut self) {
        for reg in Register::ALL {
            let slot = self.slot(reg);
            if reg == Register::EnvShape && *slot == ENV_SHAPE_UNCHANGED {
                continue;
            }
            *slot &= reg.mask();
        }
    }

    /// 12-bit tone period for channel 0-2 (`fine | coarse << 8`)
    pub(crate) fn tone_period(&self, channel: usize) -> u32 {
        let (fine, coarse) = match channel {
            0 => (self.a_fine, self.a_coarse),
            1 => (self.b_fine, self.b_coarse),
            _ => (self.c_fine, self.c_coarse),
        };
        fine as u32 | (coarse as u32) << 8
    }

    /// Amplitude register for channel 0-2
    pub(crate) fn volume(&self, channel: usize) -> u8 {
        match channel {
            0 => self.a_volume,
            1 => self.b_volume,
            _ => self.c_volume,
        }
    }

    pub(crate) fn noise_period(&self) -> u32 {
        self.noise_period as u32
    }

    pub(crate) fn mixer(&self) -> u8 {
        self.mixer
    }

    /// 16-bit envelope period (`fine | coarse << 8`)
    pub(crate) fn envelope_period(&self) -> u32 {
        self.env_fine as u32 | (self.env_coarse as u32) << 8
    }

    pub(crate) fn envelope_shape(&self) -> u8 {
        self.env_shape
    }

    pub(crate) fn set_envelope_shape(&mut self, value: u8) {
        self.env_shape = value;
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conversion() {
        assert_eq!(Register::from_addr(0x00), Some(Register::AFine));
        assert_eq!(Register::from_addr(0x07), Some(Register::Mixer));
        assert_eq!(Register::from_addr(0x0D), Some(Register::EnvShape));
        assert_eq!(Register::from_addr(0x0E), None);
    }

    #[test]
    fn test_write_is_stored_raw() {
        let mut regs = RegisterFile::new();
        regs.write(Register::ACoarse, 0xFF);
        assert_eq!(regs.read(Register::ACoarse), 0xFF);

        regs.clamp();
        assert_eq!(regs.read(Register::ACoarse), 0x0F);
    }

    #[test]
    fn test_clamp_masks_every_register() {
        let mut regs = RegisterFile::new();
        regs.load_row(&[0xFF; REGISTER_COUNT]);
        regs.write(Register::EnvShape, 0x3C);
        regs.clamp();

        assert_eq!(
            regs.dump(),
            [0xFF, 0x0F, 0xFF, 0x0F, 0xFF, 0x0F, 0x1F, 0x3F, 0x1F, 0x1F, 0x1F, 0xFF, 0xFF, 0x0C]
        );
    }

    #[test]
    fn test_clamp_keeps_shape_sentinel() {
        let mut regs = RegisterFile::new();
        regs.write(Register::EnvShape, ENV_SHAPE_UNCHANGED);
        regs.clamp();
        assert_eq!(regs.read(Register::EnvShape), ENV_SHAPE_UNCHANGED);
    }

    #[test]
    fn test_load_row_skips_unchanged_shape() {
        let mut regs = RegisterFile::new();
        regs.write(Register::EnvShape, 0x08);

        let mut row = [0u8; REGISTER_COUNT];
        row[0] = 200;
        row[13] = ENV_SHAPE_UNCHANGED;
        regs.load_row(&row);

        assert_eq!(regs.read(Register::AFine), 200);
        assert_eq!(regs.read(Register::EnvShape), 0x08);
    }

    #[test]
    fn test_derived_periods() {
        let mut regs = RegisterFile::new();
        regs.write(Register::BFine, 0x34);
        regs.write(Register::BCoarse, 0x02);
        regs.write(Register::EnvFine, 0x10);
        regs.write(Register::EnvCoarse, 0x80);

        assert_eq!(regs.tone_period(1), 0x234);
        assert_eq!(regs.envelope_period(), 0x8010);
    }

    #[test]
    fn test_write_addr_ignores_io_ports() {
        let mut regs = RegisterFile::new();
        regs.write_addr(0x0E, 0x55);
        regs.write_addr(0x0F, 0x55);
        assert_eq!(regs.dump(), [0; REGISTER_COUNT]);
    }
}
