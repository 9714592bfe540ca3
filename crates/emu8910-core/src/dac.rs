//! PSG DAC Curve
//!
//! The chip's output stage is a nonlinear (roughly logarithmic) DAC. Envelope
//! levels address all 32 entries; fixed 4-bit volumes land on the odd entries.

/// Decay factor of the reference DAC curve
pub const DAC_DECAY: f64 = 1.3;

/// Shift (dynamic range exponent) of the reference DAC curve
pub const DAC_SHIFT: f64 = 40.0;

/// Number of DAC levels (5-bit)
pub const DAC_LEVELS: usize = 32;

/// Immutable 32-entry volume curve
///
/// Entry `i` (for `i >= 2`) is `1 / sqrt(decay)^(shift - shift/31 * i)`, so the
/// loudest entry is exactly 1.0. Entries 0 and 1 are silent.
#[derive(Debug, Clone, PartialEq)]
pub struct DacTable {
    levels: [f32; DAC_LEVELS],
}

impl DacTable {
    /// Build the curve from decay/shift parameters
    pub fn new(decay: f64, shift: f64) -> Self {
        let base = decay.sqrt();
        let slope = shift / 31.0;

        let mut levels = [0.0f32; DAC_LEVELS];
        for (i, level) in levels.iter_mut().enumerate().skip(2) {
            *level = (1.0 / base.powf(shift - slope * i as f64)) as f32;
        }

        DacTable { levels }
    }

    /// Output amplitude for a 5-bit level; out-of-range indices clamp to 31
    #[inline]
    pub fn level(&self, index: usize) -> f32 {
        self.levels[index.min(DAC_LEVELS - 1)]
    }

    /// Output amplitude for a fixed 4-bit volume (odd DAC entries 1..=31)
    #[inline]
    pub fn volume(&self, volume: u8) -> f32 {
        self.level((volume & 0x0F) as usize * 2 + 1)
    }

    /// All 32 levels
    pub fn levels(&self) -> &[f32; DAC_LEVELS] {
        &self.levels
    }
}

impl Default for DacTable {
    fn default() -> Self {
        Self::new(DAC_DECAY, DAC_SHIFT)
    }
}
