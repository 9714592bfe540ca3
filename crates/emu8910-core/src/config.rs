//! Chip and resampler configuration
//!
//! Defaults reproduce the reference setup: a ZX Spectrum 128 AY clock, 50 Hz
//! frames and 44.1 kHz output through an 8x oversampled, 50-tap filter.

use serde::{Deserialize, Serialize};

use crate::dsp::FirDesign;
use crate::generators::{DEFAULT_PAN, NUM_CHANNELS};
use crate::{Emu8910Error, Result};

/// ZX Spectrum 128 AY clock in Hz
pub const ZX_SPECTRUM_CLOCK: f64 = 1_750_000.0;

/// Chip clock prescaler applied before the period counters
pub const CLOCK_SCALE: f64 = 1.0 / 16.0 * 2.0;

/// Default host output rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// Default frame (register update) rate in Hz
pub const DEFAULT_FRAME_RATE: f64 = 50.0;

/// Default oversample factor
pub const WAVE_OVERSAMPLE: usize = 8;

/// Default decimation filter length
pub const FIR_TAPS: usize = 50;

/// Default decimation filter cutoff in Hz
pub const FIR_CUTOFF: f64 = 2100.0;

/// Default interpolation phase
pub const CUBIC_PHASE: f32 = 0.5;

/// Configuration for a [`crate::Psg49`] instance
///
/// Can be loaded from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Chip master clock in Hz
    pub clock_frequency: f64,
    /// Prescaler between master clock and period counters
    pub clock_scale: f64,
    /// Host output sample rate in Hz
    pub output_sample_rate: f64,
    /// Frame callback rate in Hz
    pub frame_frequency: f64,
    /// Oversampled iterations per output sample
    pub oversample: usize,
    /// Decimation filter length
    pub fir_taps: usize,
    /// Decimation filter cutoff in Hz (normalized against the output rate)
    pub fir_cutoff: f64,
    /// Phase at which the interpolators are sampled
    pub interpolation_phase: f32,
    /// DAC curve decay factor
    pub dac_decay: f64,
    /// DAC curve shift
    pub dac_shift: f64,
    /// DC blocker window in output samples
    pub bias_window: usize,
    /// DC blocker attenuation (output is divided by this)
    pub bias_attenuation: f32,
    /// Stereo position of channels A, B, C
    pub pan: [f32; NUM_CHANNELS],
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            clock_frequency: ZX_SPECTRUM_CLOCK,
            clock_scale: CLOCK_SCALE,
            output_sample_rate: DEFAULT_SAMPLE_RATE,
            frame_frequency: DEFAULT_FRAME_RATE,
            oversample: WAVE_OVERSAMPLE,
            fir_taps: FIR_TAPS,
            fir_cutoff: FIR_CUTOFF,
            interpolation_phase: CUBIC_PHASE,
            dac_decay: crate::dac::DAC_DECAY,
            dac_shift: crate::dac::DAC_SHIFT,
            bias_window: 1024,
            bias_attenuation: 1.25,
            pan: [DEFAULT_PAN; NUM_CHANNELS],
        }
    }
}

impl ChipConfig {
    /// Set the chip clock
    pub fn with_clock_frequency(mut self, hz: f64) -> Self {
        self.clock_frequency = hz;
        self
    }

    /// Set the output sample rate
    pub fn with_output_sample_rate(mut self, hz: f64) -> Self {
        self.output_sample_rate = hz;
        self
    }

    /// Set the frame callback rate
    pub fn with_frame_frequency(mut self, hz: f64) -> Self {
        self.frame_frequency = hz;
        self
    }

    /// Set the oversample factor
    pub fn with_oversample(mut self, factor: usize) -> Self {
        self.oversample = factor;
        self
    }

    /// Set the decimation filter design
    pub fn with_fir(mut self, taps: usize, cutoff: f64) -> Self {
        self.fir_taps = taps;
        self.fir_cutoff = cutoff;
        self
    }

    /// Set the DC blocker
    pub fn with_bias(mut self, window: usize, attenuation: f32) -> Self {
        self.bias_window = window;
        self.bias_attenuation = attenuation;
        self
    }

    /// Set the stereo positions of channels A, B, C
    pub fn with_pan(mut self, pan: [f32; NUM_CHANNELS]) -> Self {
        self.pan = pan;
        self
    }

    /// Filter design implied by this configuration
    pub fn fir_design(&self) -> FirDesign {
        FirDesign::new(self.fir_taps, self.fir_cutoff, self.output_sample_rate)
    }

    /// Check every setting before the chip enters the real-time path
    pub fn validate(&self) -> Result<()> {
        positive("clock_frequency", self.clock_frequency)?;
        positive("clock_scale", self.clock_scale)?;
        positive("output_sample_rate", self.output_sample_rate)?;

        frame_rate(self.frame_frequency)?;
        if self.oversample == 0 {
            return Err(Emu8910Error::ConfigError(
                "oversample must be at least 1".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.interpolation_phase) {
            return Err(Emu8910Error::ConfigError(format!(
                "interpolation_phase must be in [0, 1), got {}",
                self.interpolation_phase
            )));
        }
        positive("dac_decay", self.dac_decay)?;
        if self.bias_window == 0 {
            return Err(Emu8910Error::ConfigError(
                "bias_window must be at least 1".to_string(),
            ));
        }
        if let Some(pan) = self.pan.iter().find(|pan| !pan.is_finite()) {
            return Err(Emu8910Error::ConfigError(format!(
                "pan must be finite, got {pan}"
            )));
        }
        if !(self.bias_attenuation.is_finite() && self.bias_attenuation > 0.0) {
            return Err(Emu8910Error::ConfigError(format!(
                "bias_attenuation must be positive, got {}",
                self.bias_attenuation
            )));
        }

        self.fir_design().validate()
    }
}

pub(crate) fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Emu8910Error::ConfigError(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Frame rates may be zero (no frame ticks) but not negative or non-finite
pub(crate) fn frame_rate(value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Emu8910Error::ConfigError(format!(
            "frame_frequency must be zero or positive, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChipConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clock_scale, 0.125);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let base = ChipConfig::default();
        let cases = [
            base.clone().with_oversample(0),
            base.clone().with_fir(0, 2100.0),
            base.clone().with_fir(50, 22_050.0),
            base.clone().with_output_sample_rate(0.0),
            base.clone().with_clock_frequency(f64::NAN),
            base.clone().with_frame_frequency(-1.0),
            base.clone().with_bias(0, 1.25),
            base.clone().with_bias(1024, 0.0),
            base.clone().with_pan([f32::NAN, 0.5, 0.5]),
            base.clone().with_pan([0.5, 0.5, f32::INFINITY]),
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChipConfig =
            serde_json::from_str(r#"{ "output_sample_rate": 48000.0, "oversample": 4 }"#).unwrap();
        assert_eq!(config.output_sample_rate, 48_000.0);
        assert_eq!(config.oversample, 4);
        assert_eq!(config.fir_taps, FIR_TAPS);
        assert!(config.validate().is_ok());
    }
}
