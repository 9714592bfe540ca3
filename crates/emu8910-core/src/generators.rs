//! Sound generators for the PSG
//!
//! This module contains the period-counter oscillators:
//! - Tone channels (3, square wave)
//! - Noise channel (shared 17-bit LFSR)
//!
//! Counters advance by a fractional chip-clock increment per tick and reset to
//! zero when they reach the period, so the waveform follows the tick grid.

/// Number of tone channels
pub const NUM_CHANNELS: usize = 3;

/// Default stereo position (center)
pub const DEFAULT_PAN: f32 = 0.5;

/// Tone channel: square-wave oscillator plus its mixer settings
///
/// The mixer settings are derived from the register file on every map.
#[derive(Clone, Debug, PartialEq)]
pub struct ToneChannel {
    /// Current output bit
    port: bool,
    /// Fractional period counter
    counter: f64,
    /// Period from R0-R5 (12-bit, floored at 1)
    period: u32,
    /// Fixed 4-bit volume
    volume: u8,
    /// Stereo position (0 = left, 1 = right)
    pan: f32,
    /// Mixer tone-disable bit (1 = tone gate forced open)
    tone_off: bool,
    /// Mixer noise-disable bit (1 = noise gate forced open)
    noise_off: bool,
    /// Amplitude register bit 4 clear: fixed volume, otherwise envelope level
    fixed_volume: bool,
}

impl ToneChannel {
    /// Create a centered, silent tone channel
    pub fn new() -> Self {
        Self {
            port: false,
            counter: 0.0,
            period: 1,
            volume: 0,
            pan: DEFAULT_PAN,
            tone_off: false,
            noise_off: false,
            fixed_volume: true,
        }
    }

    /// Set the period; 0 behaves as 1
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Apply the amplitude register (R8-R10)
    #[inline]
    pub fn set_amplitude(&mut self, amplitude: u8) {
        self.volume = amplitude & 0x0F;
        self.fixed_volume = amplitude & 0x10 == 0;
    }

    /// Fixed volume (0-15)
    #[inline]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Whether the channel plays its fixed volume rather than the envelope
    #[inline]
    pub fn fixed_volume(&self) -> bool {
        self.fixed_volume
    }

    /// Apply this channel's mixer disable bits
    #[inline]
    pub fn set_mixer_gates(&mut self, tone_off: bool, noise_off: bool) {
        self.tone_off = tone_off;
        self.noise_off = noise_off;
    }

    /// Mixer tone-disable bit
    #[inline]
    pub fn tone_off(&self) -> bool {
        self.tone_off
    }

    /// Mixer noise-disable bit
    #[inline]
    pub fn noise_off(&self) -> bool {
        self.noise_off
    }

    /// Stored stereo position (clamped only when mixed)
    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Set the stereo position
    #[inline]
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan;
    }

    /// Current output bit
    #[inline]
    pub fn port(&self) -> bool {
        self.port
    }

    /// Advance by `step` chip clocks, returns the output bit
    ///
    /// The bit toggles when the counter reaches the period, giving an exact
    /// 50% duty square wave.
    #[inline]
    pub fn tick(&mut self, step: f64) -> bool {
        self.counter += step;
        if self.counter >= self.period as f64 {
            self.port = !self.port;
            self.counter = 0.0;
        }
        self.port
    }
}

impl Default for ToneChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Noise channel using a 17-bit LFSR
///
/// On every period overflow the feedback bit `bit0 ^ bit3` enters at bit 16 as
/// the register shifts right. The register is seeded with 1; zero is a fixed
/// point of the recurrence and can never be reached from a non-zero state.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseChannel {
    /// Fractional period counter
    counter: f64,
    /// Period from R6 (doubled, floored at 1)
    period: u32,
    /// 17-bit LFSR state
    lfsr: u32,
}

impl NoiseChannel {
    /// Create a noise channel with the LFSR seeded to 1
    pub fn new() -> Self {
        Self {
            counter: 0.0,
            period: 1,
            lfsr: 1, // Must be non-zero
        }
    }

    /// Set the period; 0 behaves as 1
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period.max(1);
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Current LFSR state
    #[inline]
    pub fn lfsr(&self) -> u32 {
        self.lfsr
    }

    /// Advance by `step` chip clocks, returns the output bit (LFSR bit 0)
    #[inline]
    pub fn tick(&mut self, step: f64) -> bool {
        self.counter += step;
        if self.counter >= self.period as f64 {
            self.shift();
            self.counter = 0.0;
        }
        self.lfsr & 1 != 0
    }

    #[inline]
    fn shift(&mut self) {
        let feedback = (self.lfsr ^ (self.lfsr >> 3)) & 1;
        self.lfsr = (self.lfsr >> 1) | (feedback << 16);
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_zero_period_floors_to_one() {
        let mut tone = ToneChannel::new();
        tone.set_period(0);
        assert_eq!(tone.period(), 1);
    }

    #[test]
    fn test_tone_toggles_every_period() {
        let mut tone = ToneChannel::new();
        tone.set_period(5);

        let bits: Vec<bool> = (0..20).map(|_| tone.tick(1.0)).collect();
        // Counter reaches 5 on the 5th tick, then every 5 ticks after
        let toggles: Vec<usize> = bits
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1])
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(toggles, vec![4, 9, 14, 19]);
        assert!(bits[4]);
        assert!(!bits[3]);
    }

    #[test]
    fn test_tone_fifty_percent_duty() {
        for period in [1u32, 2, 7, 100] {
            let mut tone = ToneChannel::new();
            tone.set_period(period);

            let window = 2 * period as usize * 10;
            let high = (0..window).filter(|_| tone.tick(1.0)).count();
            assert_eq!(high * 2, window, "period {period} should have 50% duty");
        }
    }

    #[test]
    fn test_amplitude_register_split() {
        let mut tone = ToneChannel::new();
        tone.set_amplitude(0x1A);
        assert_eq!(tone.volume(), 0x0A);
        assert!(!tone.fixed_volume());

        tone.set_amplitude(0x0F);
        assert_eq!(tone.volume(), 0x0F);
        assert!(tone.fixed_volume());
    }

    #[test]
    fn test_noise_lfsr_first_steps() {
        let mut noise = NoiseChannel::new();
        noise.set_period(1);

        // 1 -> feedback 1 enters bit 16
        assert!(!noise.tick(1.0));
        assert_eq!(noise.lfsr(), 0x10000);
    }

    #[test]
    fn test_noise_lfsr_never_zero() {
        let mut noise = NoiseChannel::new();
        noise.set_period(1);

        for i in 0..300_000 {
            noise.tick(1.0);
            assert_ne!(noise.lfsr(), 0, "LFSR collapsed to zero after {i} shifts");
            assert!(noise.lfsr() < 1 << 17);
        }
    }

    #[test]
    fn test_noise_produces_both_bits() {
        let mut noise = NoiseChannel::new();
        noise.set_period(1);

        // One full cycle of the 17-bit sequence
        let cycle = (1 << 17) - 1;
        let ones = (0..cycle).filter(|_| noise.tick(1.0)).count();
        let ratio = ones as f64 / cycle as f64;
        assert!(ratio > 0.45 && ratio < 0.55, "noise too biased: {ratio}");
    }
}
