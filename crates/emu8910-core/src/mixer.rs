//! PSG Output Mixer
//!
//! Combines the three tone channels and the shared noise bit, with the mixer
//! control register (R7) determining which sources gate each channel.
//!
//! R7 bits are active-low enables: a set bit forces that source's gate open,
//! so a channel with both bits set outputs a constant level (the trick used
//! for sample playback through the volume register).

use bitflags::bitflags;

use crate::dac::DacTable;
use crate::generators::{ToneChannel, NUM_CHANNELS};

/// Pan limits applied at mix time
pub const PAN_MIN: f32 = 0.1;
/// Pan limits applied at mix time
pub const PAN_MAX: f32 = 0.9;

bitflags! {
    /// Mixer Control Register (R7) bitflags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MixerFlags: u8 {
        /// Channel A tone disable
        const A_TONE = 0x01;
        /// Channel B tone disable
        const B_TONE = 0x02;
        /// Channel C tone disable
        const C_TONE = 0x04;
        /// Channel A noise disable
        const A_NOISE = 0x08;
        /// Channel B noise disable
        const B_NOISE = 0x10;
        /// Channel C noise disable
        const C_NOISE = 0x20;
    }
}

impl MixerFlags {
    const TONE: [MixerFlags; NUM_CHANNELS] =
        [MixerFlags::A_TONE, MixerFlags::B_TONE, MixerFlags::C_TONE];
    const NOISE: [MixerFlags; NUM_CHANNELS] =
        [MixerFlags::A_NOISE, MixerFlags::B_NOISE, MixerFlags::C_NOISE];

    /// Create mixer flags from raw register value
    pub fn from_register(value: u8) -> Self {
        MixerFlags::from_bits_truncate(value)
    }

    /// Tone disable bit for channel 0-2
    pub fn tone_off(&self, channel: usize) -> bool {
        self.contains(Self::TONE[channel % NUM_CHANNELS])
    }

    /// Noise disable bit for channel 0-2
    pub fn noise_off(&self, channel: usize) -> bool {
        self.contains(Self::NOISE[channel % NUM_CHANNELS])
    }
}

/// Mix one chip tick into a raw stereo pair
///
/// `tone_bits` are the freshly stepped tone outputs, `noise_bit` and
/// `envelope_level` the shared noise and envelope outputs for the same tick.
#[inline]
pub fn mix(
    channels: &[ToneChannel; NUM_CHANNELS],
    tone_bits: [bool; NUM_CHANNELS],
    noise_bit: bool,
    envelope_level: u8,
    dac: &DacTable,
) -> (f32, f32) {
    let mut left = 0.0;
    let mut right = 0.0;

    for (channel, tone) in channels.iter().zip(tone_bits) {
        let gate = (tone || channel.tone_off()) && (noise_bit || channel.noise_off());
        if !gate {
            continue;
        }

        let amplitude = if channel.fixed_volume() {
            dac.volume(channel.volume())
        } else {
            dac.level(envelope_level as usize)
        };

        let pan = channel.pan().clamp(PAN_MIN, PAN_MAX);
        left += amplitude * (1.0 - pan);
        right += amplitude * pan;
    }

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn channels(amplitude: u8, mixer: u8) -> [ToneChannel; NUM_CHANNELS] {
        let flags = MixerFlags::from_register(mixer);
        std::array::from_fn(|i| {
            let mut ch = ToneChannel::new();
            ch.set_amplitude(amplitude);
            ch.set_mixer_gates(flags.tone_off(i), flags.noise_off(i));
            ch
        })
    }

    #[test]
    fn test_mixer_flags() {
        let flags = MixerFlags::from_register(0x00);
        for ch in 0..NUM_CHANNELS {
            assert!(!flags.tone_off(ch));
            assert!(!flags.noise_off(ch));
        }

        let flags = MixerFlags::from_register(0xFF);
        assert_eq!(flags, MixerFlags::all());
        assert!(flags.tone_off(2));
        assert!(flags.noise_off(2));
    }

    #[test]
    fn test_tone_gate_follows_tone_bit() {
        let dac = DacTable::default();
        // Tone only on all channels
        let chs = channels(15, 0b0011_1000);

        let (l, r) = mix(&chs, [true, false, false], false, 0, &dac);
        assert_relative_eq!(l, 0.5, epsilon = 1e-6);
        assert_relative_eq!(r, 0.5, epsilon = 1e-6);

        let (l, r) = mix(&chs, [false, false, false], true, 0, &dac);
        assert_eq!((l, r), (0.0, 0.0));
    }

    #[test]
    fn test_all_disabled_outputs_constant_level() {
        let dac = DacTable::default();
        let chs = channels(15, 0x3F);

        let (l, r) = mix(&chs, [false; 3], false, 0, &dac);
        assert_relative_eq!(l + r, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_noise_gate_requires_noise_bit() {
        let dac = DacTable::default();
        // Noise only on all channels
        let chs = channels(15, 0b0000_0111);

        let (l, _) = mix(&chs, [false; 3], false, 0, &dac);
        assert_eq!(l, 0.0);
        let (l, _) = mix(&chs, [false; 3], true, 0, &dac);
        assert_relative_eq!(l, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn test_envelope_level_selects_dac_entry() {
        let dac = DacTable::default();
        let chs = channels(0x10, 0x3F);

        let (l, r) = mix(&chs, [false; 3], false, 20, &dac);
        assert_relative_eq!(l + r, 3.0 * dac.level(20), epsilon = 1e-6);
    }

    #[test]
    fn test_pan_is_clamped() {
        let dac = DacTable::default();
        let mut chs = channels(15, 0b0011_1000);
        chs[0].set_pan(0.0);

        let (l, r) = mix(&chs, [true, false, false], false, 0, &dac);
        assert_relative_eq!(l, 0.9, epsilon = 1e-6);
        assert_relative_eq!(r, 0.1, epsilon = 1e-6);
    }
}
