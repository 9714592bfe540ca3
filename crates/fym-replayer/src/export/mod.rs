//! Offline export
//!
//! Renders a [`crate::FymPlayer`] to a file instead of a live audio device.

pub mod wav;

pub use wav::{export_to_wav, render_to_wav};

/// When an export stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderLimit {
    /// Fixed duration in seconds
    Seconds(f64),
    /// Until playback has wrapped `count` times, capped at `max_seconds`
    Loops {
        /// Loop count to reach
        count: u32,
        /// Upper bound for tracks that never loop (frame rate 0)
        max_seconds: f64,
    },
}

impl RenderLimit {
    /// Sample cap at `sample_rate`
    pub fn max_samples(&self, sample_rate: f64) -> usize {
        let seconds = match *self {
            RenderLimit::Seconds(seconds) => seconds,
            RenderLimit::Loops { max_seconds, .. } => max_seconds,
        };
        (seconds.max(0.0) * sample_rate).round() as usize
    }

    /// Loop count that ends the export, if any
    pub fn loops(&self) -> Option<u32> {
        match *self {
            RenderLimit::Seconds(_) => None,
            RenderLimit::Loops { count, .. } => Some(count),
        }
    }
}

/// Convert a float sample to 16-bit PCM
#[inline]
pub(crate) fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_samples() {
        assert_eq!(RenderLimit::Seconds(1.5).max_samples(44_100.0), 66_150);
        assert_eq!(RenderLimit::Seconds(-1.0).max_samples(44_100.0), 0);
        let loops = RenderLimit::Loops {
            count: 2,
            max_seconds: 10.0,
        };
        assert_eq!(loops.max_samples(48_000.0), 480_000);
        assert_eq!(loops.loops(), Some(2));
    }

    #[test]
    fn test_pcm_conversion_clips() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(4.0), i16::MAX);
        assert_eq!(to_i16(-4.0), -i16::MAX);
    }
}
