//! DC offset removal filter
//!
//! The chip's output sits entirely above zero and its DC level moves with the
//! music. This filter subtracts a moving average over the last `window`
//! samples and applies a fixed attenuation.

use crate::{Emu8910Error, Result};

/// Moving-average DC blocker
#[derive(Clone)]
pub struct BiasFilter {
    /// Circular buffer of recent samples
    buffer: Box<[f32]>,
    /// Current write position in buffer
    position: usize,
    /// Running sum of all samples in buffer
    running_sum: f64,
    /// Output gain (`1 / attenuation`)
    gain: f32,
}

impl BiasFilter {
    /// Create a filter averaging over `window` samples
    pub fn new(window: usize, attenuation: f32) -> Result<Self> {
        if window == 0 {
            return Err(Emu8910Error::ConfigError(
                "bias filter window must be at least 1 sample".to_string(),
            ));
        }
        if !(attenuation.is_finite() && attenuation > 0.0) {
            return Err(Emu8910Error::ConfigError(format!(
                "bias filter attenuation must be positive, got {attenuation}"
            )));
        }

        Ok(Self {
            buffer: vec![0.0; window].into_boxed_slice(),
            position: 0,
            running_sum: 0.0,
            gain: 1.0 / attenuation,
        })
    }

    /// Process a sample and return the DC-adjusted value
    #[inline]
    pub fn step(&mut self, sample: f32) -> f32 {
        self.running_sum += f64::from(sample) - f64::from(self.buffer[self.position]);
        self.buffer[self.position] = sample;

        self.position += 1;
        if self.position == self.buffer.len() {
            self.position = 0;
        }

        let dc_offset = (self.running_sum / self.buffer.len() as f64) as f32;
        (sample - dc_offset) * self.gain
    }

    /// Averaging window length
    pub fn window(&self) -> usize {
        self.buffer.len()
    }
}

impl std::fmt::Debug for BiasFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasFilter")
            .field("window", &self.buffer.len())
            .field("position", &self.position)
            .field("running_sum", &self.running_sum)
            .finish_non_exhaustive()
    }
}
