//! Clock domains
//!
//! Fractional accumulators that turn the host's fixed output cadence into
//! chip-clock ticks and frame-callback ticks.

/// Chip clock oscillator
///
/// `step` is the chip-clock increment applied to the generators on every
/// tick; `cycle` accumulates the per-iteration advance and produces a tick
/// whenever it passes 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    frequency: f64,
    scale: f64,
    cycle: f64,
    step: f64,
}

impl Oscillator {
    /// Create an oscillator for a chip clock in Hz
    pub fn new(frequency: f64, scale: f64) -> Self {
        Self {
            frequency,
            scale,
            cycle: 0.0,
            step: 0.0,
        }
    }

    /// Chip clock in Hz
    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Change the chip clock; takes effect on the next prepare
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Generator increment per chip tick
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Fractional position within the current tick, always in `[0, 1]`
    #[inline]
    pub fn cycle(&self) -> f64 {
        self.cycle
    }

    /// Compute increments for one output sample split into `oversample`
    /// iterations
    ///
    /// Returns the accumulator advance per iteration; the generator step is
    /// that value divided by the oversample factor.
    #[inline]
    pub fn prepare(&mut self, output_rate: f64, oversample: usize) -> f64 {
        let clock_step = self.frequency * self.scale / output_rate;
        self.step = clock_step / oversample as f64;
        clock_step
    }

    /// Accumulate `advance`; true when a chip tick is due
    ///
    /// Exactly 1 is subtracted per tick and the remainder carried. When the
    /// advance exceeds one whole tick per iteration the excess is folded back
    /// into `(0, 1]`, which still ticks on every following iteration.
    #[inline]
    pub fn advance(&mut self, advance: f64) -> bool {
        self.cycle += advance;
        if self.cycle > 1.0 {
            self.cycle -= 1.0;
            if self.cycle > 1.0 {
                self.cycle -= self.cycle.ceil() - 1.0;
            }
            true
        } else {
            false
        }
    }
}

/// Periodic frame callback scheduler
///
/// Fires at most once per output sample. On firing the accumulator restarts
/// from zero and the fractional remainder is discarded, so the long-run frame
/// rate runs slightly below `frequency`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameScheduler {
    frequency: f64,
    cycle: f64,
}

impl FrameScheduler {
    /// Create a scheduler for a frame rate in Hz
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            cycle: 0.0,
        }
    }

    /// Frame rate in Hz
    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Change the frame rate
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Advance by one output sample; true when the frame routine is due
    #[inline]
    pub fn advance(&mut self, output_rate: f64) -> bool {
        self.cycle += self.frequency / output_rate;
        if self.cycle > 1.0 {
            self.cycle = 0.0;
            true
        } else {
            false
        }
    }
}
