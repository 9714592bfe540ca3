//! Windowed-sinc decimation filter
//!
//! The kernel is an ideal lowpass (sinc) tapered by a Blackman-Harris window.
//! At runtime the filter takes one block of `factor` oversampled values per
//! call and produces one output sample. The delay line persists across calls,
//! so every output sees the tail of the previous blocks.

use std::f64::consts::PI;

use crate::{Emu8910Error, Result};

/// Blackman-Harris window of length `n`
pub fn blackman_harris(n: usize) -> Vec<f64> {
    match n {
        0 => return Vec::new(),
        1 => return vec![1.0],
        _ => {}
    }

    let span = (n - 1) as f64;
    (0..n)
        .map(|i| {
            let x = i as f64;
            0.35875 - 0.48829 * (2.0 * PI * x / span).cos()
                + 0.14128 * (4.0 * PI * x / span).cos()
                - 0.01168 * (6.0 * PI * x / span).cos()
        })
        .collect()
}

/// Lowpass design parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirDesign {
    /// Number of coefficients
    pub taps: usize,
    /// Cutoff frequency in Hz
    pub cutoff: f64,
    /// Sample rate the cutoff is normalized against
    pub sample_rate: f64,
}

impl FirDesign {
    /// Create a design
    pub fn new(taps: usize, cutoff: f64, sample_rate: f64) -> Self {
        Self {
            taps,
            cutoff,
            sample_rate,
        }
    }

    /// Reject degenerate designs
    pub fn validate(&self) -> Result<()> {
        if self.taps == 0 {
            return Err(Emu8910Error::ConfigError(
                "FIR filter needs at least one tap".to_string(),
            ));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Emu8910Error::ConfigError(format!(
                "FIR sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !(self.cutoff.is_finite() && self.cutoff > 0.0) {
            return Err(Emu8910Error::ConfigError(format!(
                "FIR cutoff must be positive, got {}",
                self.cutoff
            )));
        }
        if self.cutoff >= self.sample_rate / 2.0 {
            return Err(Emu8910Error::ConfigError(format!(
                "FIR cutoff {} Hz is at or above Nyquist ({} Hz)",
                self.cutoff,
                self.sample_rate / 2.0
            )));
        }
        Ok(())
    }

    /// Generate the windowed-sinc kernel
    ///
    /// The center tap (only present for odd lengths) is `2*pi*fc/fs`.
    pub fn kernel(&self) -> Result<Vec<f32>> {
        self.validate()?;

        let window = blackman_harris(self.taps);
        let fc = self.cutoff / self.sample_rate;
        let center = (self.taps - 1) as f64 / 2.0;

        let kernel = window
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let n = i as f64 - center;
                let ideal = if n == 0.0 {
                    2.0 * PI * fc
                } else {
                    (2.0 * PI * fc * n).sin() / (PI * n)
                };
                (ideal * w) as f32
            })
            .collect();

        Ok(kernel)
    }
}

/// FIR decimator with a persistent circular delay line
///
/// The delay line holds `kernel.len() * factor` samples and is stored twice
/// back to back, so the convolution always reads a contiguous run without
/// wrapping. The write index advances one block per call, modulo
/// `kernel.len()`.
#[derive(Clone)]
pub struct DecimationFilter {
    kernel: Box<[f32]>,
    delay: Box<[f32]>,
    length: usize,
    factor: usize,
    index: usize,
}

impl DecimationFilter {
    /// Create a filter from precomputed coefficients
    pub fn new(kernel: Vec<f32>, factor: usize) -> Result<Self> {
        if kernel.is_empty() {
            return Err(Emu8910Error::ConfigError(
                "decimation kernel is empty".to_string(),
            ));
        }
        if factor == 0 {
            return Err(Emu8910Error::ConfigError(
                "decimation factor must be at least 1".to_string(),
            ));
        }

        let length = kernel.len() * factor;
        Ok(Self {
            kernel: kernel.into_boxed_slice(),
            delay: vec![0.0; length * 2].into_boxed_slice(),
            length,
            factor,
            index: 0,
        })
    }

    /// Design a kernel and build the filter in one go
    pub fn from_design(design: FirDesign, factor: usize) -> Result<Self> {
        Self::new(design.kernel()?, factor)
    }

    /// Coefficients
    pub fn kernel(&self) -> &[f32] {
        &self.kernel
    }

    /// Decimation factor (samples consumed per call)
    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Consume one block of `factor` samples and produce one output sample
    ///
    /// The newest sample of the block is aligned with the first coefficient.
    #[inline]
    pub fn process(&mut self, block: &[f32]) -> f32 {
        debug_assert_eq!(block.len(), self.factor, "block must hold one decimation period");

        let base = self.index * self.factor;
        for (i, &sample) in block.iter().take(self.factor).enumerate() {
            self.delay[base + i] = sample;
            self.delay[base + i + self.length] = sample;
        }

        // Newest sample, read from the upper copy so the taps never underflow
        let newest = base + self.factor - 1 + self.length;
        let history = &self.delay[newest + 1 - self.kernel.len()..=newest];
        let output = self
            .kernel
            .iter()
            .zip(history.iter().rev())
            .map(|(h, x)| h * x)
            .sum();

        self.index = (self.index + 1) % (self.length / self.factor);
        output
    }
}

impl std::fmt::Debug for DecimationFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecimationFilter")
            .field("taps", &self.kernel.len())
            .field("factor", &self.factor)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_window_shape() {
        let w = blackman_harris(51);
        assert_abs_diff_eq!(w[0], 0.00006, epsilon = 1e-5);
        assert_abs_diff_eq!(w[50], w[0], epsilon = 1e-12);
        assert_abs_diff_eq!(w[25], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(w[10], w[40], epsilon = 1e-12);
    }

    #[test]
    fn test_short_windows() {
        assert!(blackman_harris(0).is_empty());
        assert_eq!(blackman_harris(1), vec![1.0]);
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let kernel = FirDesign::new(50, 2100.0, 44_100.0).kernel().unwrap();
        assert_eq!(kernel.len(), 50);
        for i in 0..25 {
            assert_abs_diff_eq!(kernel[i], kernel[49 - i], epsilon = 1e-7);
        }
        // Main lobe in the middle
        assert!(kernel[24] > kernel[0]);
        assert!(kernel[24] > 0.0);
    }

    #[test]
    fn test_odd_kernel_center_tap() {
        let kernel = FirDesign::new(7, 1000.0, 8000.0).kernel().unwrap();
        let expected = 2.0 * std::f64::consts::PI * 1000.0 / 8000.0;
        assert_abs_diff_eq!(kernel[3] as f64, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_designs_fail() {
        assert!(FirDesign::new(0, 2100.0, 44_100.0).kernel().is_err());
        assert!(FirDesign::new(50, 22_050.0, 44_100.0).kernel().is_err());
        assert!(FirDesign::new(50, 30_000.0, 44_100.0).kernel().is_err());
        assert!(FirDesign::new(50, 0.0, 44_100.0).kernel().is_err());
        assert!(FirDesign::new(50, 2100.0, 0.0).kernel().is_err());
        assert!(DecimationFilter::new(Vec::new(), 8).is_err());
        assert!(DecimationFilter::new(vec![1.0], 0).is_err());
    }

    #[test]
    fn test_impulse_reproduces_kernel() {
        let kernel = FirDesign::new(50, 2100.0, 44_100.0).kernel().unwrap();
        let factor = 8;

        // An impulse `phase` samples before the end of the first block shows
        // up as coefficients phase, phase + 8, phase + 16, ...
        for phase in 0..factor {
            let mut filter = DecimationFilter::new(kernel.clone(), factor).unwrap();
            let mut block = vec![0.0; factor];
            block[factor - 1 - phase] = 1.0;

            let zeros = vec![0.0; factor];
            for call in 0.. {
                let tap = call * factor + phase;
                if tap >= kernel.len() {
                    break;
                }
                let input = if call == 0 { &block } else { &zeros };
                assert_abs_diff_eq!(filter.process(input), kernel[tap], epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn test_impulse_decays_to_zero() {
        let mut filter = DecimationFilter::new(vec![0.5, 0.25, 0.125], 1).unwrap();
        let outputs: Vec<f32> = [1.0, 0.0, 0.0, 0.0, 0.0]
            .iter()
            .map(|&x| filter.process(&[x]))
            .collect();
        assert_eq!(outputs, vec![0.5, 0.25, 0.125, 0.0, 0.0]);
    }

    #[test]
    fn test_state_persists_across_wrap() {
        let mut filter = DecimationFilter::new(vec![1.0, 1.0, 1.0], 2).unwrap();
        // Sum of the three newest samples; the last call reaches back across
        // the ring boundary into the previous lap
        assert_eq!(filter.process(&[1.0, 2.0]), 3.0);
        assert_eq!(filter.process(&[3.0, 4.0]), 9.0);
        assert_eq!(filter.process(&[5.0, 6.0]), 15.0);
        assert_eq!(filter.process(&[7.0, 8.0]), 21.0);
    }

    #[test]
    fn test_from_design_matches_manual_build() {
        let design = FirDesign::new(50, 2100.0, 44_100.0);
        let mut designed = DecimationFilter::from_design(design, 8).unwrap();
        let mut manual = DecimationFilter::new(design.kernel().unwrap(), 8).unwrap();
        assert_eq!(designed.kernel(), manual.kernel());
        assert_eq!(designed.factor(), 8);

        let block: Vec<f32> = (0..8).map(|i| i as f32 / 8.0).collect();
        for _ in 0..10 {
            assert_eq!(designed.process(&block), manual.process(&block));
        }

        assert!(DecimationFilter::from_design(FirDesign::new(0, 2100.0, 44_100.0), 8).is_err());
    }

    #[test]
    fn test_dc_gain_matches_kernel_sum() {
        let kernel = FirDesign::new(50, 2100.0, 44_100.0).kernel().unwrap();
        let gain: f32 = kernel.iter().sum();
        let mut filter = DecimationFilter::new(kernel, 8).unwrap();

        let mut output = 0.0;
        for _ in 0..20 {
            output = filter.process(&[1.0; 8]);
        }
        assert_abs_diff_eq!(output, gain, epsilon = 1e-5);
    }
}
