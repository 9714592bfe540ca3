//! Four-point cubic interpolator

/// Catmull-Rom spline over the last four raw samples
///
/// Evaluating at phase `mu` interpolates between the second and third stored
/// samples. Evaluation never touches the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interpolator {
    history: [f32; 4],
}

impl Interpolator {
    /// Create an interpolator with zeroed history
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift a new raw sample into the history
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.history.copy_within(1.., 0);
        self.history[3] = sample;
    }

    /// Evaluate the spline at `mu` in `[0, 1]`
    #[inline]
    pub fn cubic(&self, mu: f32) -> f32 {
        let [y0, y1, y2, y3] = self.history;

        let a0 = -0.5 * y0 + 1.5 * y1 - 1.5 * y2 + 0.5 * y3;
        let a1 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
        let a2 = -0.5 * y0 + 0.5 * y2;
        let a3 = y1;

        ((a0 * mu + a1) * mu + a2) * mu + a3
    }

    /// Stored samples, oldest first
    pub fn history(&self) -> &[f32; 4] {
        &self.history
    }
}
