//! Online per-pixel statistics.

use lumen_core::Color;

/// Running mean and variance of color samples using
/// [Welford's algorithm](https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Welford's_online_algorithm).
///
/// Call [`ColorVarianceEstimator::update`] once per sample.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ColorVarianceEstimator {
    pub count: u32,
    pub mean: Color,
    m2: Color,
}

impl ColorVarianceEstimator {
    pub fn update(&mut self, value: Color) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f32;
        let delta_2 = value - self.mean;
        self.m2 += delta * delta_2;
    }

    /// Population variance, `None` until two samples have been seen.
    pub fn variance(&self) -> Option<Color> {
        if self.count >= 2 {
            Some(self.m2 / self.count as f32)
        } else {
            None
        }
    }

    /// Variance relative to `mean + 1`, so dark pixels don't need an
    /// impossibly small absolute variance.
    pub fn relative_variance(&self) -> Option<Color> {
        self.variance().map(|v| v / (self.mean + Color::ONE))
    }

    /// Relative variance of the mean (not of the individual samples) is at
    /// most `threshold` on every channel.
    pub fn is_converged(&self, threshold: f32) -> bool {
        match self.relative_variance() {
            Some(rel) => (rel / (self.count as f32).sqrt()).max_element() <= threshold,
            None => false,
        }
    }
}
