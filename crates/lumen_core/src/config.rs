//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::Color;

/// When to stop taking samples for a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCondition {
    /// Exactly `RenderConfig::samples_per_pixel` samples
    SampleCount,
    /// Keep sampling until the relative variance of the mean drops below
    /// `max_relative_variance` on every channel, within `[min_samples, max_samples]`
    Variance {
        min_samples: u32,
        max_samples: u32,
        max_relative_variance: f32,
    },
}

/// Per-frame settings, read-only to the integrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Radiance of rays that escape the scene
    pub sky_color: Color,
    /// Samples per pixel for anti-aliasing and noise reduction
    pub samples_per_pixel: u32,
    /// Maximum bounce count per path
    pub max_bounces: u32,
    /// Next event estimation against the point lights
    pub sample_lights: bool,
    /// Jitter primary rays within the pixel footprint
    pub anti_alias: bool,
    pub stop_condition: StopCondition,
    /// Edge length of render buckets in pixels
    pub bucket_size: u32,
    /// Base seed for per-pixel random streams
    pub seed: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            sky_color: Color::splat(0.1),
            samples_per_pixel: 16,
            max_bounces: 8,
            sample_lights: true,
            anti_alias: true,
            stop_condition: StopCondition::SampleCount,
            bucket_size: 64,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_bounces: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    /// Set the color returned for escaping rays.
    pub fn with_sky(mut self, sky_color: Color) -> Self {
        self.sky_color = sky_color;
        self
    }

    pub fn with_light_sampling(mut self, sample_lights: bool) -> Self {
        self.sample_lights = sample_lights;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stop_condition(mut self, stop_condition: StopCondition) -> Self {
        self.stop_condition = stop_condition;
        self
    }

    /// Image width / height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidConfig(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(SceneError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.bucket_size == 0 {
            return Err(SceneError::InvalidConfig(
                "bucket_size must be at least 1".to_string(),
            ));
        }
        if let StopCondition::Variance {
            min_samples,
            max_samples,
            max_relative_variance,
        } = self.stop_condition
        {
            if min_samples < 2 || max_samples < min_samples || !(max_relative_variance > 0.0) {
                return Err(SceneError::InvalidConfig(format!(
                    "variance stop condition needs 2 <= min_samples ({min_samples}) <= max_samples ({max_samples}) and a positive threshold"
                )));
            }
        }
        Ok(())
    }
}
