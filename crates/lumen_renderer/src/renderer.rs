//! Accumulation driver.
//!
//! Implements pixel estimation and whole-frame rendering with:
//! - Fixed sample counts or a variance-driven stop condition
//! - Buckets rendered in parallel with rayon, center first
//! - Cooperative cancellation between buckets
//! - Gamma correction for 8-bit output

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use lumen_core::{Camera, Color, RenderConfig, Scene, StopCondition};
use rayon::prelude::*;

use crate::accel::Accel;
use crate::bucket::{generate_buckets, render_bucket, Bucket};
use crate::camera::CameraSampler;
use crate::integrator::Integrator;
use crate::rng::XorShift32;
use crate::stats::ColorVarianceEstimator;

/// True when the camera frame has the same shape as the output image.
fn aspect_matches(camera: &Camera, config: &RenderConfig) -> bool {
    (camera.aspect_ratio - config.aspect_ratio()).abs() <= 1e-3 * config.aspect_ratio()
}

/// Shared, read-only state of one render.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    pub camera: CameraSampler,
    pub integrator: Integrator<'a>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        scene: &'a Scene,
        accel: &'a dyn Accel,
        camera: &Camera,
        config: &'a RenderConfig,
    ) -> Self {
        if !aspect_matches(camera, config) {
            log::warn!(
                "Camera aspect ratio {:.4} does not match the {}x{} resolution ({:.4}); the image will be stretched",
                camera.aspect_ratio,
                config.width,
                config.height,
                config.aspect_ratio()
            );
        }

        Self {
            config,
            camera: CameraSampler::new(camera, config.width, config.height),
            integrator: Integrator::new(scene, accel, config, camera.medium),
        }
    }

    /// Trace one camera sample through pixel `(x, y)`.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, rng: &mut XorShift32) -> Color {
        let ray = self.camera.ray(x, y, self.config.anti_alias, rng);
        self.integrator.trace(ray, rng)
    }
}

/// Estimated color of a pixel and the number of samples behind it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PixelResult {
    pub color: Color,
    pub samples: u32,
}

/// Average of `samples` independent camera samples drawn from one stream.
pub fn render_samples(
    ctx: &RenderContext,
    x: u32,
    y: u32,
    samples: u32,
    rng: &mut XorShift32,
) -> Color {
    let mut sum = Color::ZERO;
    for _ in 0..samples {
        sum += ctx.sample(x, y, rng);
    }
    sum / samples as f32
}

/// Render a single pixel according to the configured stop condition.
pub fn render_pixel(ctx: &RenderContext, x: u32, y: u32, rng: &mut XorShift32) -> PixelResult {
    match ctx.config.stop_condition {
        StopCondition::SampleCount => {
            let samples = ctx.config.samples_per_pixel;
            PixelResult {
                color: render_samples(ctx, x, y, samples, rng),
                samples,
            }
        }
        StopCondition::Variance {
            min_samples,
            max_samples,
            max_relative_variance,
        } => {
            let min_samples = min_samples.max(2);
            let mut estimator = ColorVarianceEstimator::default();
            while estimator.count < max_samples.max(min_samples) {
                estimator.update(ctx.sample(x, y, rng));
                if estimator.count >= min_samples && estimator.is_converged(max_relative_variance) {
                    break;
                }
            }
            PixelResult {
                color: estimator.mean,
                samples: estimator.count,
            }
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Linear color image in row-major order, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a finished bucket's pixels into place.
    pub fn write_bucket(&mut self, bucket: &Bucket, pixels: &[Color]) {
        for ((x, y), &color) in bucket.coords().zip(pixels) {
            self.set(x, y, color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Convert to RGB bytes, dropping alpha.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color)[..3]);
        }
        bytes
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Render the whole frame.
pub fn render(ctx: &RenderContext) -> ImageBuffer {
    render_with_cancel(ctx, &AtomicBool::new(false))
}

/// Render the whole frame, stopping early once `cancel` is set.
///
/// Cancellation is checked before each bucket starts. Buckets that finished
/// are kept; the rest of the image stays black.
pub fn render_with_cancel(ctx: &RenderContext, cancel: &AtomicBool) -> ImageBuffer {
    let config = ctx.config;
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);
    let total = buckets.len();
    let finished = AtomicUsize::new(0);
    let start = Instant::now();

    log::info!(
        "Rendering {}x{} in {} buckets ({} bounces)",
        config.width,
        config.height,
        total,
        config.max_bounces
    );

    let results: Vec<(Bucket, Vec<Color>)> = buckets
        .par_iter()
        .filter_map(|bucket| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }

            let pixels = render_bucket(bucket, ctx);

            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            if done * 10 / total != (done - 1) * 10 / total {
                log::info!("Progress {}% ({}/{} buckets)", done * 100 / total, done, total);
            }

            Some((*bucket, pixels))
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for (bucket, pixels) in &results {
        image.write_bucket(bucket, pixels);
    }

    if results.len() < total {
        log::warn!(
            "Render cancelled after {}/{} buckets ({:.2?})",
            results.len(),
            total,
            start.elapsed()
        );
    } else {
        log::info!("Render finished in {:.2?}", start.elapsed());
    }

    image
}
