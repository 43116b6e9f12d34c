//! Progressive refinement across repeated dispatches.
//!
//! Each pixel slot carries its running mean and the state of its random
//! stream. A dispatch resumes every stream where the previous one stopped,
//! so refining in batches needs no state outside the buffer.

use bytemuck::{Pod, Zeroable};
use lumen_core::{Color, RenderConfig};
use rayon::prelude::*;

use crate::renderer::{render_samples, ImageBuffer, RenderContext};
use crate::rng::XorShift32;

/// One pixel slot: an RGB mean plus the seed in the fourth channel.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ProgressivePixel {
    pub color: [f32; 3],
    pub seed: u32,
}

/// Running estimate of a whole frame.
#[derive(Debug, Clone)]
pub struct ProgressiveBuffer {
    width: u32,
    height: u32,
    samples: u32,
    pixels: Vec<ProgressivePixel>,
}

impl ProgressiveBuffer {
    /// Empty estimate sized for `config`, streams seeded from `config.seed`.
    pub fn new(config: &RenderConfig) -> Self {
        let pixels = (0..config.pixel_count())
            .map(|index| ProgressivePixel {
                color: [0.0; 3],
                seed: XorShift32::for_pixel(config.seed, index as u32).state(),
            })
            .collect();

        Self {
            width: config.width,
            height: config.height,
            samples: 0,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples accumulated per pixel so far.
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn pixels(&self) -> &[ProgressivePixel] {
        &self.pixels
    }

    /// Raw RGBA-shaped storage, four 32-bit words per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Add `samples` more samples to every pixel.
    ///
    /// Rows are handed to rayon as disjoint chunks; each pixel is only ever
    /// touched by the worker owning its row.
    pub fn dispatch(&mut self, ctx: &RenderContext, samples: u32) {
        if samples == 0 {
            return;
        }

        let previous = self.samples as f32;
        let total = previous + samples as f32;
        let width = self.width as usize;

        self.pixels
            .par_chunks_mut(width.max(1))
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    let mut rng = XorShift32::new(pixel.seed);
                    let batch = render_samples(ctx, x as u32, y as u32, samples, &mut rng);

                    let mean = Color::from_array(pixel.color);
                    let merged = (mean * previous + batch * samples as f32) / total;

                    pixel.color = merged.to_array();
                    pixel.seed = rng.state();
                }
            });

        self.samples += samples;
        log::debug!("Progressive buffer at {} samples per pixel", self.samples);
    }

    /// Current estimate as a linear image.
    pub fn to_image(&self) -> ImageBuffer {
        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self
                .pixels
                .iter()
                .map(|p| Color::from_array(p.color))
                .collect(),
        }
    }
}
