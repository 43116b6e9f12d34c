//! Lumen Renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over the plain scene data of `lumen_core`.
//!
//! Pieces, bottom-up:
//! - [`XorShift32`]: per-worker random stream
//! - [`Accel`]: nearest-hit queries ([`LinearScan`], [`Bvh`])
//! - [`Integrator`]: bounded bounce loop with stochastic material selection,
//!   participating media and point-light sampling
//! - [`render`], [`ProgressiveBuffer`]: frame accumulation on rayon

mod accel;
mod bucket;
mod bvh;
mod camera;
mod integrator;
mod intersect;
mod light;
mod material;
mod output;
mod progressive;
mod renderer;
mod rng;
mod stats;

pub use accel::{Accel, LinearScan};
pub use bucket::{generate_buckets, render_bucket, Bucket};
pub use bvh::Bvh;
pub use camera::CameraSampler;
pub use integrator::{Integrator, SHADOW_BIAS};
pub use intersect::{intersect_plane, intersect_sphere, intersect_triangle, Hit};
pub use light::sample_lights;
pub use material::{reflect, refract, MediumState, Refraction, Technique};
pub use output::{save_image, save_png, save_ppm, write_ppm, OutputError, OutputResult};
pub use progressive::{ProgressiveBuffer, ProgressivePixel};
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_pixel, render_samples, render_with_cancel,
    ImageBuffer, PixelResult, RenderContext,
};
pub use rng::XorShift32;
pub use stats::ColorVarianceEstimator;

/// Re-export the scene types the renderer works on
pub use lumen_core::{Camera, Color, Medium, RenderConfig, Scene, StopCondition};
pub use lumen_math::{Ray, Vec3};
