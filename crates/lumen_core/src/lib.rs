//! Lumen Core - scene description for the Lumen path tracer.
//!
//! This crate provides:
//!
//! - **Scene data**: `Scene`, `Material`, `Light`, `Sphere`, `Plane`, `Triangle`
//! - **Render setup**: `Camera`, `Medium`, `RenderConfig`, `StopCondition`
//! - **Scene files**: JSON loading and saving with validation
//!
//! Everything here is plain data. It is built once, validated, and then
//! borrowed read-only by the renderer for the duration of a render.
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::load_scene_file;
//!
//! let file = load_scene_file("scene.json")?;
//! println!("Loaded {} primitives", file.scene.primitive_count());
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod file;
pub mod scene;

/// Color type alias (linear RGB, typically 0-1 but unbounded for emitters)
pub type Color = lumen_math::Vec3;

// Re-export commonly used types
pub use camera::{Camera, Medium};
pub use config::{RenderConfig, StopCondition};
pub use error::{SceneError, SceneResult};
pub use file::{load_scene_file, parse_scene, save_scene_file, LoadError, SceneFile};
pub use scene::{Light, Material, Plane, Scene, Sphere, Triangle};
