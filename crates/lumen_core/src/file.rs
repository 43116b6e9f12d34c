//! JSON scene files.
//!
//! A scene file bundles everything a render needs:
//!
//! ```json
//! {
//!   "camera": { "position": [0, 1.5, -12], "direction": [0, 0, 1], "focus_distance": 8 },
//!   "render": { "width": 1024, "height": 512, "samples_per_pixel": 64 },
//!   "scene": {
//!     "materials": [{ "color": [0.9, 0.9, 0.9], "key_diffuse": 0.8, "key_transparent": 1 }],
//!     "lights": [{ "position": [10, 20, 10], "color": [1, 1, 1] }],
//!     "planes": [{ "distance": 0, "normal": [0, 1, 0], "material": 0 }]
//!   }
//! }
//! ```
//!
//! Omitted fields take their defaults. The camera's aspect ratio always
//! follows the render resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::SceneError;
use crate::scene::{Plane, Scene};

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    Invalid(#[from] SceneError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Camera, render settings and scene buffers, as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    pub camera: Camera,
    pub render: RenderConfig,
    pub scene: Scene,
}

impl SceneFile {
    pub fn new(camera: Camera, render: RenderConfig, scene: Scene) -> Self {
        let mut file = Self {
            camera,
            render,
            scene,
        };
        file.prepare();
        file
    }

    /// Bring loosely written input into canonical form: unit plane normals
    /// and a camera aspect ratio matching the resolution.
    pub fn prepare(&mut self) {
        for plane in &mut self.scene.planes {
            if plane.normal.length_squared() > 0.0 {
                *plane = Plane::new(plane.normal, plane.distance, plane.material);
            }
        }
        if self.render.height > 0 {
            self.camera.aspect_ratio = self.render.aspect_ratio();
        }
    }

    /// Validate camera, configuration and scene together.
    pub fn validate(&self) -> Result<(), SceneError> {
        self.render.validate()?;
        self.camera.validate()?;
        self.scene.validate()?;

        if self.render.sample_lights && self.scene.lights.is_empty() {
            log::warn!("Light sampling is enabled but the scene has no lights");
        }
        Ok(())
    }
}

/// Parse and validate a scene from a JSON string.
pub fn parse_scene(json: &str) -> LoadResult<SceneFile> {
    let mut file: SceneFile = serde_json::from_str(json)?;
    file.prepare();
    file.validate()?;
    Ok(file)
}

/// Load and validate a scene file.
pub fn load_scene_file<P: AsRef<Path>>(path: P) -> LoadResult<SceneFile> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let file = parse_scene(&json)?;

    log::info!(
        "Loaded {}: {} materials, {} lights, {} spheres, {} planes, {} triangles",
        path.display(),
        file.scene.materials.len(),
        file.scene.lights.len(),
        file.scene.spheres.len(),
        file.scene.planes.len(),
        file.scene.triangles.len()
    );

    Ok(file)
}

/// Write a scene file as pretty-printed JSON.
pub fn save_scene_file<P: AsRef<Path>>(path: P, file: &SceneFile) -> LoadResult<()> {
    let json = serde_json::to_string_pretty(file)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Light, Material, Sphere};
    use crate::Color;
    use lumen_math::Vec3;

    const MINIMAL: &str = r#"{
        "camera": { "position": [0, 1.5, -12], "direction": [0, 0, 1], "focus_distance": 8 },
        "render": { "width": 64, "height": 32, "samples_per_pixel": 4 },
        "scene": {
            "materials": [{ "color": [0.9, 0.9, 0.9], "key_diffuse": 0.8, "key_transparent": 1 }],
            "lights": [{ "position": [10, 20, 10], "color": [1, 1, 1] }],
            "planes": [{ "distance": 0, "normal": [0, 2, 0], "material": 0 }]
        }
    }"#;

    #[test]
    fn test_parse_minimal_scene() {
        let file = parse_scene(MINIMAL).unwrap();

        assert_eq!(file.render.width, 64);
        assert_eq!(file.render.max_bounces, RenderConfig::default().max_bounces);
        assert_eq!(file.camera.aspect_ratio, 2.0);
        assert_eq!(file.camera.focus_distance, 8.0);
        // Normal rescaled to unit length
        assert_eq!(file.scene.planes[0].normal, Vec3::Y);
        // Unspecified material fields fall back to defaults
        assert_eq!(file.scene.materials[0].refract_ratio, 1.0);
        assert!(!file.scene.materials[0].fixed_color);
    }

    #[test]
    fn test_parse_rejects_bad_material_reference() {
        let json = r#"{ "scene": { "spheres": [{ "center": [0, 0, 0], "radius": 1, "material": 2 }] } }"#;
        let err = parse_scene(json).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(SceneError::MaterialOutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(parse_scene("{ nope"), Err(LoadError::Json(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut scene = Scene::new();
        let floor = scene.add_material(Material::opaque(Color::splat(0.9), 1.0, 0.2));
        let light = scene.add_material(Material::fixed(Color::splat(50.0)));
        scene.add_plane(Plane::through(Vec3::ZERO, Vec3::Y, floor));
        scene.add_sphere(Sphere::new(Vec3::new(10.0, 20.0, 10.0), 3.0, light));
        scene.add_light(Light::new(Vec3::new(10.0, 20.0, 10.0), Color::ONE));

        let file = SceneFile::new(
            Camera::new(Vec3::new(0.0, 1.5, -12.0), Vec3::Z),
            RenderConfig::default().with_resolution(32, 16),
            scene,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        save_scene_file(&path, &file).unwrap();
        let loaded = load_scene_file(&path).unwrap();

        assert_eq!(loaded, file);
    }

    #[test]
    fn test_bundled_sample_scene() {
        let file = parse_scene(include_str!("../../../scenes/glass.json")).unwrap();
        assert_eq!(file.scene.spheres.len(), 3);
        assert_eq!(file.scene.materials[2].key_transparent, 0.0);
        assert_eq!(file.camera.aspect_ratio, 2.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scene_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
