//! Scene data for the path tracer.
//!
//! Primitives are stored in flat, ordered collections and refer to their
//! material by index. Nothing in here owns geometry through pointers, so a
//! scene can be shared by reference across any number of render workers.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::Color;

/// Optical behavior of a surface and of the medium enclosed by it.
///
/// One uniform draw `key` per bounce selects exactly one response:
/// `key < key_diffuse` is diffuse, `key < key_transparent` is mirror and
/// everything above is transparent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Surface color, or the emitted color when `fixed_color` is set
    pub color: Color,

    /// Terminal surface: ends the path and contributes its color directly
    pub fixed_color: bool,

    /// Per-unit-distance transmittance of the medium inside the surface
    pub volumetric_color: Color,

    /// Scattering events per unit distance inside the surface
    pub scattering_coef: f32,

    /// Relative index of refraction when entering (outside / inside)
    pub refract_ratio: f32,

    pub key_diffuse: f32,
    pub key_transparent: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::diffuse(Color::splat(0.5))
    }
}

impl Material {
    /// An emitter. Paths that reach it end there.
    pub fn fixed(color: Color) -> Self {
        Self {
            color,
            fixed_color: true,
            volumetric_color: Color::ONE,
            scattering_coef: 0.0,
            refract_ratio: 1.0,
            key_diffuse: 1.0,
            key_transparent: 1.0,
        }
    }

    /// An opaque surface mixing diffuse and mirror reflection by relative weight.
    pub fn opaque(color: Color, diffuse: f32, mirror: f32) -> Self {
        Self::transparent(color, Color::ONE, 1.0, 0.0, diffuse, mirror, 0.0)
    }

    /// A fully diffuse surface.
    pub fn diffuse(color: Color) -> Self {
        Self::opaque(color, 1.0, 0.0)
    }

    /// A perfect mirror.
    pub fn mirror(color: Color) -> Self {
        Self::opaque(color, 0.0, 1.0)
    }

    /// A surface that may also transmit into a (possibly scattering) medium.
    ///
    /// `diffuse`, `mirror` and `transparent` are relative weights. They are
    /// normalized into the two ordered thresholds used at shading time.
    pub fn transparent(
        color: Color,
        volumetric_color: Color,
        refract_ratio: f32,
        scattering_coef: f32,
        diffuse: f32,
        mirror: f32,
        transparent: f32,
    ) -> Self {
        let total = diffuse + mirror + transparent;
        let (key_diffuse, key_transparent) = if total > 0.0 {
            (diffuse / total, (diffuse + mirror) / total)
        } else {
            (1.0, 1.0)
        };

        Self {
            color,
            fixed_color: false,
            volumetric_color,
            scattering_coef,
            refract_ratio,
            key_diffuse,
            key_transparent,
        }
    }

    /// Check the threshold ordering and the physical ranges of the medium.
    pub fn validate(&self, index: usize) -> SceneResult<()> {
        let ordered = 0.0 <= self.key_diffuse
            && self.key_diffuse <= self.key_transparent
            && self.key_transparent <= 1.0;
        if !ordered {
            return Err(SceneError::InvalidThresholds {
                index,
                key_diffuse: self.key_diffuse,
                key_transparent: self.key_transparent,
            });
        }

        if !(self.refract_ratio.is_finite() && self.refract_ratio > 0.0) {
            return Err(SceneError::InvalidMaterial {
                index,
                message: format!("refract_ratio must be positive, got {}", self.refract_ratio),
            });
        }

        if !(self.scattering_coef.is_finite() && self.scattering_coef >= 0.0) {
            return Err(SceneError::InvalidMaterial {
                index,
                message: format!(
                    "scattering_coef must be non-negative, got {}",
                    self.scattering_coef
                ),
            });
        }

        if self.volumetric_color.min_element() < 0.0 || self.color.min_element() < 0.0 {
            return Err(SceneError::InvalidMaterial {
                index,
                message: "colors must not have negative channels".to_string(),
            });
        }

        Ok(())
    }
}

/// A point light. No area, no falloff.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
}

impl Light {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: usize,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

/// An infinite plane: all points `p` with `dot(p, normal) + distance = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub distance: f32,
    pub normal: Vec3,
    pub material: usize,
}

impl Plane {
    /// Create a plane, rescaling the equation so the normal has unit length.
    pub fn new(normal: Vec3, distance: f32, material: usize) -> Self {
        let length = normal.length();
        Self {
            distance: distance / length,
            normal: normal / length,
            material,
        }
    }

    /// Create the plane through `point` facing `normal`.
    pub fn through(point: Vec3, normal: Vec3, material: usize) -> Self {
        let normal = normal.normalize();
        Self {
            distance: -point.dot(normal),
            normal,
            material,
        }
    }
}

/// A single-sided-normal triangle; the normal follows the `a, b, c` winding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    pub material: usize,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: usize) -> Self {
        Self { a, b, c, material }
    }

    /// Unit face normal, `normalize(cross(b - a, c - a))`.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize()
    }
}

/// All scene buffers. Loaded once, read-only while rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub spheres: Vec<Sphere>,
    pub planes: Vec<Plane>,
    pub triangles: Vec<Triangle>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_sphere(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn add_plane(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Total number of primitives across all collections.
    pub fn primitive_count(&self) -> usize {
        self.spheres.len() + self.planes.len() + self.triangles.len()
    }

    /// Check every material and every primitive's material reference.
    pub fn validate(&self) -> SceneResult<()> {
        for (index, material) in self.materials.iter().enumerate() {
            material.validate(index)?;
        }

        let count = self.materials.len();
        let check = |kind: &'static str, index: usize, material: usize| {
            if material < count {
                Ok(())
            } else {
                Err(SceneError::MaterialOutOfRange {
                    kind,
                    index,
                    material,
                    count,
                })
            }
        };

        for (index, sphere) in self.spheres.iter().enumerate() {
            check("sphere", index, sphere.material)?;
            if !(sphere.radius.is_finite() && sphere.radius > 0.0) {
                return Err(SceneError::DegeneratePrimitive {
                    kind: "sphere",
                    index,
                    message: format!("radius {}", sphere.radius),
                });
            }
        }

        for (index, plane) in self.planes.iter().enumerate() {
            check("plane", index, plane.material)?;
            if (plane.normal.length() - 1.0).abs() > 1e-3 || !plane.distance.is_finite() {
                return Err(SceneError::DegeneratePrimitive {
                    kind: "plane",
                    index,
                    message: "normal must be unit length".to_string(),
                });
            }
        }

        for (index, triangle) in self.triangles.iter().enumerate() {
            check("triangle", index, triangle.material)?;
            let area2 = (triangle.b - triangle.a).cross(triangle.c - triangle.a).length();
            if !(area2 > 1e-12) {
                return Err(SceneError::DegeneratePrimitive {
                    kind: "triangle",
                    index,
                    message: "zero area".to_string(),
                });
            }
        }

        Ok(())
    }
}
