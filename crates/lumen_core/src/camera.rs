//! Camera pose, lens and the medium the camera starts in.

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};
use crate::Color;

/// A participating medium: per-unit-distance transmittance and scattering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub volumetric_mask: Color,
    pub scattering_coef: f32,
}

impl Medium {
    /// Clear space: full transmittance, never scatters.
    pub const VACUUM: Medium = Medium {
        volumetric_mask: Color::ONE,
        scattering_coef: 0.0,
    };

    pub fn new(volumetric_mask: Color, scattering_coef: f32) -> Self {
        Self {
            volumetric_mask,
            scattering_coef,
        }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::VACUUM
    }
}

/// Thin-lens camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    /// Forward direction (normalized by the ray generator)
    pub direction: Vec3,
    /// Distance to the plane of perfect focus
    pub focus_distance: f32,
    /// Lens radius, 0 = pinhole
    pub aperture: f32,
    /// Image width / height
    pub aspect_ratio: f32,
    /// Medium surrounding the camera
    pub medium: Medium,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::Z,
            focus_distance: 1.0,
            aperture: 0.0,
            aspect_ratio: 16.0 / 9.0,
            medium: Medium::VACUUM,
        }
    }
}

impl Camera {
    /// Create a pinhole camera at `position` looking along `direction`.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            ..Default::default()
        }
    }

    /// Set lens settings.
    pub fn with_lens(mut self, focus_distance: f32, aperture: f32) -> Self {
        self.focus_distance = focus_distance;
        self.aperture = aperture;
        self
    }

    /// Set the aspect ratio from an image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.aspect_ratio = width as f32 / height as f32;
        self
    }

    /// Place the camera inside a medium (fog, water, ...).
    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.medium = medium;
        self
    }

    pub fn validate(&self) -> SceneResult<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.direction.length_squared() < 1e-12 {
            return Err(SceneError::InvalidCamera("zero direction".to_string()));
        }
        if !(self.focus_distance > 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "focus distance must be positive, got {}",
                self.focus_distance
            )));
        }
        if !(self.aperture >= 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "aperture must be non-negative, got {}",
                self.aperture
            )));
        }
        if self.medium.scattering_coef < 0.0 || self.medium.volumetric_mask.min_element() < 0.0 {
            return Err(SceneError::InvalidCamera(
                "medium must have non-negative mask and scattering".to_string(),
            ));
        }
        Ok(())
    }
}
