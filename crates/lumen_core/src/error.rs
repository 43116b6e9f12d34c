//! Validation errors for scene data and render settings.

use thiserror::Error;

/// Problems found while validating a scene, camera or render configuration.
///
/// The renderer assumes validated input, so these are raised by loaders and
/// front ends before a render starts, never from inside the integrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("{kind} {index} references material {material}, but only {count} materials exist")]
    MaterialOutOfRange {
        kind: &'static str,
        index: usize,
        material: usize,
        count: usize,
    },

    #[error("material {index}: thresholds must satisfy 0 <= key_diffuse ({key_diffuse}) <= key_transparent ({key_transparent}) <= 1")]
    InvalidThresholds {
        index: usize,
        key_diffuse: f32,
        key_transparent: f32,
    },

    #[error("material {index}: {message}")]
    InvalidMaterial { index: usize, message: String },

    #[error("{kind} {index} is degenerate: {message}")]
    DegeneratePrimitive {
        kind: &'static str,
        index: usize,
        message: String,
    },

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for validation.
pub type SceneResult<T> = Result<T, SceneError>;
