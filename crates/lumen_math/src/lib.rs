// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Build an orthonormal tangent frame `(tangent, bitangent)` around a unit vector.
///
/// The tangent is `normalize(cross(up, n))` where `up` is the world Y axis,
/// swapped for the X axis when `n` is nearly parallel to Y.
pub fn orthonormal_basis(n: Vec3) -> (Vec3, Vec3) {
    let up = if n.y.abs() > 0.999 { Vec3::X } else { Vec3::Y };
    let tangent = up.cross(n).normalize();
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}

/// Raise each channel of `base` to `exp`.
#[inline]
pub fn powf3(base: Vec3, exp: f32) -> Vec3 {
    Vec3::new(base.x.powf(exp), base.y.powf(exp), base.z.powf(exp))
}
