//! Direct lighting from point lights.

use lumen_core::{Color, Light};
use lumen_math::{Ray, Vec3};

use crate::accel::Accel;
use crate::integrator::SHADOW_BIAS;

/// Sum the unoccluded contribution of every light at `point`.
///
/// Each light adds `color * |cos|` between `normal` and the direction to the
/// light. The absolute value lets either side of a surface be lit. There is
/// no distance falloff.
pub fn sample_lights(accel: &dyn Accel, lights: &[Light], point: Vec3, normal: Vec3) -> Color {
    let origin = point + normal * SHADOW_BIAS;
    let mut result = Color::ZERO;

    for light in lights {
        let to_light = light.position - origin;
        let distance = to_light.length();
        if distance <= 0.0 {
            continue;
        }

        let shadow_ray = Ray::new(origin, to_light / distance);
        let occluder = accel.cast_ray(&shadow_ray);
        if occluder.t > distance {
            result += light.color * normal.dot(shadow_ray.direction).abs();
        }
    }

    result
}
