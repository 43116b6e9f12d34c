//! Path integrator.
//!
//! A path is traced as a bounded loop rather than recursion. Each iteration
//! is one of:
//!
//! - **Escaped**: nothing was hit, the sky term is added and the path ends
//! - **Scattered in medium**: the free flight ended before the surface, the
//!   ray moves forward and keeps its direction
//! - **Emissive surface**: a fixed-color material ends the path
//! - **Diffuse / mirror / transparent surface**: a new ray is spawned
//!
//! Running out of bounces returns whatever was gathered so far.

use lumen_core::{Color, Medium, RenderConfig, Scene};
use lumen_math::{Ray, Vec3};

use crate::accel::Accel;
use crate::light::sample_lights;
use crate::material::{reflect, refract, MediumState, Technique};
use crate::rng::XorShift32;

/// Offset applied to spawned ray origins to step off the surface.
pub const SHADOW_BIAS: f32 = 1e-4;

/// Everything needed to trace paths through one scene.
///
/// Holds only shared references, so one integrator serves every worker.
#[derive(Clone, Copy)]
pub struct Integrator<'a> {
    scene: &'a Scene,
    accel: &'a dyn Accel,
    sky_color: Color,
    max_bounces: u32,
    sample_lights: bool,
    camera_medium: MediumState,
}

impl<'a> Integrator<'a> {
    pub fn new(
        scene: &'a Scene,
        accel: &'a dyn Accel,
        config: &RenderConfig,
        camera_medium: Medium,
    ) -> Self {
        Self {
            scene,
            accel,
            sky_color: config.sky_color,
            max_bounces: config.max_bounces,
            sample_lights: config.sample_lights,
            camera_medium: camera_medium.into(),
        }
    }

    /// Estimate the radiance arriving along `ray`.
    pub fn trace(&self, mut ray: Ray, rng: &mut XorShift32) -> Color {
        let mut result = Color::ZERO;
        let mut mask = Color::ONE;
        let mut medium = self.camera_medium;

        for _ in 0..self.max_bounces {
            let hit = self.accel.cast_ray(&ray);
            let flight = medium.free_flight(rng);

            if flight < hit.t {
                mask *= medium.transmittance(flight);
                ray = Ray::new(ray.at(flight), ray.direction);
                continue;
            }

            if hit.is_miss() {
                return result + mask * medium.transmittance_to_infinity() * self.sky_color;
            }

            mask *= medium.transmittance(hit.t);

            let material = &self.scene.materials[hit.material];
            if material.fixed_color {
                return result + mask * material.color;
            }

            let technique = Technique::select(material, rng.next_f32());
            mask *= material.color;

            // Normal on the side the ray arrived from
            let facing = if hit.normal.dot(ray.direction) > 0.0 {
                -hit.normal
            } else {
                hit.normal
            };

            ray = match technique {
                Technique::Diffuse => {
                    if self.sample_lights {
                        let direct =
                            sample_lights(self.accel, &self.scene.lights, hit.point, facing);
                        result += mask * material.key_diffuse * direct;
                    }
                    let direction = rng.next_cosine_hemisphere(facing);
                    Ray::new(hit.point + facing * SHADOW_BIAS, direction)
                }
                Technique::Mirror => Ray::new(
                    hit.point + facing * SHADOW_BIAS,
                    reflect(ray.direction, hit.normal),
                ),
                Technique::Transparent => {
                    let refraction = refract(ray.direction, hit.normal, material.refract_ratio);
                    if refraction.crossed {
                        if refraction.entering {
                            medium.enter(material);
                        } else {
                            medium.exit(material);
                        }
                    }
                    offset_ray(hit.point, refraction.direction)
                }
            };
        }

        result
    }
}

#[inline]
fn offset_ray(point: Vec3, direction: Vec3) -> Ray {
    Ray::new(point + direction * SHADOW_BIAS, direction)
}
