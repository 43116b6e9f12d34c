//! Stochastic material model.
//!
//! A material doesn't scatter through a trait object. The integrator draws
//! one uniform key per bounce and [`Technique::select`] compares it against
//! the material's two ordered thresholds, so exactly one response runs.
//! The volumetric side of a material (what lives *inside* the surface) is
//! tracked by [`MediumState`] as the path enters and leaves surfaces.

use lumen_core::{Color, Material, Medium};
use lumen_math::{powf3, Vec3};

use crate::rng::XorShift32;

/// Channels this close to 1 are treated as fully transparent when raised to
/// an infinite power.
const UNIT_EPSILON: f32 = 1e-5;

/// Surface response picked for one bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    Diffuse,
    Mirror,
    Transparent,
}

impl Technique {
    /// `key < key_diffuse` is diffuse, `key < key_transparent` is mirror,
    /// anything else is transparent.
    #[inline]
    pub fn select(material: &Material, key: f32) -> Technique {
        if key < material.key_diffuse {
            Technique::Diffuse
        } else if key < material.key_transparent {
            Technique::Mirror
        } else {
            Technique::Transparent
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Outcome of [`refract`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refraction {
    /// Unit outgoing direction
    pub direction: Vec3,
    /// False on total internal reflection
    pub crossed: bool,
    /// The ray arrived from the outside of the surface
    pub entering: bool,
}

/// Snell's law with the two-sided relative-index convention.
///
/// `normal` is the surface's outward normal and `refract_ratio` the relative
/// index when entering. Rays leaving the surface use the inverse ratio and
/// the flipped normal. When no transmitted direction exists the ray is
/// mirrored about `normal` as given.
pub fn refract(direction: Vec3, normal: Vec3, refract_ratio: f32) -> Refraction {
    let mut c = -normal.dot(direction);
    let entering = c >= 0.0;

    let mut r = refract_ratio;
    let mut n = normal;
    if !entering {
        r = 1.0 / r;
        c = -c;
        n = -n;
    }

    let x = 1.0 - r * r * (1.0 - c * c);
    if x < 0.0 {
        return Refraction {
            direction: reflect(direction, normal),
            crossed: false,
            entering,
        };
    }

    Refraction {
        direction: (r * direction + (r * c - x.sqrt()) * n).normalize(),
        crossed: true,
        entering,
    }
}

/// Medium a path currently travels through.
///
/// `mask` is the per-unit-distance transmittance, `scattering_coef` the
/// expected number of scattering events per unit distance. Nested media
/// compose multiplicatively / additively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumState {
    pub mask: Color,
    pub scattering_coef: f32,
}

impl From<Medium> for MediumState {
    fn from(medium: Medium) -> Self {
        Self {
            mask: medium.volumetric_mask,
            scattering_coef: medium.scattering_coef,
        }
    }
}

impl MediumState {
    /// Cross into the volume behind a surface.
    pub fn enter(&mut self, material: &Material) {
        self.mask *= material.volumetric_color;
        self.scattering_coef += material.scattering_coef;
    }

    /// Leave the volume behind a surface. A zero-transmittance channel can't
    /// be divided back out, so it stays at zero.
    pub fn exit(&mut self, material: &Material) {
        self.mask = Color::new(
            finite_or_zero(self.mask.x / material.volumetric_color.x),
            finite_or_zero(self.mask.y / material.volumetric_color.y),
            finite_or_zero(self.mask.z / material.volumetric_color.z),
        );
        self.scattering_coef -= material.scattering_coef;
    }

    /// Transmittance over `distance` units: `mask ^ distance`.
    #[inline]
    pub fn transmittance(&self, distance: f32) -> Color {
        powf3(self.mask, distance)
    }

    /// Transmittance to infinity. `x^inf` can't be evaluated in floats, so
    /// channels within epsilon of 1 pass everything and all others absorb it.
    pub fn transmittance_to_infinity(&self) -> Color {
        let channel = |c: f32| if (c - 1.0).abs() <= UNIT_EPSILON { 1.0 } else { 0.0 };
        Color::new(channel(self.mask.x), channel(self.mask.y), channel(self.mask.z))
    }

    /// Distance to the next in-medium scattering event.
    #[inline]
    pub fn free_flight(&self, rng: &mut XorShift32) -> f32 {
        rng.next_free_flight(self.scattering_coef)
    }
}

#[inline]
fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_technique_select() {
        let m = Material::transparent(Color::ONE, Color::ONE, 1.0, 0.0, 1.0, 1.0, 2.0);
        assert_eq!(Technique::select(&m, 0.0), Technique::Diffuse);
        assert_eq!(Technique::select(&m, 0.2499), Technique::Diffuse);
        assert_eq!(Technique::select(&m, 0.25), Technique::Mirror);
        assert_eq!(Technique::select(&m, 0.4999), Technique::Mirror);
        assert_eq!(Technique::select(&m, 0.5), Technique::Transparent);
        assert_eq!(Technique::select(&m, 0.9999), Technique::Transparent);
    }

    #[test]
    fn test_pure_materials_always_pick_one_technique() {
        let diffuse = Material::diffuse(Color::ONE);
        let mirror = Material::mirror(Color::ONE);
        let mut rng = XorShift32::new(8);
        for _ in 0..1000 {
            let key = rng.next_f32();
            assert_eq!(Technique::select(&diffuse, key), Technique::Diffuse);
            assert_eq!(Technique::select(&mirror, key), Technique::Mirror);
        }
    }

    #[test]
    fn test_reflect() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert!(approx_vec(r, Vec3::new(1.0, 1.0, 0.0).normalize()));
        // Independent of the normal's sign
        assert!(approx_vec(reflect(d, -Vec3::Y), r));
    }

    #[test]
    fn test_refract_straight_through() {
        let out = refract(-Vec3::Y, Vec3::Y, 1.0 / 1.5);
        assert!(out.crossed);
        assert!(out.entering);
        assert!(approx_vec(out.direction, -Vec3::Y));
    }

    #[test]
    fn test_refract_bends_toward_normal_on_entry() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let out = refract(d, Vec3::Y, 1.0 / 1.5);
        assert!(out.crossed && out.entering);

        // Snell: sin(out) = r * sin(in)
        let sin_in = d.x;
        let sin_out = out.direction.x;
        assert!((sin_out - sin_in / 1.5).abs() < 1e-5);
        assert!(out.direction.y < 0.0);
        assert!((out.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_refract_exit_uses_inverse_ratio() {
        // Leaving the medium: the ray travels along the outward normal
        let d = Vec3::new(0.3, 1.0, 0.0).normalize();
        let out = refract(d, Vec3::Y, 1.0 / 1.5);
        assert!(out.crossed);
        assert!(!out.entering);
        assert!((out.direction.x - d.x * 1.5).abs() < 1e-5);
        assert!(out.direction.y > 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Grazing exit from glass: sin(in) * 1.5 > 1
        let d = Vec3::new(0.9, 0.2, 0.0).normalize();
        let out = refract(d, Vec3::Y, 1.0 / 1.5);
        assert!(!out.crossed);
        assert!(!out.entering);
        assert!(approx_vec(out.direction, reflect(d, Vec3::Y)));
        assert!(out.direction.y < 0.0);
    }

    #[test]
    fn test_medium_enter_exit_roundtrip() {
        let glass = Material::transparent(
            Color::ONE,
            Color::new(0.5, 0.8, 1.0),
            1.0 / 1.52,
            0.3,
            0.0,
            0.0,
            1.0,
        );
        let mut medium = MediumState::from(Medium::new(Color::ONE, 0.1));

        medium.enter(&glass);
        assert!(approx_vec(medium.mask, Color::new(0.5, 0.8, 1.0)));
        assert!((medium.scattering_coef - 0.4).abs() < 1e-6);

        medium.exit(&glass);
        assert!(approx_vec(medium.mask, Color::ONE));
        assert!((medium.scattering_coef - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_medium_exit_zero_channel_goes_to_zero() {
        let ink = Material::transparent(
            Color::ONE,
            Color::new(0.0, 0.5, 1.0),
            1.0,
            0.0,
            0.0,
            0.0,
            1.0,
        );
        let mut medium = MediumState::from(Medium::VACUUM);
        medium.enter(&ink);
        medium.exit(&ink);
        // 0 / 0 is NaN, forced to exactly zero
        assert_eq!(medium.mask, Color::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_transmittance() {
        let medium = MediumState {
            mask: Color::new(0.5, 1.0, 0.0),
            scattering_coef: 0.0,
        };
        assert_eq!(medium.transmittance(2.0), Color::new(0.25, 1.0, 0.0));
        assert_eq!(medium.transmittance(0.0), Color::ONE);
    }

    #[test]
    fn test_transmittance_to_infinity() {
        let medium = MediumState {
            mask: Color::new(0.999, 1.0 + 1e-7, 1.0),
            scattering_coef: 0.0,
        };
        assert_eq!(medium.transmittance_to_infinity(), Color::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_zero_coefficient_never_scatters() {
        let medium = MediumState::from(Medium::VACUUM);
        let mut rng = XorShift32::new(1234);
        for _ in 0..10_000 {
            assert!(medium.free_flight(&mut rng) >= f32::MAX);
        }
    }
}
