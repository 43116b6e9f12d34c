//! Primary ray generation for the thin-lens camera.

use lumen_core::Camera;
use lumen_math::{orthonormal_basis, Ray, Vec2, Vec3};

use crate::rng::XorShift32;

/// Precomputed camera frame for one image resolution.
///
/// Screen coordinates are centered in `[-0.5, 0.5]` horizontally, flipped so
/// that +y is up, and the vertical axis is divided by the aspect ratio. The
/// image plane sits at unit distance along the forward axis.
#[derive(Debug, Clone, Copy)]
pub struct CameraSampler {
    position: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    focus_distance: f32,
    aperture: f32,
    aspect_ratio: f32,
    width: f32,
    height: f32,
}

impl CameraSampler {
    pub fn new(camera: &Camera, width: u32, height: u32) -> Self {
        let forward = camera.direction.normalize();
        let (right, up) = orthonormal_basis(forward);

        Self {
            position: camera.position,
            forward,
            right,
            up,
            focus_distance: camera.focus_distance,
            aperture: camera.aperture,
            aspect_ratio: camera.aspect_ratio,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Screen coordinate of a point inside pixel `(x, y)`.
    ///
    /// `jitter` is the offset within the pixel in `[0, 1)^2`, `(0.5, 0.5)`
    /// being the pixel center.
    #[inline]
    pub fn screen_coord(&self, x: u32, y: u32, jitter: Vec2) -> Vec2 {
        let u = (x as f32 + jitter.x) / self.width - 0.5;
        let v = 0.5 - (y as f32 + jitter.y) / self.height;
        Vec2::new(u, v / self.aspect_ratio)
    }

    /// Pinhole ray through a point of pixel `(x, y)`.
    pub fn primary_ray(&self, x: u32, y: u32, jitter: Vec2) -> Ray {
        let coord = self.screen_coord(x, y, jitter);
        let direction = self.right * coord.x + self.up * coord.y + self.forward;
        Ray::towards(self.position, direction)
    }

    /// Refocus `primary` through a lens sample. `lens` is a point in the unit
    /// disk. A zero aperture returns `primary` unchanged.
    pub fn lens_ray(&self, primary: Ray, lens: Vec2) -> Ray {
        if self.aperture <= 0.0 {
            return primary;
        }

        let focal_point = primary.at(self.focus_distance);
        let offset = lens * self.aperture;
        let origin = self.position + self.right * offset.x + self.up * offset.y;
        Ray::towards(origin, focal_point - origin)
    }

    /// Draw one camera ray for pixel `(x, y)`.
    ///
    /// Without anti-aliasing the ray goes through the pixel center. The lens
    /// sample is always drawn so the random stream advances the same way for
    /// every camera.
    pub fn ray(&self, x: u32, y: u32, anti_alias: bool, rng: &mut XorShift32) -> Ray {
        let jitter = if anti_alias {
            Vec2::new(rng.next_f32(), rng.next_f32())
        } else {
            Vec2::splat(0.5)
        };
        let primary = self.primary_ray(x, y, jitter);
        let lens = rng.next_unit_disk();
        self.lens_ray(primary, lens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_center_pixel_looks_forward() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z).with_resolution(2, 2);
        let sampler = CameraSampler::new(&camera, 2, 2);
        let ray = sampler.primary_ray(1, 1, Vec2::ZERO);
        assert!(approx_vec(ray.direction, Vec3::Z));
        assert_eq!(ray.origin, Vec3::ZERO);
    }

    #[test]
    fn test_matches_offset_formula_for_forward_z() {
        // For a +Z camera the direction is normalize((x, y, 0) + direction)
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Z).with_resolution(200, 100);
        let sampler = CameraSampler::new(&camera, 200, 100);

        let jitter = Vec2::new(0.25, 0.75);
        let coord = sampler.screen_coord(17, 80, jitter);
        let expected = (Vec3::new(coord.x, coord.y, 0.0) + Vec3::Z).normalize();

        let ray = sampler.primary_ray(17, 80, jitter);
        assert!(approx_vec(ray.direction, expected));
    }

    #[test]
    fn test_screen_coord_orientation() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z).with_resolution(100, 50);
        let sampler = CameraSampler::new(&camera, 100, 50);

        let top_left = sampler.screen_coord(0, 0, Vec2::ZERO);
        assert!((top_left.x + 0.5).abs() < 1e-6);
        // Row 0 is the top of the image; vertical extent is 1 / aspect
        assert!((top_left.y - 0.25).abs() < 1e-6);

        let bottom_right = sampler.screen_coord(99, 49, Vec2::ONE);
        assert!((bottom_right.x - 0.5).abs() < 1e-6);
        assert!((bottom_right.y + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_pinhole_ignores_lens_draws() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.2, -0.1, 1.0));
        let sampler = CameraSampler::new(&camera, 64, 36);

        let primary = sampler.primary_ray(10, 20, Vec2::splat(0.5));
        let mut rng = XorShift32::new(3);
        for _ in 0..100 {
            let lens = rng.next_unit_disk();
            assert_eq!(sampler.lens_ray(primary, lens), primary);
        }

        let a = sampler.ray(10, 20, false, &mut XorShift32::new(1));
        let b = sampler.ray(10, 20, false, &mut XorShift32::new(999));
        assert_eq!(a, b);
    }

    #[test]
    fn test_thin_lens_converges_at_focus() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z).with_lens(5.0, 0.3);
        let sampler = CameraSampler::new(&camera, 64, 36);

        let primary = sampler.primary_ray(40, 10, Vec2::splat(0.5));
        let focal_point = primary.at(5.0);

        let mut rng = XorShift32::new(11);
        for _ in 0..100 {
            let ray = sampler.lens_ray(primary, rng.next_unit_disk());
            assert!((ray.origin - camera.position).length() <= 0.3 + 1e-5);
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);

            // The refocused ray passes through the focal point
            let t = (focal_point - ray.origin).dot(ray.direction);
            assert!(approx_vec(ray.at(t), focal_point));
        }
    }

    #[test]
    fn test_anti_alias_stays_in_pixel() {
        let camera = Camera::new(Vec3::ZERO, Vec3::Z).with_resolution(10, 10);
        let sampler = CameraSampler::new(&camera, 10, 10);
        let lo = sampler.primary_ray(3, 3, Vec2::ZERO).direction;
        let hi = sampler.primary_ray(3, 3, Vec2::ONE).direction;

        let mut rng = XorShift32::new(5);
        for _ in 0..100 {
            let d = sampler.ray(3, 3, true, &mut rng).direction;
            let d = d / d.z;
            assert!(d.x >= lo.x / lo.z - 1e-5 && d.x <= hi.x / hi.z + 1e-5);
            assert!(d.y <= lo.y / lo.z + 1e-5 && d.y >= hi.y / hi.z - 1e-5);
        }
    }
}
