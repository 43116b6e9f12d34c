//! Nearest-hit scene queries.
//!
//! [`Accel`] is the single contract the integrator relies on: given a ray,
//! return the globally nearest hit with `t > 0`, or [`Hit::MISS`]. The
//! brute-force [`LinearScan`] defines the expected answer; any faster
//! structure (see [`crate::Bvh`]) must return the same hit distance.

use lumen_core::Scene;
use lumen_math::Ray;

use crate::intersect::{intersect_plane, intersect_sphere, intersect_triangle, Hit};

/// A scene query structure.
pub trait Accel: Send + Sync {
    /// Nearest positive-t hit along `ray`, `Hit::MISS` if none.
    fn cast_ray(&self, ray: &Ray) -> Hit;
}

/// Tests every primitive of every collection. O(primitive count) per ray.
#[derive(Debug, Clone, Copy)]
pub struct LinearScan<'s> {
    scene: &'s Scene,
}

impl<'s> LinearScan<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Self { scene }
    }
}

impl Accel for LinearScan<'_> {
    fn cast_ray(&self, ray: &Ray) -> Hit {
        let mut closest = Hit::MISS;

        for sphere in &self.scene.spheres {
            closest = closest.nearest(intersect_sphere(ray, sphere));
        }
        for plane in &self.scene.planes {
            closest = closest.nearest(intersect_plane(ray, plane));
        }
        for triangle in &self.scene.triangles {
            closest = closest.nearest(intersect_triangle(ray, triangle));
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Material, Plane, Sphere, Triangle};
    use lumen_math::Vec3;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let m = scene.add_material(Material::default());
        scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, m));
        scene.add_plane(Plane::through(Vec3::new(0.0, 0.0, 20.0), -Vec3::Z, m));
        scene.add_triangle(Triangle::new(
            Vec3::new(-1.0, -1.0, 5.0),
            Vec3::new(1.0, -1.0, 5.0),
            Vec3::new(0.0, 1.0, 5.0),
            m,
        ));
        scene
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::new();
        let hit = LinearScan::new(&scene).cast_ray(&Ray::new(Vec3::ZERO, Vec3::Z));
        assert!(hit.is_miss());
        assert_eq!(hit.t, f32::INFINITY);
    }

    #[test]
    fn test_returns_minimum_t() {
        let scene = scene();
        let accel = LinearScan::new(&scene);

        // Through the triangle, sphere and plane: triangle is nearest
        let hit = accel.cast_ray(&Ray::new(Vec3::ZERO, Vec3::Z));
        assert!((hit.t - 5.0).abs() < 1e-4);

        // Past the triangle's edge: the sphere is nearest
        let hit = accel.cast_ray(&Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Z));
        assert!(hit.t > 5.0 && hit.t < 10.0);

        // Only the plane
        let hit = accel.cast_ray(&Ray::new(Vec3::new(5.0, 5.0, 0.0), Vec3::Z));
        assert!((hit.t - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_closer_primitive_never_increases_t() {
        let mut scene = scene();
        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Z);
        let before = LinearScan::new(&scene).cast_ray(&ray).t;

        scene.add_sphere(Sphere::new(Vec3::new(0.5, 0.5, 3.0), 0.5, 0));
        let after = LinearScan::new(&scene).cast_ray(&ray).t;
        assert!(after < before);

        // A farther primitive leaves the result unchanged
        scene.add_sphere(Sphere::new(Vec3::new(0.5, 0.5, 30.0), 0.5, 0));
        assert_eq!(LinearScan::new(&scene).cast_ray(&ray).t, after);
    }
}
