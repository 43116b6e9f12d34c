//! Closed-form ray/primitive intersection.
//!
//! Each test returns the nearest hit with strictly positive `t`, or `None`.
//! Normals are geometric: outward for spheres, the declared normal for
//! planes and the winding normal for triangles. Deciding which side the ray
//! came from is left to the shading code.

use lumen_core::{Plane, Sphere, Triangle};
use lumen_math::{Ray, Vec3};

/// Record of the nearest ray/primitive intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the hit, `f32::INFINITY` when nothing was hit
    pub t: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Unit geometric normal
    pub normal: Vec3,
    /// Index into `Scene::materials`
    pub material: usize,
}

impl Hit {
    /// Sentinel for "no intersection".
    pub const MISS: Hit = Hit {
        t: f32::INFINITY,
        point: Vec3::ZERO,
        normal: Vec3::ZERO,
        material: 0,
    };

    #[inline]
    pub fn is_miss(&self) -> bool {
        self.t == f32::INFINITY
    }

    /// Keep whichever of `self` and `other` is nearer.
    #[inline]
    pub fn nearest(self, other: Option<Hit>) -> Hit {
        match other {
            Some(hit) if hit.t < self.t => hit,
            _ => self,
        }
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self::MISS
    }
}

/// Solve `|rel + t*dir|^2 = r^2` and keep the smaller positive root,
/// falling back to the larger one when the ray starts inside.
pub fn intersect_sphere(ray: &Ray, sphere: &Sphere) -> Option<Hit> {
    let rel = ray.origin - sphere.center;
    let b = rel.dot(ray.direction);
    let c = rel.length_squared() - sphere.radius * sphere.radius;

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();
    let mut t = -b - sqrtd;
    if t <= 0.0 {
        t = -b + sqrtd;
        if t <= 0.0 {
            return None;
        }
    }

    let point = ray.at(t);
    Some(Hit {
        t,
        point,
        normal: (point - sphere.center) / sphere.radius,
        material: sphere.material,
    })
}

/// Solve `dot(origin, n) + d + t * dot(dir, n) = 0`.
pub fn intersect_plane(ray: &Ray, plane: &Plane) -> Option<Hit> {
    let t = -(ray.origin.dot(plane.normal) + plane.distance) / ray.direction.dot(plane.normal);

    // Also rejects NaN and the parallel case
    if !t.is_finite() || t <= 0.0 {
        return None;
    }

    Some(Hit {
        t,
        point: ray.at(t),
        normal: plane.normal,
        material: plane.material,
    })
}

/// Möller-Trumbore ray-triangle intersection.
pub fn intersect_triangle(ray: &Ray, triangle: &Triangle) -> Option<Hit> {
    let edge1 = triangle.b - triangle.a;
    let edge2 = triangle.c - triangle.a;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - triangle.a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if !(t > 0.0 && t.is_finite()) {
        return None;
    }

    Some(Hit {
        t,
        point: ray.at(t),
        normal: triangle.normal(),
        material: triangle.material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 7);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = intersect_sphere(&ray, &sphere).unwrap();
        assert!(approx(hit.t, 0.5));
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.material, 7);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 0);

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(intersect_sphere(&ray, &sphere).is_none());

        // Sphere behind the origin
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(intersect_sphere(&ray, &sphere).is_none());
    }

    #[test]
    fn test_sphere_from_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = intersect_sphere(&ray, &sphere).unwrap();
        assert!(approx(hit.t, 2.0));
        // Outward normal, same direction as the ray when exiting
        assert!(hit.normal.dot(ray.direction) > 0.0);
    }

    #[test]
    fn test_plane_hit_and_reject() {
        let plane = Plane::through(Vec3::ZERO, Vec3::Y, 2);

        let down = Ray::new(Vec3::new(0.0, 3.0, 0.0), -Vec3::Y);
        let hit = intersect_plane(&down, &plane).unwrap();
        assert!(approx(hit.t, 3.0));
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.material, 2);

        // Behind the ray
        let up = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::Y);
        assert!(intersect_plane(&up, &plane).is_none());

        // Parallel
        let flat = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::X);
        assert!(intersect_plane(&flat, &plane).is_none());
    }

    #[test]
    fn test_plane_hit_from_below() {
        // y = -1 plane seen from underneath still reports its declared normal
        let plane = Plane::new(Vec3::Y, 1.0, 0);
        let ray = Ray::new(Vec3::new(0.0, -4.0, 0.0), Vec3::Y);
        let hit = intersect_plane(&ray, &plane).unwrap();
        assert!(approx(hit.t, 3.0));
        assert!(approx(hit.point.y, -1.0));
        assert_eq!(hit.normal, Vec3::Y);
    }

    #[test]
    fn test_triangle_hit() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            1,
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&ray, &tri).unwrap();
        assert!(approx(hit.t, 1.0));
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.material, 1);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            0,
        );

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(intersect_triangle(&ray, &tri).is_none());

        // Outside the edges
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), -Vec3::Z);
        assert!(intersect_triangle(&ray, &tri).is_none());
    }

    #[test]
    fn test_hit_nearest() {
        let near = Hit { t: 1.0, ..Hit::MISS };
        let far = Hit { t: 2.0, ..Hit::MISS };

        assert_eq!(Hit::MISS.nearest(Some(far)).t, 2.0);
        assert_eq!(far.nearest(Some(near)).t, 1.0);
        assert_eq!(near.nearest(Some(far)).t, 1.0);
        assert_eq!(near.nearest(None).t, 1.0);
        assert!(Hit::MISS.nearest(None).is_miss());
    }
}
