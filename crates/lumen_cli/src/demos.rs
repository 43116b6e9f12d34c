//! Built-in demo scenes.

use lumen_core::{
    Camera, Color, Light, Material, Medium, Plane, RenderConfig, Scene, SceneFile, Sphere,
    Triangle,
};
use lumen_math::{orthonormal_basis, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Relative index of refraction from air into glass.
const GLASS_REFRACT: f32 = 1.0 / 1.52;

/// Names accepted by [`demo`].
pub const NAMES: [&str; 4] = ["spheres", "glass", "fog", "tiles"];

/// Look up a demo scene by name.
pub fn demo(name: &str) -> Option<SceneFile> {
    match name {
        "spheres" => Some(spheres()),
        "glass" => Some(glass()),
        "fog" => Some(fog()),
        "tiles" => Some(tiles()),
        _ => None,
    }
}

/// sRGB-encoded 8-bit color to linear.
fn srgb(r: u8, g: u8, b: u8) -> Color {
    fn channel(c: u8) -> f32 {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    Color::new(channel(r), channel(g), channel(b))
}

/// Floor, a red and a green mixed diffuse/mirror sphere and a glass sphere
/// between them.
fn three_spheres(scene: &mut Scene) {
    let floor = scene.add_material(Material::opaque(Color::splat(0.9), 1.0, 0.2));
    let red = scene.add_material(Material::opaque(srgb(255, 0, 0), 10.0, 10.0));
    let glass = scene.add_material(Material::transparent(
        Color::ONE,
        srgb(150, 150, 255),
        GLASS_REFRACT,
        0.0,
        0.0,
        0.0,
        10.0,
    ));
    let green = scene.add_material(Material::opaque(srgb(0, 128, 0), 10.0, 10.0));

    scene.add_plane(Plane::new(Vec3::Y, 0.0, floor));
    scene.add_sphere(Sphere::new(Vec3::new(-3.0, 3.0, 5.0), 1.0, red));
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 3.0, 5.0), 1.0, glass));
    scene.add_sphere(Sphere::new(Vec3::new(3.0, 3.0, 5.0), 1.0, green));
}

fn front_camera() -> Camera {
    Camera::new(Vec3::new(0.0, 1.5, -12.0), Vec3::Z).with_lens(8.0, 0.0)
}

/// Three spheres lit by a point light.
fn spheres() -> SceneFile {
    let mut scene = Scene::new();
    three_spheres(&mut scene);
    scene.add_light(Light::new(Vec3::new(10.0, 20.0, 10.0), Color::ONE));

    SceneFile::new(front_camera(), RenderConfig::default(), scene)
}

/// Three spheres under a bright spherical emitter, without light sampling.
fn glass() -> SceneFile {
    let mut scene = Scene::new();
    three_spheres(&mut scene);
    let emitter = scene.add_material(Material::fixed(Color::splat(50.0)));
    scene.add_sphere(Sphere::new(Vec3::new(10.0, 20.0, 10.0), 3.0, emitter));

    let config = RenderConfig::default()
        .with_resolution(1024, 512)
        .with_quality(64, 8)
        .with_light_sampling(false);

    SceneFile::new(front_camera(), config, scene)
}

/// The glass scene with the camera standing in thin fog.
fn fog() -> SceneFile {
    let mut file = glass();
    file.camera = file.camera.with_medium(Medium::new(Color::ONE, 0.1));
    file
}

/// A couple of thousand randomly oriented square tiles over a light.
fn tiles() -> SceneFile {
    let mut scene = Scene::new();
    let white = scene.add_material(Material::diffuse(Color::ONE));
    let emitter = scene.add_material(Material::fixed(Color::splat(20.0)));
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 0.0, 60.0), 8.0, emitter));
    scene.add_light(Light::new(Vec3::new(0.0, 0.0, -60.0), Color::splat(0.5)));

    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..2_000 {
        let center = Vec3::new(
            rng.gen_range(-40.0..40.0),
            rng.gen_range(-40.0..40.0),
            rng.gen_range(-10.0..10.0),
        );
        let normal = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .try_normalize()
        .unwrap_or(Vec3::Z);
        let half = rng.gen_range(0.25..1.0);

        let (u, v) = orthonormal_basis(normal);
        let (u, v) = (u * half, v * half);
        let corners = [center - u - v, center + u - v, center + u + v, center - u + v];
        scene.add_triangle(Triangle::new(corners[0], corners[1], corners[2], white));
        scene.add_triangle(Triangle::new(corners[0], corners[2], corners[3], white));
    }

    let camera = Camera::new(Vec3::new(0.0, 4.0, -40.0), Vec3::new(0.0, -0.1, 1.0));
    let config = RenderConfig::default()
        .with_sky(Color::splat(0.01))
        .with_quality(16, 6);

    SceneFile::new(camera, config, scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_demos_validate() {
        for name in NAMES {
            let file = demo(name).unwrap();
            file.validate().unwrap();
            assert!((file.camera.aspect_ratio - file.render.aspect_ratio()).abs() < 1e-6);
        }
        assert!(demo("missing").is_none());
    }

    #[test]
    fn test_fog_starts_in_medium() {
        let file = demo("fog").unwrap();
        assert_eq!(file.camera.medium.scattering_coef, 0.1);
        assert_eq!(file.scene, demo("glass").unwrap().scene);
    }

    #[test]
    fn test_tiles_are_reproducible() {
        let a = demo("tiles").unwrap();
        let b = demo("tiles").unwrap();
        assert_eq!(a.scene.triangles.len(), 4_000);
        assert_eq!(a.scene, b.scene);
    }

    #[test]
    fn test_srgb() {
        assert_eq!(srgb(0, 0, 0), Color::ZERO);
        assert!((srgb(255, 255, 255) - Color::ONE).length() < 1e-6);
        assert!((srgb(128, 128, 128).x - 0.2158).abs() < 1e-3);
    }
}
