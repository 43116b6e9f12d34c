//! Simple path tracer example.
//!
//! Renders a glass sphere in a small room and saves it as PPM.
//!
//! ```text
//! cargo run --release -p lumen_renderer --example simple_render [output.ppm]
//! ```

use lumen_core::{Camera, Light, Material, Plane, RenderConfig, Scene, Sphere};
use lumen_renderer::{render, save_image, Bvh, Color, RenderContext, Vec3};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let filename = std::env::args().nth(1).unwrap_or_else(|| "output.ppm".to_string());

    let start = std::time::Instant::now();
    let scene = build_scene();
    let accel = Bvh::new(&scene);
    log::info!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig::default()
        .with_resolution(400, 225)
        .with_quality(32, 8);
    let camera = Camera::new(Vec3::new(0.0, 1.0, -4.0), Vec3::new(0.0, -0.1, 1.0))
        .with_resolution(config.width, config.height)
        .with_lens(4.0, 0.02);

    let ctx = RenderContext::new(&scene, &accel, &camera, &config);
    let image = render(&ctx);

    if let Err(e) = save_image(&image, &filename) {
        log::error!("Failed to save {}: {}", filename, e);
        std::process::exit(1);
    }
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();

    let floor = scene.add_material(Material::diffuse(Color::splat(0.75)));
    let red = scene.add_material(Material::diffuse(Color::new(0.75, 0.15, 0.1)));
    let chrome = scene.add_material(Material::opaque(Color::splat(0.9), 1.0, 4.0));
    let glass = scene.add_material(Material::transparent(
        Color::ONE,
        Color::new(0.9, 0.95, 1.0),
        1.0 / 1.52,
        0.0,
        0.0,
        0.05,
        0.95,
    ));

    scene.add_plane(Plane::through(Vec3::ZERO, Vec3::Y, floor));
    scene.add_plane(Plane::through(Vec3::new(-3.0, 0.0, 0.0), Vec3::X, red));
    scene.add_sphere(Sphere::new(Vec3::new(0.0, 1.0, 2.0), 1.0, glass));
    scene.add_sphere(Sphere::new(Vec3::new(1.8, 0.6, 3.0), 0.6, chrome));
    scene.add_light(Light::new(Vec3::new(1.0, 4.0, 0.0), Color::splat(0.8)));

    scene
}
