//! Example: Load and inspect a scene file.
//!
//! Run with: cargo run --example inspect_scene -- scenes/glass.json

use std::env;

use lumen_core::load_scene_file;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_scene <path-to-scene-json>");
        return;
    }

    let path = &args[1];
    println!("Loading scene file: {}", path);

    match load_scene_file(path) {
        Ok(file) => {
            let render = &file.render;
            println!("\n=== {}x{} @ {} spp, {} bounces ===",
                render.width, render.height, render.samples_per_pixel, render.max_bounces);
            println!("Camera at {:?} looking along {:?}", file.camera.position, file.camera.direction);
            println!("Primitives: {}", file.scene.primitive_count());
            println!("Lights: {}", file.scene.lights.len());

            println!("\n--- Materials ---");
            for (i, m) in file.scene.materials.iter().enumerate() {
                if m.fixed_color {
                    println!("  [{}] emitter {:?}", i, m.color);
                } else {
                    println!(
                        "  [{}] {:?} diffuse<{:.2} mirror<{:.2} ior ratio {:.3} scatter {:.3}",
                        i, m.color, m.key_diffuse, m.key_transparent, m.refract_ratio, m.scattering_coef
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Error loading scene: {}", e);
            std::process::exit(1);
        }
    }
}
