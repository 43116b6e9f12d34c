//! Lumen - command line path tracer.
//!
//! Renders a JSON scene file or one of the built-in demos to PNG or PPM.

mod demos;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use lumen_core::{load_scene_file, SceneFile, StopCondition};
use lumen_renderer::{
    render, save_image, Accel, Bvh, LinearScan, ProgressiveBuffer, RenderContext,
};

fn cli() -> Command {
    Command::new("lumen")
        .about("Monte Carlo path tracer")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!([SCENE] "Scene file (.json)"))
        .arg(arg!(-d --demo <NAME> "Render a built-in demo scene").value_parser(demos::NAMES))
        .arg(arg!(-o --output <PATH> "Output image (.png or .ppm)").default_value("render.png"))
        .arg(arg!(-s --samples <N> "Samples per pixel").value_parser(value_parser!(u32)))
        .arg(arg!(-b --bounces <N> "Maximum bounces per path").value_parser(value_parser!(u32)))
        .arg(arg!(-r --resolution <RES> "Output resolution (WIDTHxHEIGHT)"))
        .arg(
            arg!(-p --progressive <FRAMES> "Refine over this many passes, saving after each")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            arg!(--seed <SEED> "Base seed for the per-pixel random streams")
                .value_parser(value_parser!(u32)),
        )
        .arg(arg!(--linear "Test every primitive instead of building a BVH"))
}

/// Parse `WIDTHxHEIGHT`.
fn parse_resolution(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow!("resolution '{s}' is not WIDTHxHEIGHT"))?;
    let width = w.trim().parse().with_context(|| format!("bad width in '{s}'"))?;
    let height = h.trim().parse().with_context(|| format!("bad height in '{s}'"))?;
    Ok((width, height))
}

fn load_input(matches: &ArgMatches) -> Result<SceneFile> {
    let scene = matches.get_one::<String>("SCENE");
    let demo = matches.get_one::<String>("demo");

    match (scene, demo) {
        (Some(_), Some(_)) => bail!("pass either a scene file or --demo, not both"),
        (Some(path), None) => {
            load_scene_file(path).with_context(|| format!("failed to load scene '{path}'"))
        }
        (None, Some(name)) => {
            log::info!("Using demo scene '{}'", name);
            demos::demo(name).ok_or_else(|| anyhow!("unknown demo '{name}'"))
        }
        (None, None) => bail!("no scene given (try --demo {})", demos::NAMES[0]),
    }
}

/// Apply command line overrides on top of the scene's render settings.
fn apply_overrides(file: &mut SceneFile, matches: &ArgMatches) -> Result<()> {
    if let Some(&samples) = matches.get_one::<u32>("samples") {
        file.render.samples_per_pixel = samples;
    }
    if let Some(&bounces) = matches.get_one::<u32>("bounces") {
        file.render.max_bounces = bounces;
    }
    if let Some(res) = matches.get_one::<String>("resolution") {
        let (width, height) = parse_resolution(res)?;
        file.render.width = width;
        file.render.height = height;
    }
    if let Some(&seed) = matches.get_one::<u32>("seed") {
        file.render.seed = seed;
    }

    file.prepare();
    file.validate().context("invalid render settings")?;
    Ok(())
}

/// Split `total` samples over at most `passes` passes.
///
/// Every pass gets at least one sample and the counts sum to `total`; the
/// first `total % passes` passes take the remainder.
fn pass_sample_counts(total: u32, passes: u32) -> Vec<u32> {
    let passes = passes.min(total).max(1);
    let base = total / passes;
    let extra = total % passes;
    (0..passes).map(|pass| base + u32::from(pass < extra)).collect()
}

/// Refine `buffer` pass by pass, calling `after_pass` once each pass lands.
fn render_progressive(
    ctx: &RenderContext,
    buffer: &mut ProgressiveBuffer,
    passes: u32,
    mut after_pass: impl FnMut(&ProgressiveBuffer, usize, usize) -> Result<()>,
) -> Result<()> {
    if matches!(ctx.config.stop_condition, StopCondition::Variance { .. }) {
        log::warn!(
            "Progressive passes use a fixed sample count; ignoring the variance stop condition"
        );
    }

    let counts = pass_sample_counts(ctx.config.samples_per_pixel, passes);
    if counts.len() < passes as usize {
        log::warn!(
            "Only {} samples per pixel, rendering {} passes instead of {}",
            ctx.config.samples_per_pixel,
            counts.len(),
            passes
        );
    }

    for (pass, &samples) in counts.iter().enumerate() {
        buffer.dispatch(ctx, samples);
        after_pass(buffer, pass + 1, counts.len())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = cli().get_matches();

    let mut file = load_input(&matches)?;
    apply_overrides(&mut file, &matches)?;

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("render.png"));

    let accel: Box<dyn Accel + '_> = if matches.get_flag("linear") {
        Box::new(LinearScan::new(&file.scene))
    } else {
        Box::new(Bvh::new(&file.scene))
    };
    let ctx = RenderContext::new(&file.scene, accel.as_ref(), &file.camera, &file.render);

    match matches.get_one::<u32>("progressive") {
        Some(&passes) => {
            let mut buffer = ProgressiveBuffer::new(&file.render);
            render_progressive(&ctx, &mut buffer, passes, |buffer, pass, total| {
                save_image(&buffer.to_image(), &output)
                    .with_context(|| format!("failed to write '{}'", output.display()))?;
                log::info!("Pass {}/{}: {} samples per pixel", pass, total, buffer.samples());
                Ok(())
            })?;
        }
        None => {
            let image = render(&ctx);
            save_image(&image, &output)
                .with_context(|| format!("failed to write '{}'", output.display()))?;
        }
    }

    Ok(())
}
