use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glint_anim::ManualClock;
use glint_input::{FrameSource, HeadlessWindow, MoveKey};
use glint_render::{FrameRenderer, RecordingDevice, SceneConfig, shaders};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glint-cli", about = "CLI tool for glint scenes and shaders")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print a shader program's uniform names and byte offsets
    Layout {
        /// Show the light marker program instead of the lit one
        #[arg(long)]
        unlit: bool,
        /// Only names starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Render frames headlessly against a recording device
    Frames {
        /// Number of frames to render
        #[arg(short, long, default_value = "3")]
        count: u64,
        /// Seconds per frame
        #[arg(long, default_value = "1.0")]
        dt: f32,
        /// Scene description (JSON). Defaults to the procedural scene.
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Hold the forward key for the whole run
        #[arg(long)]
        forward: bool,
        /// Draw triangle edges only
        #[arg(long)]
        wireframe: bool,
    },
    /// Write a scene description to a JSON file
    Scene {
        output: PathBuf,
        /// Write the procedural scene instead of the house scene
        #[arg(long)]
        procedural: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("glint-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", glint_common::crate_info());
            println!("assets: {}", glint_assets::crate_info());
            println!("anim: {}", glint_anim::crate_info());
            println!("input: {}", glint_input::crate_info());
            println!("render: {}", glint_render::crate_info());
            println!("backend: {}", glint_render_wgpu::crate_info());
            println!("max point lights: {}", shaders::MAX_POINT_LIGHTS);
        }
        Commands::Layout { unlit, prefix } => {
            let source = if unlit {
                shaders::unlit_source()
            } else {
                shaders::lit_source()
            };
            let layout = &source.uniforms;
            println!(
                "program {:?}: {} uniforms, block {} bytes",
                source.label,
                layout.len(),
                layout.block_size()
            );
            for entry in layout.entries() {
                if prefix.as_deref().is_some_and(|p| !entry.name.starts_with(p)) {
                    continue;
                }
                println!("{:>5}  {:<8} {}", entry.offset, format!("{:?}", entry.kind), entry.name);
            }
        }
        Commands::Frames {
            count,
            dt,
            scene,
            forward,
            wireframe,
        } => {
            let mut config = match &scene {
                Some(path) => SceneConfig::load(path).with_context(|| format!("loading {path:?}"))?,
                None => SceneConfig::procedural(),
            };
            config.wireframe |= wireframe;
            let mut device = RecordingDevice::new();
            let clock = ManualClock::new();
            let mut renderer = FrameRenderer::build(&mut device, &config, clock.clone(), 1280, 720)
                .context("building scene")?;

            let mut window = HeadlessWindow::fixed(dt, count);
            if forward {
                window.input.press(MoveKey::Forward);
            }
            println!("Rendering {count} frames, dt={dt}s");
            while !window.should_close() {
                window.begin_frame();
                let stats = renderer.render_frame(&mut device, &mut window);
                clock.advance_secs(dt);
                println!(
                    "frame {}: time={:.2} main_draws={} marker_draws={} eye=({:.2}, {:.2}, {:.2})",
                    stats.frame,
                    stats.time,
                    stats.main_draws,
                    stats.marker_draws,
                    stats.eye.x,
                    stats.eye.y,
                    stats.eye.z
                );
            }
            println!(
                "Recorded {} commands over {} frames",
                device.commands().len(),
                device.frames_finished()
            );
            renderer.destroy(&mut device);
        }
        Commands::Scene { output, procedural } => {
            let config = if procedural {
                SceneConfig::procedural()
            } else {
                SceneConfig::default()
            };
            config.save(&output).with_context(|| format!("writing {output:?}"))?;
            println!(
                "Wrote {} lights, {} models to {output:?}",
                config.lights.len(),
                config.models.len()
            );
        }
    }

    Ok(())
}
