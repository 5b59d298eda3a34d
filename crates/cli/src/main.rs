#![deny(unsafe_code)]
//! CLI binary for flow-particles.
//!
//! Subcommands:
//! - `render`: run a scene for N fixed-step frames and write the last frame as PNG
//! - `params`: list every tunable parameter with its default and range
//!
//! Logging goes to stderr through `env_logger`; set `RUST_LOG=debug` for
//! per-frame counts.

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flow_particles_core::command::Command as SimCommand;
use flow_particles_core::{render_frame, FrameLoop, SceneSpec, SimConfig};
use flow_particles_render::snapshot::write_png;
use flow_particles_render::PixelCanvas;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "flow-particles", about = "Noise-driven particle flow simulation")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulation for N frames and write a PNG of the final frame.
    Render {
        /// Scene file (JSON) with size, seed, params, frames, dt and
        /// scheduled commands. Replaces the individual scene flags.
        #[arg(long, conflicts_with_all = ["width", "height", "frames", "seed", "dt", "params"])]
        scene: Option<PathBuf>,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// Noise and spawn seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Fixed time step in seconds.
        #[arg(long, default_value_t = flow_particles_core::scene::DEFAULT_DT)]
        dt: f64,

        /// Simulation parameters as a JSON object (see `params`).
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List tunable parameters.
    Params,
}

fn parse_params(text: &str) -> Result<Value, CliError> {
    let params: Value = serde_json::from_str(text)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    Ok(params)
}

fn load_scene(path: &Path) -> Result<SceneSpec, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scene {}: {e}", path.display())))
}

/// Runs `scene` to completion, drawing onto a canvas that follows any
/// scheduled resizes.
fn render_scene(scene: &SceneSpec) -> Result<(PixelCanvas, usize), CliError> {
    let mut frames = FrameLoop::new(scene.build_state()?);
    let mut canvas = PixelCanvas::new(scene.width, scene.height)?;
    let mut live = 0;

    for frame in 0..scene.frames {
        for command in scene.commands_for(frame) {
            if let SimCommand::Resize { width, height } = *command {
                canvas = PixelCanvas::new(width, height)?;
            }
            frames.submit(command.clone());
        }
        let report = frames.frame_with_dt(scene.dt, &mut canvas);
        if report.rejected > 0 {
            log::warn!("frame {frame}: {} command(s) rejected", report.rejected);
        }
        live = report.step.particles;
    }

    if scene.frames == 0 {
        render_frame(frames.state(), &mut canvas);
        live = frames.state().particles().len();
    }
    Ok((canvas, live))
}

fn print_params(json: bool) -> Result<(), CliError> {
    let schema = SimConfig::param_schema();
    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }
    let Some(entries) = schema.as_object() else {
        return Ok(());
    };
    for (name, entry) in entries {
        let range = match (entry.get("min"), entry.get("max")) {
            (Some(min), Some(max)) => format!(" [{min}, {max}]"),
            (Some(min), None) => format!(" [>= {min}]"),
            _ => String::new(),
        };
        println!(
            "{name:<24} {:<10} default {}{range}\n{:<24} {}",
            entry["type"].as_str().unwrap_or("?"),
            entry["default"],
            "",
            entry["description"].as_str().unwrap_or(""),
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Params => print_params(cli.json)?,
        Command::Render {
            scene,
            width,
            height,
            frames,
            seed,
            dt,
            params,
            output,
        } => {
            let scene = match scene {
                Some(path) => load_scene(&path)?,
                None => SceneSpec {
                    params: parse_params(&params)?,
                    frames,
                    dt,
                    ..SceneSpec::new(width, height, seed)
                },
            };

            let (canvas, particles) = render_scene(&scene)?;
            write_png(&canvas, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "width": scene.width,
                    "height": scene.height,
                    "frames": scene.frames,
                    "dt": scene.dt,
                    "seed": scene.seed,
                    "particles": particles,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {}x{} ({} frames, seed {}, {particles} particles) -> {}",
                    scene.width,
                    scene.height,
                    scene.frames,
                    scene.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scene_flag_conflicts_with_inline_flags() {
        let parsed = Cli::try_parse_from([
            "flow-particles",
            "render",
            "--scene",
            "s.json",
            "--frames",
            "3",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn params_must_be_a_json_object() {
        assert!(parse_params(r#"{"friction": 0.5}"#).is_ok());
        assert_eq!(parse_params("[1, 2]").map_err(|e| e.exit_code()).err(), Some(12));
        assert_eq!(parse_params("{nope").map_err(|e| e.exit_code()).err(), Some(12));
    }

    #[test]
    fn missing_scene_file_is_io_error() {
        let err = load_scene(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn render_scene_follows_scheduled_resize() {
        let mut scene = SceneSpec::new(40, 30, 1);
        scene.frames = 3;
        scene.params = serde_json::json!({"initial_particle_count": 4});
        scene.commands.push(flow_particles_core::ScheduledCommand {
            frame: 1,
            command: SimCommand::Resize { width: 20, height: 10 },
        });
        let (canvas, _) = render_scene(&scene).unwrap();
        assert_eq!(canvas.pixels().len(), 20 * 10);
    }

    #[test]
    fn zero_frame_scene_still_draws() {
        let mut scene = SceneSpec::new(30, 30, 1);
        scene.params = serde_json::json!({"initial_particle_count": 1, "show_arrows": false});
        let (canvas, particles) = render_scene(&scene).unwrap();
        assert_eq!(particles, 1);
        assert!(canvas.pixels().iter().any(|p| p.r < 0.5), "expected a dot on the canvas");
    }

    #[test]
    fn invalid_scene_dimensions_exit_with_simulation_code() {
        let scene = SceneSpec::new(0, 30, 1);
        let err = render_scene(&scene).err().map(|e| e.exit_code());
        assert_eq!(err, Some(10));
    }
}
