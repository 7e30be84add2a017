#![deny(unsafe_code)]
//! CLI binary for the ambient particle field.
//!
//! Subcommands:
//! - `render`: step the field headlessly for N frames and write a PNG
//! - `run`: drive the live loop (frames, watchdog, resume timer) on real timers
//! - `list`: print available palettes
//! - `schema`: print every configuration key with type, default and range

mod error;
mod headless;

use ambient_field_core::{FieldConfig, ParticleField, ParticlePalette, Rgba};
use ambient_field_raster::{render, snapshot, RasterSurface, RenderJob};
use ambient_field_runtime::{Animator, HostEvent, LoopConfig};
use clap::{Parser, Subcommand};
use error::CliError;
use glam::DVec2;
use headless::{run_for, HeadlessHost, Outage};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ambient-field", about = "Ambient particle field CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Configuration sources shared by `render` and `run`.
#[derive(clap::Args)]
struct ConfigArgs {
    /// JSON file with field and loop settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Settings as a JSON string; keys override the config file.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Palette name (docs, sunset, mono).
    #[arg(short, long)]
    palette: Option<String>,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Step the field for N frames and write a PNG snapshot.
    Render {
        #[command(flatten)]
        config: ConfigArgs,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 1280)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 720)]
        height: usize,

        /// Number of frames to step before drawing.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// Simulated milliseconds between frames.
        #[arg(long, default_value_t = 16.67)]
        frame_ms: f64,

        /// Pointer held at "x,y" for the whole run.
        #[arg(long, value_parser = parse_point)]
        pointer: Option<DVec2>,

        /// Background color composited under the particles.
        #[arg(long, default_value = "#0b1120")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "field.png")]
        output: PathBuf,
    },
    /// Run the live loop on real timers and report loop statistics.
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// How long to run, in milliseconds.
        #[arg(short, long, default_value_t = 5000)]
        duration_ms: u64,

        /// Frame rate of the simulated display.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Stop answering frame requests at this time (ms) to exercise the watchdog.
        #[arg(long)]
        stall_at: Option<f64>,

        /// Length of the frame outage in milliseconds.
        #[arg(long, default_value_t = 3000.0)]
        stall_for: f64,

        /// Pointer placed at "x,y" once the loop starts.
        #[arg(long, value_parser = parse_point)]
        pointer: Option<DVec2>,

        /// Write the last drawn frame as a PNG.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available palettes.
    List,
    /// Print the configuration schema as JSON.
    Schema,
}

fn parse_point(s: &str) -> Result<DVec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(DVec2::new(x, y))
}

/// Time between frames at `fps`; rejects rates with no usable interval.
fn frame_interval(fps: f64) -> Result<Duration, CliError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(CliError::Input(format!("--fps must be positive, got {fps}")));
    }
    match Duration::try_from_secs_f64(1.0 / fps) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        Ok(_) => Err(CliError::Input(format!("--fps {fps} is too high"))),
        Err(e) => Err(CliError::Input(format!("--fps {fps} is too low: {e}"))),
    }
}

/// Merges the config file, `--params` and `--palette` into one JSON object.
fn settings(args: &ConfigArgs) -> Result<Value, CliError> {
    let mut merged = match &args.config {
        Some(path) => read_json_object(path)?,
        None => Map::new(),
    };
    let params: Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let Value::Object(params) = params else {
        return Err(CliError::Input("--params must be a JSON object".into()));
    };
    merged.extend(params);
    if let Some(palette) = &args.palette {
        merged.insert("palette".into(), Value::String(palette.clone()));
    }
    Ok(Value::Object(merged))
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::Input(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
        Err(e) => Err(CliError::Input(format!("invalid JSON in {}: {e}", path.display()))),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let palettes = ParticlePalette::list_names();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "palettes": palettes }))?);
            } else {
                println!("Palettes:");
                for name in palettes {
                    println!("  {name}");
                }
            }
        }
        Command::Schema => {
            let schema = json!({
                "field": FieldConfig::param_schema(),
                "loop": LoopConfig::param_schema(),
            });
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Render {
            config,
            width,
            height,
            frames,
            frame_ms,
            pointer,
            background,
            output,
        } => {
            let field_config = FieldConfig::from_json(&settings(&config)?)?;
            let background = Rgba::parse(&background)
                .map_err(|e| CliError::Input(format!("--background: {e}")))?;
            let job = RenderJob {
                width,
                height,
                seed: config.seed,
                frames,
                frame_ms,
                pointer,
            };
            let rendered = render(&job, field_config)?;
            snapshot::write_png(&rendered.surface, Some(background), &output)?;

            let particles = rendered.field.particles().len();
            if cli.json {
                let info = json!({
                    "width": width,
                    "height": height,
                    "frames": frames,
                    "frames_skipped": rendered.frames_skipped,
                    "particles": particles,
                    "links": rendered.field.links().count(),
                    "seed": config.seed,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {particles} particles ({width}x{height}, {frames} frames, seed {}) -> {}",
                    config.seed,
                    output.display()
                );
            }
        }
        Command::Run {
            config,
            width,
            height,
            duration_ms,
            fps,
            stall_at,
            stall_for,
            pointer,
            output,
        } => {
            let settings = settings(&config)?;
            let field_config = FieldConfig::from_json(&settings)?;
            let loop_config = LoopConfig::from_json(&settings)?;
            let frame_interval = frame_interval(fps)?;
            let outage = stall_at.map(|start_ms| Outage {
                start_ms,
                end_ms: start_ms + stall_for,
            });

            let surface = RasterSurface::new(width, height)?;
            let mut animator = Animator::new(
                ParticleField::new(field_config, config.seed),
                surface,
                HeadlessHost::new(frame_interval, outage),
                loop_config,
            );
            if let Some(p) = pointer {
                animator.handle(HostEvent::PointerMoved { x: p.x, y: p.y });
            }
            run_for(&mut animator, Duration::from_millis(duration_ms));
            let stats = animator.stats();
            animator.teardown();

            if let Some(path) = &output {
                snapshot::write_png(animator.surface(), None, path)?;
            }
            if cli.json {
                let mut info = serde_json::to_value(stats)?;
                info["duration_ms"] = json!(duration_ms);
                info["particles"] = json!(animator.animation().particles().len());
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "ran {duration_ms} ms: {} frames drawn, {} skipped, {} watchdog restarts, {} errors",
                    stats.frames_drawn,
                    stats.frames_skipped,
                    stats.watchdog_restarts,
                    stats.frame_errors + stats.host_errors,
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
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

    fn args(params: &str) -> ConfigArgs {
        ConfigArgs {
            config: None,
            params: params.into(),
            palette: None,
            seed: 1,
        }
    }

    #[test]
    fn parse_point_accepts_pairs() {
        assert_eq!(parse_point("10, 20.5").unwrap(), DVec2::new(10.0, 20.5));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn settings_merge_file_params_and_palette() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.json");
        std::fs::write(&path, r#"{"damping": 0.99, "min_particles": 10}"#).unwrap();
        let args = ConfigArgs {
            config: Some(path),
            params: r#"{"min_particles": 20}"#.into(),
            palette: Some("sunset".into()),
            seed: 1,
        };
        let merged = settings(&args).unwrap();
        assert_eq!(merged["damping"], 0.99);
        assert_eq!(merged["min_particles"], 20);
        assert_eq!(merged["palette"], "sunset");
    }

    #[test]
    fn settings_reject_non_object_params() {
        let err = settings(&args("[1, 2]")).unwrap_err();
        assert_eq!(err.exit_code(), 12);
        let err = settings(&args("{oops")).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/nonexistent/field.json")),
            ..args("{}")
        };
        assert_eq!(settings(&args).unwrap_err().exit_code(), 11);
    }

    #[test]
    fn render_command_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let cli = Cli::parse_from([
            "ambient-field",
            "render",
            "-W",
            "64",
            "-H",
            "48",
            "--frames",
            "3",
            "--output",
            output.to_str().unwrap(),
        ]);
        assert!(run(cli).is_ok());
        assert!(output.exists());
    }

    #[test]
    fn unknown_palette_exits_with_input_code() {
        let cli = Cli::parse_from(["ambient-field", "render", "--palette", "plaid"]);
        let err = run(cli).err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn frame_interval_rejects_unusable_rates() {
        assert_eq!(frame_interval(50.0).unwrap(), Duration::from_millis(20));
        for fps in [0.0, -5.0, f64::NAN, 1e-300, 1e300] {
            assert_eq!(frame_interval(fps).err().unwrap().exit_code(), 12, "fps {fps}");
        }
    }

    #[test]
    fn run_with_tiny_fps_is_an_input_error() {
        let cli = Cli::parse_from(["ambient-field", "run", "--fps", "1e-300", "--duration-ms", "10"]);
        assert_eq!(run(cli).err().unwrap().exit_code(), 12);
    }
}
