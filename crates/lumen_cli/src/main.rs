//! `lumen` - inspect optical scenes, emit rays and export their trajectories.

mod launcher;

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumen_core::{load_obj, load_scene, Scene};
use lumen_math::Interval;
use lumen_tracer::{emit_scene, export_csv, export_json, export_obj, EmissionConfig, ExportOptions};

use launcher::{default_interpreters, Launcher, DEFAULT_SCRIPT};

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Forward ray-tracing scene toolkit")]
struct Args {
    #[command(subcommand)]
    command: LumenCommand,
}

#[derive(Subcommand, Debug)]
enum LumenCommand {
    /// Print the object table of a scene description or an OBJ mesh
    Inspect {
        /// Scene description (.json) or mesh (.obj)
        input: PathBuf,

        /// Dispersion table for a mesh input
        #[arg(long)]
        material: Option<PathBuf>,
    },

    /// Emit rays from every source and write them as JSON or CSV
    Emit {
        scene: PathBuf,

        #[command(flatten)]
        emission: EmissionArgs,

        #[arg(long, value_enum, default_value_t)]
        format: RayFormat,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write scene geometry and ray segments to an OBJ file
    Export {
        scene: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        emission: EmissionArgs,

        /// Length of each drawn ray
        #[arg(long, default_value_t = 10.0)]
        ray_length: f32,

        /// Also draw coordinate axes of this length
        #[arg(long)]
        axes: Option<f32>,
    },

    /// Save a strip image of the visible spectrum
    Spectrum {
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 740)]
        width: u32,

        #[arg(long, default_value_t = 60)]
        height: u32,

        /// Shortest wavelength, nm
        #[arg(long, default_value_t = 380.0)]
        min: f32,

        /// Longest wavelength, nm
        #[arg(long, default_value_t = 750.0)]
        max: f32,
    },

    /// Run the Python ray-tracing application
    Launch(LaunchArgs),
}

#[derive(clap::Args, Debug)]
struct EmissionArgs {
    /// Rays per source
    #[arg(short = 'n', long, default_value_t = 100)]
    rays: usize,

    /// Seed for all the random sampling. Output depends only on seed and ray count.
    #[arg(long, default_value_t)]
    seed: u64,
}

impl From<&EmissionArgs> for EmissionConfig {
    fn from(args: &EmissionArgs) -> Self {
        EmissionConfig {
            rays_per_source: args.rays,
            seed: args.seed,
            ..Default::default()
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum RayFormat {
    #[default]
    Json,
    Csv,
}

#[derive(clap::Args, Debug)]
struct LaunchArgs {
    /// Interpreter to probe; may be repeated. Defaults to python3 (python on Windows)
    #[arg(long = "interpreter")]
    interpreters: Vec<String>,

    #[arg(long, default_value = DEFAULT_SCRIPT)]
    script: PathBuf,

    /// Wait for Enter after the run (default on Windows)
    #[arg(long, overrides_with = "no_pause")]
    pause: bool,

    #[arg(long, overrides_with = "pause")]
    no_pause: bool,

    /// Arguments passed to the script, after `--`
    #[arg(last = true)]
    args: Vec<OsString>,
}

impl LaunchArgs {
    fn launcher(&self) -> Launcher {
        let interpreters = if self.interpreters.is_empty() {
            default_interpreters()
        } else {
            self.interpreters.clone()
        };
        let pause = match (self.pause, self.no_pause) {
            (true, _) => true,
            (_, true) => false,
            _ => cfg!(windows),
        };

        Launcher {
            interpreters,
            script: self.script.clone(),
            pause,
            search_path: None,
        }
    }
}

/// Load a scene description, or wrap a single OBJ mesh in a scene.
fn load_input(path: &Path, material: Option<&Path>) -> Result<Scene> {
    let is_obj = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("obj"));

    if is_obj {
        let polyhedron = load_obj(path, material)
            .with_context(|| format!("loading mesh {}", path.display()))?;
        let mut scene = Scene::new(polyhedron.name.clone());
        scene.add_object(polyhedron);
        return Ok(scene);
    }

    if material.is_some() {
        log::warn!("--material only applies to OBJ input, ignoring it");
    }
    load_scene(path).with_context(|| format!("loading scene {}", path.display()))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn inspect(input: &Path, material: Option<&Path>) -> Result<()> {
    let scene = load_input(input, material)?;

    print!("{}", scene.summary_table());
    println!();
    for source in scene.sources() {
        println!("{source}");
    }
    println!("{scene}");
    Ok(())
}

fn emit(scene: &Path, emission: &EmissionArgs, format: RayFormat, output: Option<&Path>) -> Result<()> {
    let scene = load_input(scene, None)?;
    let batches = emit_scene(&scene, &emission.into());

    let mut out = open_output(output)?;
    match format {
        RayFormat::Json => export_json(&mut out, &batches)?,
        RayFormat::Csv => export_csv(&mut out, &batches)?,
    }
    out.flush()?;
    Ok(())
}

fn export(scene: &Path, output: &Path, emission: &EmissionArgs, options: ExportOptions) -> Result<()> {
    let scene = load_input(scene, None)?;
    let batches = emit_scene(&scene, &emission.into());

    let mut out = open_output(Some(output))?;
    export_obj(&mut out, &scene, &batches, &options)?;
    out.flush()?;

    log::info!("Wrote {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        LumenCommand::Inspect { input, material } => inspect(&input, material.as_deref()),
        LumenCommand::Emit {
            scene,
            emission,
            format,
            output,
        } => emit(&scene, &emission, format, output.as_deref()),
        LumenCommand::Export {
            scene,
            output,
            emission,
            ray_length,
            axes,
        } => export(&scene, &output, &emission, ExportOptions { ray_length, axes }),
        LumenCommand::Spectrum {
            output,
            width,
            height,
            min,
            max,
        } => {
            ensure!(min > 0.0 && min <= max, "invalid wavelength range {min}..{max} nm");
            lumen_tracer::save_spectrum(&output, width, height, Interval::new(min, max))?;
            Ok(())
        }
        LumenCommand::Launch(launch) => {
            let code = launch.launcher().launch(&launch.args);
            std::process::exit(code);
        }
    }
}
