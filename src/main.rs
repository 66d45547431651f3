//! scrollscape: render a scroll sweep of a scene to PNG frames.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scrollscape::{FrameClock, ImageSink, ParticleSystemConfig, Rgb, Scene, Viewport};
use tracing_subscriber::EnvFilter;

const BACKGROUND: Rgb = Rgb::new(12, 13, 16);

#[derive(Parser)]
#[command(name = "scrollscape", about = "Render a scroll sweep of a particle landscape")]
struct Args {
    /// Scene configuration (JSON). Defaults to the built-in scene.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the frames are written to.
    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    /// Number of frames from progress 0 to 1.
    #[arg(short, long, default_value_t = 24)]
    frames: u32,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Animation time step between frames, in seconds.
    #[arg(long, default_value_t = 1.0 / 30.0)]
    dt: f32,

    /// Override the configuration's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Write the default configuration to this path and exit.
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "scrollscape=info".into()),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.dump_config {
        ParticleSystemConfig::default().save(path)?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => ParticleSystemConfig::load(path)?,
        None => ParticleSystemConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    tracing::info!(
        estimated = config.estimated_particle_count(),
        landmarks = config.landmarks.len(),
        "scene configured"
    );

    let viewport = Viewport::new(args.width as f32, args.height as f32);
    let mut scene = Scene::new(config, viewport)?;
    let mut sink = ImageSink::new(args.width, args.height, BACKGROUND);
    let mut clock = FrameClock::fixed(args.dt);

    let frames = args.frames.max(1);
    for frame in 0..frames {
        let progress = if frames == 1 {
            0.0
        } else {
            frame as f32 / (frames - 1) as f32
        };
        let time = clock.update();
        let stats = scene.tick(progress, time, &mut sink)?;

        let path = args.out.join(format!("frame_{frame:04}.png"));
        sink.save_png(&path)?;
        tracing::info!(
            frame,
            progress,
            emitted = stats.emitted,
            culled = stats.culled(),
            path = %path.display(),
            "frame written"
        );
    }

    Ok(())
}
