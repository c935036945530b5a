use anyhow::{bail, Context, Result};
use clap::Parser;
use geoid_globe::config::{GridSpec, RenderConfig, SynthesisConfig};
use geoid_globe::harmonics::{load_coefficients, synthesize_on_grid};
use geoid_globe::render::{save_map_png, texture_from_grid, FfmpegSink, FrameSequencer, FrameSink, PngSequenceSink};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geoid-globe")]
#[command(about = "Synthesize a geoid from a .gfc model and render it as a rotating globe")]
struct Cli {
    /// ICGEM .gfc coefficient file
    #[arg(long)]
    gfc: PathBuf,

    /// Maximum degree to synthesize
    #[arg(long, default_value_t = 180)]
    lmax: usize,

    /// Minimum degree to synthesize
    #[arg(long, default_value_t = 2)]
    lmin: usize,

    /// Grid spacing in degrees
    #[arg(long, default_value_t = 1.0)]
    grid_step: f64,

    /// Still equirectangular map (PNG)
    #[arg(long)]
    out_map: Option<PathBuf>,

    /// Rotating-globe video, encoded with ffmpeg
    #[arg(long, conflicts_with = "frames_dir")]
    out_video: Option<PathBuf>,

    /// Write frames as a PNG sequence instead of a video
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Video length in seconds
    #[arg(long, default_value_t = 6.0)]
    duration: f64,

    /// Frame width and height in pixels
    #[arg(long, default_value_t = 720)]
    size: usize,

    /// Viewing tilt in degrees
    #[arg(long, default_value_t = 15.0, allow_hyphen_values = true)]
    lat0: f64,

    /// Rotation speed in degrees per second
    #[arg(long, default_value_t = 60.0, allow_hyphen_values = true)]
    spin: f64,
}

impl Cli {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            fps: self.fps,
            duration_s: self.duration,
            size_px: self.size,
            lat0_deg: self.lat0,
            spin_deg_per_s: self.spin,
            ..RenderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if cli.out_map.is_none() && cli.out_video.is_none() && cli.frames_dir.is_none() {
        bail!("nothing to do: pass --out-map, --out-video or --frames-dir");
    }

    let synth_cfg = SynthesisConfig {
        lmax: cli.lmax,
        lmin: cli.lmin,
        ..SynthesisConfig::default()
    };
    synth_cfg.validate().context("invalid synthesis settings")?;
    let spec = GridSpec::with_step(cli.grid_step);
    let render_cfg = cli.render_config();
    render_cfg.validate().context("invalid render settings")?;

    let table = load_coefficients(&cli.gfc, cli.lmax)
        .with_context(|| format!("failed to read coefficients from {}", cli.gfc.display()))?;
    let grid = synthesize_on_grid(&table, &synth_cfg, &spec).context("geoid synthesis failed")?;
    let texture = texture_from_grid(&grid);

    if let Some(path) = &cli.out_map {
        save_map_png(&texture, &grid.lons().view(), path)
            .with_context(|| format!("failed to write map {}", path.display()))?;
    }

    let mut sink: Box<dyn FrameSink> = match (&cli.out_video, &cli.frames_dir) {
        (Some(path), _) => Box::new(
            FfmpegSink::new(path, render_cfg.size_px, render_cfg.fps)
                .context("failed to start the video encoder")?,
        ),
        (None, Some(dir)) => Box::new(
            PngSequenceSink::new(dir).with_context(|| format!("failed to create {}", dir.display()))?,
        ),
        (None, None) => return Ok(()),
    };

    let sequencer = FrameSequencer::new(&texture, render_cfg)?;
    let frames = sequencer.run(sink.as_mut()).context("rendering failed")?;
    info!(frames, "done");
    Ok(())
}
