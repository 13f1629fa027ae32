//! kick - terminal kick drum designer
//!
//! Run with: cargo run --bin kick -- [--preset kick.json]
//! Offline:  cargo run --bin kick -- --preset kick.json --render kick.f32

mod app;
mod ui;

use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_kick::{synth::render_preview, KickPatch, StateCodec};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kick", about = "Layered kick drum synthesizer")]
struct Args {
    /// Preset to load (JSON preset or binary state blob)
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Sample rate for --render. Live playback uses the device rate.
    #[arg(long, default_value_t = 48_000.0)]
    sample_rate: f32,

    /// Render the kick once as raw little-endian f32 and exit
    #[arg(long)]
    render: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let patch = match &args.preset {
        Some(path) => load_preset(path)?,
        None => KickPatch::new(),
    };

    match &args.render {
        Some(out) => {
            // Logs go to stderr; only safe when the TUI is not drawing
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .with_writer(std::io::stderr)
                .init();
            render_to_file(&patch, args.sample_rate, out)
        }
        None => app::run(patch, args.preset),
    }
}

fn load_preset(path: &PathBuf) -> EyreResult<KickPatch> {
    let bytes = fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let patch = StateCodec::deserialize(&bytes, StateCodec::detect(&bytes))
        .wrap_err_with(|| format!("failed to load preset {}", path.display()))?;
    Ok(patch)
}

fn render_to_file(patch: &KickPatch, sample_rate: f32, out: &PathBuf) -> EyreResult<()> {
    saavy_kick::EngineConfig::default()
        .with_sample_rate(sample_rate)
        .validate()?;

    let samples = render_preview(patch, sample_rate);
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(out, &bytes).wrap_err_with(|| format!("failed to write {}", out.display()))?;

    let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    info!(
        path = %out.display(),
        frames = samples.len(),
        sample_rate,
        peak,
        "kick rendered"
    );
    Ok(())
}
