//! Command-line FYM renderer
//!
//! Renders an FYM register dump through the emulator into a WAV file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use emu8910::ChipConfig;
use fym_replayer::{render_to_wav, FymPlayer, RenderLimit};

/// Cap for loop-based renders of tracks that never reach their end
const MAX_LOOP_SECONDS: f64 = 3600.0;

#[derive(Parser)]
#[command(name = "fym-play")]
#[command(about = "Render FYM register dumps to WAV through an AY-3-8910 emulator")]
struct Args {
    /// FYM file to play (zlib-compressed or raw)
    input: PathBuf,

    /// Output WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Render this many seconds
    #[arg(short, long, conflicts_with = "loops")]
    seconds: Option<f64>,

    /// Render until the track has looped this many times (default 1)
    #[arg(short, long)]
    loops: Option<u32>,

    /// Chip configuration as JSON (missing fields use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<ChipConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: ChipConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ChipConfig::default(),
    };

    let limit = match (args.seconds, args.loops) {
        (Some(seconds), _) if !(seconds.is_finite() && seconds > 0.0) => {
            bail!("--seconds must be positive, got {seconds}")
        }
        (Some(seconds), _) => RenderLimit::Seconds(seconds),
        (None, loops) => RenderLimit::Loops {
            count: loops.unwrap_or(1),
            max_seconds: MAX_LOOP_SECONDS,
        },
    };

    let mut player = FymPlayer::load_file(&args.input, config)
        .with_context(|| format!("loading {}", args.input.display()))?;

    println!("File Information:");
    println!("{}", player.format_info());

    let frames = render_to_wav(&mut player, &args.output, limit)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {:.1}s ({} loops) to {}",
        frames as f64 / player.sample_rate(),
        player.loop_count(),
        args.output.display()
    );
    Ok(())
}
