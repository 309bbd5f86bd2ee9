//! gesture_media — command-line entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gesture_media::app::{run, Mode};
use gesture_media::config::AppConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "gesture_media=info,hand_gesture=info";

/// Control media playback with hand gestures.
#[derive(Parser, Debug)]
#[command(name = "gesture_media", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replay a JSON-lines landmark recording instead of simulating.
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// With --replay: no window, just process and log.
    #[arg(long, requires = "replay")]
    headless: bool,

    /// Pace replays by their recorded timestamps.
    #[arg(long)]
    realtime: bool,

    /// Write every processed frame to a recording.
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Log outputs instead of opening a MIDI port.
    #[arg(long)]
    no_midi: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None       => AppConfig::default(),
    };
    if cli.realtime { cfg.source.realtime = true; }
    if cli.no_midi  { cfg.midi.enabled = false; }

    if cli.print_config {
        print!("{}", cfg.to_toml_string()?);
        return Ok(());
    }

    let mode = match cli.replay {
        Some(path) => Mode::Replay { path, headless: cli.headless },
        None       => Mode::Simulate,
    };

    if !matches!(mode, Mode::Replay { headless: true, .. }) {
        println!();
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            Gesture Media — hand-tracked controls             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
    }

    run(cfg, mode, cli.record)
}
