use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::RgbImage;
use pose_overlay_lib::core::config::Config;
use pose_overlay_lib::core::frame_stager::FrameStager;
use pose_overlay_lib::core::overlay_projector::project;
use pose_overlay_lib::core::overlay_renderer::render_overlay;
use pose_overlay_lib::core::pose_classifier::PoseClassifier;
use pose_overlay_lib::platform::pose::load_recording;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Skeleton overlay and pose classification for recorded landmark streams
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show per-frame classifier numerics
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON landmark recording through stager, classifier and projector
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Recording file (JSON array of detections)
    #[arg(short, long)]
    recording: PathBuf,

    /// Configuration file [default: ~/.pose_overlay/settings.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep face and feet joints
    #[arg(long, default_value_t = false)]
    full: bool,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Write one rendered PNG per frame into this directory
    #[arg(long)]
    save_dir: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn replay(args: &ReplayArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if args.full {
        config.filter_landmarks = false;
    }
    let width = args.width.unwrap_or(config.image_width);
    let height = args.height.unwrap_or(config.image_height);

    let detections = load_recording(&args.recording)?;
    tracing::info!(
        recording = %args.recording.display(),
        detections = detections.len(),
        filter_landmarks = config.filter_landmarks,
        "Replaying recording"
    );

    if let Some(dir) = &args.save_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let stager = FrameStager::with_filter(config.filter_landmarks);
    let classifier = PoseClassifier::new(config.thresholds);

    for (index, detection) in detections.into_iter().enumerate() {
        let timestamp_ms = detection.timestamp_ms;
        match detection.into_frame() {
            Ok(frame) => {
                // A rejected frame leaves the previous one staged
                let _ = stager.submit_frame(frame);
            }
            Err(e) => tracing::warn!(timestamp_ms, "Skipping detection: {}", e),
        }

        let frame = stager.current_frame();
        let classification = classifier.classify(frame.as_deref());
        let overlay = project(frame.as_deref(), &classification, width, height);

        println!(
            "{}\t{}\t{} segments\t{} points",
            timestamp_ms,
            classification.label,
            overlay.segments.len(),
            overlay.markers.len()
        );

        if let Some(dir) = &args.save_dir {
            let mut image = RgbImage::new(width, height);
            render_overlay(&mut image, &overlay, &config.style);
            let path = dir.join(format!("frame_{:05}.png", index));
            image
                .save(&path)
                .with_context(|| format!("Failed to save {}", path.display()))?;
        }
    }

    let stats = stager.statistics();
    tracing::info!(
        staged = stats.frames_staged,
        cleared = stats.frames_cleared,
        rejected = stats.frames_rejected,
        "Replay finished"
    );

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Replay(args) => replay(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
