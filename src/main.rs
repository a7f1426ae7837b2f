use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use clip_cutter::api::{collect_inputs, VideoCutter};
use clip_cutter::CutterConfig;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clip-cutter")]
#[command(about = "Cut gameplay segments out of recordings by matching reference screenshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect segments, write one clip per segment and delete each source
    Cut {
        #[command(flatten)]
        detect: DetectArgs,

        /// Output directory for clips
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for scratch audio files
        #[arg(long)]
        temp: Option<PathBuf>,

        /// Keep source videos after cutting
        #[arg(long, default_value_t = false)]
        keep_source: bool,
    },
    /// Detect segments and print them without touching any file
    Detect {
        #[command(flatten)]
        detect: DetectArgs,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args)]
struct DetectArgs {
    /// Video files, `<stem>` paths, or directories of .mp4 files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON config file
    #[arg(short, long, env = "CLIP_CUTTER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of reference images
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Sampling interval in seconds
    #[arg(long)]
    intervals: Option<u32>,

    /// Consecutive matching samples needed to start a segment
    #[arg(long)]
    start_grace: Option<usize>,

    /// Consecutive non-matching samples needed to end a segment
    #[arg(long)]
    end_grace: Option<usize>,

    /// Samples into the end window used as the stop time
    #[arg(long)]
    stop_offset: Option<usize>,

    /// First frame to sample
    #[arg(long)]
    start_frame: Option<u64>,
}

impl DetectArgs {
    fn config(&self) -> Result<CutterConfig> {
        let mut config = match &self.config {
            Some(path) => CutterConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CutterConfig::default(),
        };
        if let Some(images) = &self.images {
            config.image_dir = images.clone();
        }
        if let Some(v) = self.intervals {
            config.intervals = v;
        }
        if let Some(v) = self.start_grace {
            config.start_grace = v;
        }
        if let Some(v) = self.end_grace {
            config.end_grace = v;
        }
        if let Some(v) = self.stop_offset {
            config.stop_offset = v;
        }
        if let Some(v) = self.start_frame {
            config.start_frame = v;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    clip_cutter::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Cut {
            detect,
            output,
            temp,
            keep_source,
        } => {
            let mut config = detect.config()?;
            if let Some(output) = output {
                config.output_dir = output;
            }
            if let Some(temp) = temp {
                config.temp_dir = temp;
            }
            config.keep_source |= keep_source;
            run_cut(config, &detect.inputs)
        }
        Command::Detect { detect, json } => run_detect(detect.config()?, &detect.inputs, json),
    }
}

fn run_cut(config: CutterConfig, inputs: &[PathBuf]) -> Result<()> {
    let cutter = VideoCutter::create(config).context("Failed to initialize")?;
    let videos = collect_inputs(inputs)?;
    if videos.is_empty() {
        bail!("No input videos found");
    }

    let report = cutter.process_batch(&videos);
    let failed = report.failed().count();
    info!(
        "🏁 Done: {} videos, {} clips written, {} with failures",
        report.videos.len(),
        report.clips_written(),
        failed
    );
    if failed > 0 {
        bail!("{} of {} videos had failures", failed, report.videos.len());
    }
    Ok(())
}

fn run_detect(config: CutterConfig, inputs: &[PathBuf], json: bool) -> Result<()> {
    let cutter = VideoCutter::create(config).context("Failed to initialize")?;
    let videos = collect_inputs(inputs)?;
    if videos.is_empty() {
        bail!("No input videos found");
    }

    let mut failed = 0;
    for video in &videos {
        match cutter.detect(video) {
            Ok(result) => {
                if json {
                    let line = serde_json::json!({
                        "video": video,
                        "cuts": result.cuts,
                        "samples": result.samples,
                    });
                    println!("{}", line);
                } else {
                    println!("{}", video.display());
                    for (i, cut) in result.cuts.iter().enumerate() {
                        println!("  {}_{}: {} ({}s)", stem(video), i + 1, cut, cut.duration_secs());
                    }
                }
            }
            Err(e) => {
                error!("❌ {}: {}", video.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} videos failed", failed, videos.len());
    }
    Ok(())
}

fn stem(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
