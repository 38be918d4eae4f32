use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use inkshake::decoding::load_source_image;
use inkshake::encoding::{frame_digest, PngSequenceWriter};
use inkshake::error_codes::classify_error;
use inkshake::frame::RenderParams;
use inkshake::manifest::{load_and_validate_manifest, LoadedManifest};
use inkshake::resample::RenderMode;
use inkshake::sequence::{frame_file_name, stream_sequence};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("INKSHAKE_GIT_HASH"),
    ")"
);

#[derive(Debug, Parser)]
#[command(name = "inkshake")]
#[command(about = "Render hand-shake jitter frames from black/white artwork")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results and errors as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a manifest and its source image
    Check { manifest: PathBuf },
    /// Render the frame sequence to numbered PNGs
    Render {
        manifest: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print a SHA-256 digest per rendered frame
    Digest {
        manifest: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Debug, Args)]
struct Overrides {
    /// Base seed; frame i uses seed + i
    #[arg(long)]
    seed: Option<u64>,
    /// Number of frames to render
    #[arg(long)]
    frames: Option<u32>,
    /// Compose ink over a transparent background
    #[arg(long)]
    transparent: bool,
    /// Opaque ink on white; same output as the default mask-only mode
    #[arg(long, conflicts_with = "transparent")]
    threshold_all: bool,
}

impl Overrides {
    fn apply(&self, loaded: &LoadedManifest) -> (RenderParams, u32) {
        let mut params = loaded.params;
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if self.transparent || self.threshold_all {
            params.mode = RenderMode::from_flags(!self.threshold_all, self.transparent);
        }
        let frames = self.frames.unwrap_or_else(|| loaded.total_frames());
        (params, frames)
    }
}

fn init_tracing(verbosity: u8) {
    // map -v to log level
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("inkshake={level}")));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Check { manifest } => run_check(manifest, cli.json),
        Commands::Render {
            manifest,
            output,
            overrides,
        } => run_render(manifest, output.as_deref(), overrides, cli.json),
        Commands::Digest {
            manifest,
            overrides,
        } => run_digest(manifest, overrides, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_error(&error, cli.json);
            ExitCode::FAILURE
        }
    }
}

fn report_error(error: &anyhow::Error, as_json: bool) {
    if as_json {
        let envelope = classify_error(error).envelope();
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => println!("{text}"),
            Err(_) => eprintln!("error: {error:#}"),
        }
    } else {
        eprintln!("error: {error:#}");
    }
}

fn run_check(manifest_path: &Path, as_json: bool) -> Result<()> {
    let loaded = load_and_validate_manifest(manifest_path)?;
    let source = load_source_image(loaded.source_path())?;
    let params = loaded.params;

    if as_json {
        print_json(&json!({
            "ok": true,
            "manifest": manifest_path.display().to_string(),
            "source": loaded.source_path().display().to_string(),
            "width": source.width(),
            "height": source.height(),
            "frames": loaded.total_frames(),
            "fps": loaded.manifest.animation.fps,
            "params": params_json(&params),
        }))?;
    } else {
        println!(
            "OK: {} ({}x{}, {} frames @ {} fps, strength {}, {} cells, seed {}, {})",
            manifest_path.display(),
            source.width(),
            source.height(),
            loaded.total_frames(),
            loaded.manifest.animation.fps,
            params.strength,
            params.cell_count,
            params.seed,
            params.mode.keyword()
        );
    }
    Ok(())
}

fn run_render(
    manifest_path: &Path,
    output: Option<&Path>,
    overrides: &Overrides,
    as_json: bool,
) -> Result<()> {
    let loaded = load_and_validate_manifest(manifest_path)?;
    let (params, frame_count) = overrides.apply(&loaded);
    let output_dir = output.unwrap_or_else(|| loaded.output_dir()).to_path_buf();
    let prefix = loaded.manifest.output.prefix.as_str();
    let source = load_source_image(loaded.source_path())?;

    let writer = PngSequenceWriter::spawn(&output_dir, prefix)?;
    let started = Instant::now();
    stream_sequence(&source, &params, frame_count, |index, frame| {
        writer
            .write_frame(index, frame)
            .with_context(|| format!("failed writing frame {index}"))
    })
    .with_context(|| format!("failed to render {}", manifest_path.display()))?;
    let written = writer.finish().context("png writer failed")?;
    info!(
        count = written.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        dir = %output_dir.display(),
        "wrote frames"
    );

    if as_json {
        print_json(&json!({
            "ok": true,
            "output_dir": output_dir.display().to_string(),
            "frames": written
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>(),
            "params": params_json(&params),
        }))?;
    } else {
        println!("{}", output_dir.display());
    }
    Ok(())
}

fn run_digest(manifest_path: &Path, overrides: &Overrides, as_json: bool) -> Result<()> {
    let loaded = load_and_validate_manifest(manifest_path)?;
    let (params, frame_count) = overrides.apply(&loaded);
    let prefix = loaded.manifest.output.prefix.as_str();
    let source = load_source_image(loaded.source_path())?;

    let mut digests = Vec::new();
    stream_sequence(&source, &params, frame_count, |index, frame| {
        digests.push((frame_file_name(prefix, index), frame_digest(&frame)));
        Ok::<_, anyhow::Error>(())
    })
    .with_context(|| format!("failed to render {}", manifest_path.display()))?;

    if as_json {
        print_json(&json!({
            "ok": true,
            "params": params_json(&params),
            "frames": digests
                .iter()
                .map(|(file, sha256)| json!({ "file": file, "sha256": sha256 }))
                .collect::<Vec<_>>(),
        }))?;
    } else {
        for (file, sha256) in &digests {
            println!("{sha256}  {file}");
        }
    }
    Ok(())
}

fn params_json(params: &RenderParams) -> serde_json::Value {
    json!({
        "strength": params.strength,
        "cell_count": params.cell_count,
        "threshold": params.threshold,
        "seed": params.seed,
        "antialias": params.antialias,
        "mode": params.mode.keyword(),
    })
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize json output")?;
    println!("{text}");
    Ok(())
}
