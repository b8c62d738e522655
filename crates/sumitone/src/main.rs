//! sumitone: stylize raster images into manga-style monochrome PNGs.
//!
//! Runs the stylization pipeline on an image file with configurable
//! parameters and writes the result (or any intermediate stage) as a
//! PNG. Useful for:
//!
//! - Producing the final quantized, edge-inked, cel-shaded output
//! - Inspecting a single stage (`--stage edges`, `--stage quantized`)
//! - Tuning the edge threshold, shadow strength, and tone table
//! - Collecting per-stage timing and count diagnostics
//!
//! # Usage
//!
//! ```text
//! sumitone [OPTIONS] --output <PATH> <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use sumitone_pipeline::diagnostics::process_staged_with_diagnostics;
use sumitone_pipeline::{PipelineConfig, RasterBuffer, StagedResult, ToneLevel};

/// Manga-style raster stylization.
///
/// Decodes an image, runs grayscale conversion, Sobel edge masking,
/// tone quantization, cel shading, and compositing, then writes the
/// selected stage as a PNG.
#[derive(Parser)]
#[command(name = "sumitone", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    output: PathBuf,

    /// Sobel gradient magnitude above which a pixel is inked as an edge.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_EDGE_THRESHOLD)]
    edge_threshold: f32,

    /// Shadow darkening strength for the cel shader.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SHADOW_STRENGTH)]
    shadow_strength: f32,

    /// Tone table as a JSON array of `{"min", "max", "value"}` objects,
    /// matched in array order.
    #[arg(long)]
    tone_levels: Option<String>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, the individual pipeline parameter flags are
    /// ignored. The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Which pipeline stage to write to the output file.
    #[arg(long, value_enum, default_value_t = Stage::Composited)]
    stage: Stage,

    /// Print per-stage diagnostics.
    #[arg(long)]
    diagnostics: bool,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Pipeline stage selection for `--stage`.
#[derive(Clone, Copy, ValueEnum)]
enum Stage {
    /// The decoded input image, unprocessed.
    Original,
    /// Grayscale conversion.
    Grayscale,
    /// Binary Sobel edge mask (transparent border).
    Edges,
    /// Tone-quantized grayscale.
    Quantized,
    /// Cel-shaded quantized buffer.
    Shaded,
    /// Final composite of edge mask and shaded buffer.
    Composited,
}

/// Pick the requested stage's buffer out of a [`StagedResult`].
const fn select_stage(staged: &StagedResult, stage: Stage) -> &RasterBuffer {
    match stage {
        Stage::Original => &staged.original,
        Stage::Grayscale => &staged.grayscale,
        Stage::Edges => &staged.edges,
        Stage::Quantized => &staged.quantized,
        Stage::Shaded => &staged.shaded,
        Stage::Composited => &staged.composited,
    }
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags. Either way the result is
/// validated before use.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        let tone_levels = match cli.tone_levels {
            Some(ref json) => serde_json::from_str::<Vec<ToneLevel>>(json)
                .map_err(|e| format!("Error parsing --tone-levels: {e}"))?,
            None => PipelineConfig::default_tone_levels(),
        };
        PipelineConfig {
            edge_threshold: cli.edge_threshold,
            shadow_strength: cli.shadow_strength,
            tone_levels,
        }
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let (staged, diagnostics) = match process_staged_with_diagnostics(&image_bytes, &config) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.diagnostics || cli.json {
        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{}", diagnostics.report());
        }
    }

    let buffer = select_stage(&staged, cli.stage);
    if let Err(e) = buffer.to_rgba_image().save(&cli.output) {
        eprintln!("Error writing {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }
    eprintln!(
        "Wrote {} ({}x{})",
        cli.output.display(),
        buffer.width(),
        buffer.height(),
    );

    ExitCode::SUCCESS
}
