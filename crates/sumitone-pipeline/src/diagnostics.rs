//! Pipeline diagnostics: timing, counts, and densities for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter tuning: how many pixels each tone bucket caught, how dense
//! the edge mask is, how much ink the composite lays down, and where the
//! time goes. [`process_staged_with_diagnostics`] collects them
//! alongside the pipeline results.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since [`std::time::Duration`] does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{PipelineConfig, PipelineError, RasterBuffer, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 0: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 1: grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 2a: Sobel edge detection.
    pub edge_detection: StageDiagnostics,
    /// Stage 2b: tone quantization.
    pub quantization: StageDiagnostics,
    /// Stage 3: cel shading.
    pub shading: StageDiagnostics,
    /// Stage 4: compositing.
    pub compositing: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Grayscale conversion metrics.
    Grayscale {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Sobel edge detection metrics.
    EdgeDetection {
        /// Gradient magnitude threshold (strict `>`).
        threshold: f32,
        /// Number of interior pixels classified as edges.
        edge_pixel_count: u64,
        /// Number of interior pixels (borders are never computed).
        interior_pixel_count: u64,
    },
    /// Tone quantization metrics.
    Quantization {
        /// Number of tone levels in the table.
        level_count: usize,
        /// Pixels caught by some tone level.
        matched_pixels: u64,
        /// Pixels that fell into a gap and passed through unchanged.
        passthrough_pixels: u64,
    },
    /// Cel shading metrics.
    Shading {
        /// Shadow strength used for the dark branch.
        strength: f32,
        /// Pixels in the shadow branch (gray < 128).
        shadow_pixels: u64,
        /// Pixels in the highlight branch (gray > 192).
        highlight_pixels: u64,
        /// Pixels left untouched (128 <= gray <= 192).
        midtone_pixels: u64,
    },
    /// Compositing metrics.
    Compositing {
        /// Pixels inked black (edge mask R == 0, borders included).
        inked_pixels: u64,
        /// Total pixel count.
        total_pixels: u64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Interior pixels classified as edges.
    pub edge_pixel_count: u64,
    /// Pixels inked black in the final composite.
    pub inked_pixel_count: u64,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Grayscale", &self.grayscale),
            ("Edge Detection", &self.edge_detection),
            ("Quantization", &self.quantization),
            ("Shading", &self.shading),
            ("Compositing", &self.compositing),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Edge pixels: {}  |  Inked pixels: {}",
            self.summary.edge_pixel_count, self.summary.inked_pixel_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
#[allow(clippy::cast_precision_loss)]
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Grayscale { width, height } => format!("{width}x{height}"),
        StageMetrics::EdgeDetection {
            threshold,
            edge_pixel_count,
            interior_pixel_count,
        } => {
            let density = if *interior_pixel_count > 0 {
                *edge_pixel_count as f64 / *interior_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("threshold={threshold:.1} edges={edge_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Quantization {
            level_count,
            matched_pixels,
            passthrough_pixels,
        } => {
            format!("{level_count} levels, matched={matched_pixels} passthrough={passthrough_pixels}")
        }
        StageMetrics::Shading {
            strength,
            shadow_pixels,
            highlight_pixels,
            midtone_pixels,
        } => {
            format!(
                "strength={strength:.2} shadows={shadow_pixels} highlights={highlight_pixels} midtones={midtone_pixels}",
            )
        }
        StageMetrics::Compositing {
            inked_pixels,
            total_pixels,
        } => {
            let coverage = if *total_pixels > 0 {
                *inked_pixels as f64 / *total_pixels as f64 * 100.0
            } else {
                0.0
            };
            format!("inked={inked_pixels}/{total_pixels} ({coverage:.1}%)")
        }
    }
}

/// Run the pipeline stage by stage, timing each stage and deriving the
/// per-stage metrics from the intermediates.
///
/// The pixel output is byte-identical to
/// [`process_staged`](crate::process_staged) — the instrumentation only
/// observes, never alters, the buffers.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::InvalidInput`] if the input cannot be decoded.
pub fn process_staged_with_diagnostics(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let input_bytes = image_bytes.len();
    let total_start = Instant::now();

    let start = Instant::now();
    let decoded = Pipeline::new(image_bytes.to_vec(), config.clone()).decode()?;
    let decode_duration = start.elapsed();

    let start = Instant::now();
    let grayscaled = decoded.grayscale();
    let grayscale_duration = start.elapsed();

    let start = Instant::now();
    let edges_detected = grayscaled.detect_edges();
    let edge_duration = start.elapsed();

    let start = Instant::now();
    let quantized = edges_detected.quantize();
    let quantize_duration = start.elapsed();

    let start = Instant::now();
    let shaded = quantized.shade();
    let shade_duration = start.elapsed();

    let start = Instant::now();
    let composited = shaded.composite();
    let composite_duration = start.elapsed();

    let total_duration = total_start.elapsed();
    let staged = composited.into_result();

    let (width, height) = (staged.original.width(), staged.original.height());
    let pixel_count = u64::from(width) * u64::from(height);
    let edge_pixel_count = count_edge_pixels(&staged.edges);
    let inked_pixel_count = count_inked_pixels(&staged.edges);
    let (matched_pixels, passthrough_pixels) = count_quantization(&staged.grayscale, config);
    let (shadow_pixels, highlight_pixels, midtone_pixels) = count_shading_branches(&staged.quantized);

    let diagnostics = PipelineDiagnostics {
        decode: StageDiagnostics {
            duration: decode_duration,
            metrics: StageMetrics::Decode {
                input_bytes,
                width,
                height,
                pixel_count,
            },
        },
        grayscale: StageDiagnostics {
            duration: grayscale_duration,
            metrics: StageMetrics::Grayscale { width, height },
        },
        edge_detection: StageDiagnostics {
            duration: edge_duration,
            metrics: StageMetrics::EdgeDetection {
                threshold: config.edge_threshold,
                edge_pixel_count,
                interior_pixel_count: interior_pixel_count(width, height),
            },
        },
        quantization: StageDiagnostics {
            duration: quantize_duration,
            metrics: StageMetrics::Quantization {
                level_count: config.tone_levels.len(),
                matched_pixels,
                passthrough_pixels,
            },
        },
        shading: StageDiagnostics {
            duration: shade_duration,
            metrics: StageMetrics::Shading {
                strength: config.shadow_strength,
                shadow_pixels,
                highlight_pixels,
                midtone_pixels,
            },
        },
        compositing: StageDiagnostics {
            duration: composite_duration,
            metrics: StageMetrics::Compositing {
                inked_pixels: inked_pixel_count,
                total_pixels: pixel_count,
            },
        },
        total_duration,
        summary: PipelineSummary {
            image_width: width,
            image_height: height,
            pixel_count,
            edge_pixel_count,
            inked_pixel_count,
        },
    };

    Ok((staged, diagnostics))
}

/// Number of interior pixels the edge detector computes.
fn interior_pixel_count(width: u32, height: u32) -> u64 {
    u64::from(width.saturating_sub(2)) * u64::from(height.saturating_sub(2))
}

/// Count interior edge pixels in a mask: solid black `(0,0,0,255)`.
///
/// Uncomputed border pixels are `(0,0,0,0)` and do not count as edges.
pub(crate) fn count_edge_pixels(edges: &RasterBuffer) -> u64 {
    edges
        .pixels()
        .chunks_exact(4)
        .map(|px| u64::from(u8::from(px[0] == 0 && px[3] == 255)))
        .sum()
}

/// Count pixels the compositor inks black: mask R == 0, borders included.
pub(crate) fn count_inked_pixels(edges: &RasterBuffer) -> u64 {
    edges
        .pixels()
        .chunks_exact(4)
        .map(|px| u64::from(u8::from(px[0] == 0)))
        .sum()
}

/// Count how many grayscale pixels some tone level catches vs. how many
/// fall into a gap.
fn count_quantization(gray: &RasterBuffer, config: &PipelineConfig) -> (u64, u64) {
    let mut matched = 0u64;
    let mut passthrough = 0u64;
    for px in gray.pixels().chunks_exact(4) {
        if config.tone_levels.iter().any(|level| level.contains(px[0])) {
            matched += 1;
        } else {
            passthrough += 1;
        }
    }
    (matched, passthrough)
}

/// Count quantized pixels per cel-shading branch: shadow (`< 128`),
/// highlight (`> 192`), midtone (the rest).
fn count_shading_branches(quantized: &RasterBuffer) -> (u64, u64, u64) {
    let mut shadow = 0u64;
    let mut highlight = 0u64;
    let mut midtone = 0u64;
    for px in quantized.pixels().chunks_exact(4) {
        if px[0] < 128 {
            shadow += 1;
        } else if px[0] > 192 {
            highlight += 1;
        } else {
            midtone += 1;
        }
    }
    (shadow, highlight, midtone)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gray_png(width: u32, height: u32, gray: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |_, _| {
            image::Rgba([gray, gray, gray, 255])
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn count_edge_pixels_ignores_border() {
        let mut mask = RasterBuffer::new(3, 3);
        mask.set_pixel(1, 1, [0, 0, 0, 255]);
        assert_eq!(count_edge_pixels(&mask), 1);
        // The 8 transparent-black border pixels plus the center.
        assert_eq!(count_inked_pixels(&mask), 9);
    }

    #[test]
    fn quantization_counts_split_on_gaps() {
        let config = PipelineConfig {
            tone_levels: vec![crate::types::ToneLevel::new(0, 50, 0)],
            ..PipelineConfig::default()
        };
        let mut gray = RasterBuffer::new(2, 1);
        gray.set_pixel(0, 0, [40, 40, 40, 255]);
        gray.set_pixel(1, 0, [200, 200, 200, 255]);
        assert_eq!(count_quantization(&gray, &config), (1, 1));
    }

    #[test]
    fn shading_branch_counts_cover_all_pixels() {
        let mut quantized = RasterBuffer::new(3, 1);
        quantized.set_pixel(0, 0, [85, 85, 85, 255]);
        quantized.set_pixel(1, 0, [170, 170, 170, 255]);
        quantized.set_pixel(2, 0, [255, 255, 255, 255]);
        assert_eq!(count_shading_branches(&quantized), (1, 1, 1));
    }

    #[test]
    fn diagnostics_pixel_output_matches_process_staged() {
        let png = gray_png(5, 5, 100);
        let config = PipelineConfig::default();
        let (staged, _) = process_staged_with_diagnostics(&png, &config).unwrap();
        let plain = crate::process_staged(&png, &config).unwrap();
        assert_eq!(staged, plain);
    }

    #[test]
    fn diagnostics_counts_for_uniform_image() {
        // 5x5 uniform gray 100: no edges, every pixel matched by the
        // default table, every quantized pixel (85) in the shadow branch.
        let png = gray_png(5, 5, 100);
        let (_, diag) = process_staged_with_diagnostics(&png, &PipelineConfig::default()).unwrap();

        assert_eq!(diag.summary.pixel_count, 25);
        assert_eq!(diag.summary.edge_pixel_count, 0);
        // All 16 border pixels are inked.
        assert_eq!(diag.summary.inked_pixel_count, 16);

        assert!(matches!(
            diag.quantization.metrics,
            StageMetrics::Quantization {
                matched_pixels: 25,
                passthrough_pixels: 0,
                ..
            },
        ));
        assert!(matches!(
            diag.shading.metrics,
            StageMetrics::Shading {
                shadow_pixels: 25,
                highlight_pixels: 0,
                midtone_pixels: 0,
                ..
            },
        ));
    }

    #[test]
    fn report_produces_nonempty_string() {
        let png = gray_png(4, 4, 100);
        let (_, diag) = process_staged_with_diagnostics(&png, &PipelineConfig::default()).unwrap();
        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        assert!(report.contains("Edge Detection"));
        assert!(report.contains("Quantization"));
        assert!(report.contains("Compositing"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let png = gray_png(4, 4, 100);
        let (_, diag) = process_staged_with_diagnostics(&png, &PipelineConfig::default()).unwrap();
        let json = serde_json::to_string(&diag).unwrap();
        let back: PipelineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.pixel_count, 16);
    }
}
