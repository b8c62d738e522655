//! sumitone-pipeline: pure manga-style raster stylization (sans-IO).
//!
//! Converts RGBA raster images into quantized, edge-enhanced, cel-shaded
//! monochrome-style rasters through:
//! grayscale -> { Sobel edge mask | tone quantization -> cel shading }
//! -> composite.
//!
//! Every stage is a deterministic, total function over an immutable
//! input buffer that allocates a fresh output buffer — identical input
//! and configuration produce byte-identical output. This crate has
//! **no I/O dependencies** beyond in-memory image decoding; reading and
//! writing files lives in the `sumitone` CLI crate.

pub mod composite;
pub mod diagnostics;
pub mod edge;
pub mod grayscale;
pub mod pipeline;
pub mod quantize;
pub mod shade;
pub mod stylizer;
pub mod types;

pub use pipeline::Pipeline;
pub use stylizer::Stylizer;
pub use types::{
    ConfigUpdate, PipelineConfig, PipelineError, RasterBuffer, StagedResult, ToneLevel,
};

/// Run the stylization core over an already-decoded buffer.
///
/// This is the pure heart of the pipeline: grayscale conversion, then
/// the edge mask (over the pre-quantization grayscale) in parallel with
/// quantization and cel shading, then the final composite. Total — once
/// a valid [`RasterBuffer`] exists no stage can fail.
#[must_use = "returns the stylized output buffer"]
pub fn stylize(input: &RasterBuffer, config: &PipelineConfig) -> RasterBuffer {
    let gray = grayscale::to_grayscale(input);
    let edges = edge::detect_edges(&gray, config.edge_threshold);
    let quantized = quantize::quantize(&gray, &config.tone_levels);
    let shaded = shade::shade(&quantized, config.shadow_strength);
    composite::composite(&edges, &shaded)
}

/// Decode raw image bytes and run the full stylization pipeline.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty and
/// [`PipelineError::InvalidInput`] if the image cannot be decoded. Once
/// decoding succeeds the pipeline cannot fail.
pub fn process(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<RasterBuffer, PipelineError> {
    let input = grayscale::decode(image_bytes)?;
    Ok(stylize(&input, config))
}

/// Like [`process`], but preserving every intermediate stage output.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or
/// [`PipelineError::InvalidInput`] if the input cannot be decoded.
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    Ok(Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .grayscale()
        .detect_edges()
        .quantize()
        .shade()
        .composite()
        .into_result())
}
