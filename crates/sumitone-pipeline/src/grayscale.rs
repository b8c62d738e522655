//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the RGBA
//! [`RasterBuffer`] the rest of the pipeline operates on, plus the
//! luminance transform that is the first processing stage proper.

use crate::types::{PipelineError, RasterBuffer};

/// Decode raw image bytes into a [`RasterBuffer`].
///
/// Supports whatever formats the `image` crate can decode (PNG, JPEG,
/// BMP, WebP). This is the only fallible step in the pipeline; every
/// stage after it is a total function over the decoded buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::InvalidInput`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded raster buffer"]
pub fn decode(bytes: &[u8]) -> Result<RasterBuffer, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(RasterBuffer::from_rgba_image(img.to_rgba8()))
}

/// Convert an RGBA buffer to grayscale.
///
/// Every output pixel has R = G = B = `round(0.299*R + 0.587*G +
/// 0.114*B)` clamped to `[0, 255]`; alpha is passed through unchanged.
/// Pure and total.
#[must_use = "returns a freshly allocated grayscale buffer"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_grayscale(input: &RasterBuffer) -> RasterBuffer {
    let mut out = RasterBuffer::new(input.width(), input.height());
    for (src, dst) in input
        .pixels()
        .chunks_exact(4)
        .zip(out.pixels_mut().chunks_exact_mut(4))
    {
        let lum = 0.299 * f32::from(src[0]) + 0.587 * f32::from(src[1]) + 0.114 * f32::from(src[2]);
        let gray = lum.round().clamp(0.0, 255.0) as u8;
        dst[0] = gray;
        dst[1] = gray;
        dst[2] = gray;
        dst[3] = src[3];
    }
    out
}
