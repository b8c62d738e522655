//! Shared types for the sumitone stylization pipeline.

use serde::{Deserialize, Serialize};

/// Fixed-size RGBA8 pixel container — the common currency between stages.
///
/// Pixels are stored as a flat, interleaved byte vector with the invariant
/// `pixels.len() == width * height * 4`. The fields are private so the
/// invariant cannot be broken after construction; every pipeline stage takes
/// a `&RasterBuffer` and allocates a fresh, exclusively-owned output buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Create a zero-filled buffer (every pixel fully transparent black).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 4;
        Self {
            width,
            height,
            pixels: vec![0; len],
        }
    }

    /// Construct a buffer from raw RGBA bytes.
    ///
    /// Returns `None` if `pixels.len()` is not exactly
    /// `width * height * 4`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() == width as usize * height as usize * 4 {
            Some(Self {
                width,
                height,
                pixels,
            })
        } else {
            None
        }
    }

    /// Buffer width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The raw interleaved RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the raw interleaved RGBA bytes.
    ///
    /// The slice length is fixed, so the size invariant cannot be broken
    /// through it.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume the buffer and return the underlying byte vector.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The RGBA channels of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.pixel_index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Overwrite the RGBA channels of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.pixel_index(x, y);
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    fn pixel_index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} buffer",
            self.width,
            self.height,
        );
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Convert to an [`image::RgbaImage`] for encoding.
    #[must_use]
    #[allow(clippy::unreachable)]
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .unwrap_or_else(|| unreachable!("RasterBuffer length invariant guarantees a valid raw buffer"))
    }

    /// Build a buffer from a decoded [`image::RgbaImage`].
    #[must_use]
    #[allow(clippy::unreachable)]
    pub fn from_rgba_image(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, image.into_raw())
            .unwrap_or_else(|| unreachable!("RgbaImage raw buffer is always width * height * 4 bytes"))
    }
}

/// Serde-compatible proxy for [`RasterBuffer`].
///
/// Serialized as a `(width, height, raw_pixel_bytes)` tuple; the size
/// invariant is re-checked on deserialization.
#[derive(Serialize, Deserialize)]
struct RasterBufferProxy(u32, u32, Vec<u8>);

impl Serialize for RasterBuffer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RasterBufferProxy(self.width, self.height, self.pixels.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RasterBuffer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RasterBufferProxy(width, height, pixels) =
            RasterBufferProxy::deserialize(deserializer)?;
        Self::from_raw(width, height, pixels).ok_or_else(|| {
            serde::de::Error::custom("pixel buffer length must equal width * height * 4")
        })
    }
}

/// A tone quantization bucket: luminance range `[min, max]` (inclusive)
/// collapsed to a single output `value`.
///
/// Buckets live in an **ordered** list; lookup is first-match in list
/// order. Gaps and overlaps between buckets are both valid configurations
/// (see [`crate::quantize`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneLevel {
    /// Lower bound of the matched luminance range (inclusive).
    pub min: u8,
    /// Upper bound of the matched luminance range (inclusive).
    pub max: u8,
    /// Output luminance every matched pixel collapses to.
    pub value: u8,
}

impl ToneLevel {
    /// Create a new tone level.
    #[must_use]
    pub const fn new(min: u8, max: u8, value: u8) -> Self {
        Self { min, max, value }
    }

    /// Whether `gray` falls inside this level's `[min, max]` range.
    #[must_use]
    pub const fn contains(self, gray: u8) -> bool {
        self.min <= gray && gray <= self.max
    }
}

/// Configuration for the stylization pipeline.
///
/// Owned by a [`Stylizer`](crate::Stylizer) instance and snapshotted at the
/// start of every `process` call; the stage functions receive it (or its
/// fields) explicitly and never read shared mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sobel gradient magnitude above which a pixel is classified as an
    /// edge. Comparison is strict `>`; the threshold value itself is
    /// non-edge. Must be finite and positive when set through
    /// [`Stylizer::configure`](crate::Stylizer::configure).
    pub edge_threshold: f32,

    /// How aggressively shadows (gray < 128) are darkened by the cel
    /// shader. Zero disables darkening; the highlight branch is
    /// unaffected. Must be finite and non-negative.
    pub shadow_strength: f32,

    /// Ordered tone quantization table. List order is significant:
    /// overlaps resolve to the first matching entry, and gaps leave
    /// pixels unquantized.
    pub tone_levels: Vec<ToneLevel>,
}

impl PipelineConfig {
    /// Default Sobel edge threshold.
    pub const DEFAULT_EDGE_THRESHOLD: f32 = 50.0;

    /// Default shadow darkening strength.
    pub const DEFAULT_SHADOW_STRENGTH: f32 = 1.5;

    /// The default tone table: `[0, 255]` split into four buckets mapped
    /// to `{0, 85, 170, 255}`.
    #[must_use]
    pub fn default_tone_levels() -> Vec<ToneLevel> {
        vec![
            ToneLevel::new(0, 63, 0),
            ToneLevel::new(64, 127, 85),
            ToneLevel::new(128, 191, 170),
            ToneLevel::new(192, 255, 255),
        ]
    }

    /// Check every configuration invariant.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `edge_threshold` is
    /// non-finite or not positive, `shadow_strength` is non-finite or
    /// negative, or any tone level has `min > max`.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.edge_threshold.is_finite() || self.edge_threshold <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "edge_threshold must be finite and positive, got {}",
                self.edge_threshold,
            )));
        }
        if !self.shadow_strength.is_finite() || self.shadow_strength < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "shadow_strength must be finite and non-negative, got {}",
                self.shadow_strength,
            )));
        }
        for (i, level) in self.tone_levels.iter().enumerate() {
            if level.min > level.max {
                return Err(PipelineError::InvalidConfig(format!(
                    "tone level {i} has min {} > max {}",
                    level.min, level.max,
                )));
            }
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            edge_threshold: Self::DEFAULT_EDGE_THRESHOLD,
            shadow_strength: Self::DEFAULT_SHADOW_STRENGTH,
            tone_levels: Self::default_tone_levels(),
        }
    }
}

/// Partial configuration update consumed by
/// [`Stylizer::configure`](crate::Stylizer::configure).
///
/// `None` fields leave the corresponding [`PipelineConfig`] field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// Replacement for [`PipelineConfig::edge_threshold`], if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_threshold: Option<f32>,

    /// Replacement for [`PipelineConfig::shadow_strength`], if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_strength: Option<f32>,

    /// Replacement for [`PipelineConfig::tone_levels`], if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_levels: Option<Vec<ToneLevel>>,
}

impl ConfigUpdate {
    /// Merge this update into `base`, producing the candidate config.
    ///
    /// The result is **not** validated; see
    /// [`PipelineConfig::validate`].
    #[must_use]
    pub fn apply(&self, base: &PipelineConfig) -> PipelineConfig {
        PipelineConfig {
            edge_threshold: self.edge_threshold.unwrap_or(base.edge_threshold),
            shadow_strength: self.shadow_strength.unwrap_or(base.shadow_strength),
            tone_levels: self
                .tone_levels
                .clone()
                .unwrap_or_else(|| base.tone_levels.clone()),
        }
    }
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved.
///
/// Each field captures the output of one pipeline stage, enabling
/// stage-by-stage previews and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Stage 0: original decoded RGBA image.
    pub original: RasterBuffer,
    /// Stage 1: grayscale conversion (R = G = B).
    pub grayscale: RasterBuffer,
    /// Stage 2a: Sobel edge mask over the pre-quantization grayscale.
    pub edges: RasterBuffer,
    /// Stage 2b: tone-quantized grayscale.
    pub quantized: RasterBuffer,
    /// Stage 3: cel-shaded quantized buffer.
    pub shaded: RasterBuffer,
    /// Stage 4: final composite of edge mask and shaded buffer.
    pub composited: RasterBuffer,
}

/// Errors that can occur during pipeline processing.
///
/// Buffer-size mismatches between stages are deliberately **not** an
/// error variant: they indicate a programming defect and are enforced
/// with assertions instead (see [`crate::composite`]).
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input bytes could not be decoded into a raster image.
    #[error("failed to decode input image: {0}")]
    InvalidInput(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A `configure` call supplied an out-of-range or malformed
    /// parameter. The prior configuration is retained.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
