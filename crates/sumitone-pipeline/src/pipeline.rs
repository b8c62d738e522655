//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`], which runs every stage in one call and
//! discards the intermediates, [`Pipeline`] lets the caller drive
//! execution one step at a time:
//!
//! ```rust
//! # use sumitone_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let config = PipelineConfig::default();
//! let staged = Pipeline::new(png, config)
//!     .decode()?
//!     .grayscale()
//!     .detect_edges()
//!     .quantize()
//!     .shade()
//!     .composite()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline
//! state, carrying all previously computed intermediates, so skipping a
//! stage or running them out of data-dependency order is a compile-time
//! error. Only [`Pending::decode`] is fallible; every later stage is a
//! total function over the decoded buffer.
//!
//! The stage order fixes a linearization of the pipeline's data-flow
//! graph: edge detection runs off the **pre-quantization** grayscale
//! buffer, which stays available (alongside the edge mask) while the
//! quantize and shade stages run on their own branch.

use crate::types::{PipelineConfig, PipelineError, RasterBuffer, StagedResult};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing — call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image and advance to the [`Decoded`] stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if the source bytes are
    /// empty and [`PipelineError::InvalidInput`] if they cannot be
    /// decoded.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let original = crate::grayscale::decode(&self.source)?;
        Ok(Decoded {
            config: self.config,
            original,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding the source image.
#[must_use = "pipeline stages are consumed by advancing — call .grayscale() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    original: RasterBuffer,
}

impl Decoded {
    /// The original decoded RGBA buffer.
    #[must_use]
    pub const fn original(&self) -> &RasterBuffer {
        &self.original
    }

    /// Advance to the grayscale stage.
    pub fn grayscale(self) -> Grayscaled {
        let gray = crate::grayscale::to_grayscale(&self.original);
        Grayscaled {
            config: self.config,
            original: self.original,
            gray,
        }
    }
}

// ───────────────────────── Stage 2: Grayscaled ───────────────────────

/// Pipeline state after luminance conversion.
#[must_use = "pipeline stages are consumed by advancing — call .detect_edges() to continue"]
pub struct Grayscaled {
    config: PipelineConfig,
    original: RasterBuffer,
    gray: RasterBuffer,
}

impl Grayscaled {
    /// The grayscale buffer (R = G = B).
    #[must_use]
    pub const fn grayscale(&self) -> &RasterBuffer {
        &self.gray
    }

    /// Advance to the edge detection stage.
    ///
    /// The Sobel mask is computed over the pre-quantization grayscale
    /// buffer; the buffer itself stays available for the quantize
    /// branch.
    pub fn detect_edges(self) -> EdgesDetected {
        let edges = crate::edge::detect_edges(&self.gray, self.config.edge_threshold);
        EdgesDetected {
            config: self.config,
            original: self.original,
            gray: self.gray,
            edges,
        }
    }
}

// ───────────────────────── Stage 3: EdgesDetected ────────────────────

/// Pipeline state after Sobel edge detection.
#[must_use = "pipeline stages are consumed by advancing — call .quantize() to continue"]
pub struct EdgesDetected {
    config: PipelineConfig,
    original: RasterBuffer,
    gray: RasterBuffer,
    edges: RasterBuffer,
}

impl EdgesDetected {
    /// The binary edge mask (transparent black border, see
    /// [`crate::edge`]).
    #[must_use]
    pub const fn edges(&self) -> &RasterBuffer {
        &self.edges
    }

    /// Advance to the tone quantization stage.
    pub fn quantize(self) -> Quantized {
        let quantized = crate::quantize::quantize(&self.gray, &self.config.tone_levels);
        Quantized {
            config: self.config,
            original: self.original,
            gray: self.gray,
            edges: self.edges,
            quantized,
        }
    }
}

// ───────────────────────── Stage 4: Quantized ────────────────────────

/// Pipeline state after tone quantization.
#[must_use = "pipeline stages are consumed by advancing — call .shade() to continue"]
pub struct Quantized {
    config: PipelineConfig,
    original: RasterBuffer,
    gray: RasterBuffer,
    edges: RasterBuffer,
    quantized: RasterBuffer,
}

impl Quantized {
    /// The tone-quantized buffer.
    #[must_use]
    pub const fn quantized(&self) -> &RasterBuffer {
        &self.quantized
    }

    /// Advance to the cel shading stage.
    pub fn shade(self) -> Shaded {
        let shaded = crate::shade::shade(&self.quantized, self.config.shadow_strength);
        Shaded {
            original: self.original,
            gray: self.gray,
            edges: self.edges,
            quantized: self.quantized,
            shaded,
        }
    }
}

// ───────────────────────── Stage 5: Shaded ───────────────────────────

/// Pipeline state after cel shading.
#[must_use = "pipeline stages are consumed by advancing — call .composite() to continue"]
pub struct Shaded {
    original: RasterBuffer,
    gray: RasterBuffer,
    edges: RasterBuffer,
    quantized: RasterBuffer,
    shaded: RasterBuffer,
}

impl Shaded {
    /// The cel-shaded buffer.
    #[must_use]
    pub const fn shaded(&self) -> &RasterBuffer {
        &self.shaded
    }

    /// Advance to the compositing stage — the final pipeline step.
    pub fn composite(self) -> Composited {
        let composited = crate::composite::composite(&self.edges, &self.shaded);
        Composited {
            original: self.original,
            gray: self.gray,
            edges: self.edges,
            quantized: self.quantized,
            shaded: self.shaded,
            composited,
        }
    }
}

// ───────────────────────── Stage 6: Composited ───────────────────────

/// Pipeline state after compositing — the final stage.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Composited {
    original: RasterBuffer,
    gray: RasterBuffer,
    edges: RasterBuffer,
    quantized: RasterBuffer,
    shaded: RasterBuffer,
    composited: RasterBuffer,
}

impl Composited {
    /// The final composited buffer.
    #[must_use]
    pub const fn composited(&self) -> &RasterBuffer {
        &self.composited
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            original: self.original,
            grayscale: self.gray,
            edges: self.edges,
            quantized: self.quantized,
            shaded: self.shaded,
            composited: self.composited,
        }
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental stylization pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing; the caller then chains stage
/// methods to advance. See the [module documentation](self) for the
/// full chain.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from source image bytes and config.
    ///
    /// No processing is performed — the bytes and config are simply
    /// stored. Call [`.decode()`](Pending::decode) to begin.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image_bytes: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending {
            config,
            source: image_bytes,
        }
    }
}
