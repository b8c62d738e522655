//! Final merge of the edge mask and the cel-shaded buffer.
//!
//! Wherever the edge mask's R channel is 0 the output is forced to
//! black ink; everywhere else the shaded pixel passes through. Because
//! the edge detector leaves border pixels at `(0,0,0,0)`, the border is
//! inked exactly like a detected edge — a pinned part of the output
//! contract, not an accident to fix here.
//!
//! The operation is per-pixel and order-independent.

use crate::types::RasterBuffer;

/// Composite the edge mask over the shaded buffer.
///
/// Per pixel: if the mask's R channel is 0 the output RGB is `(0,0,0)`
/// with alpha taken from the shaded buffer; otherwise the shaded pixel
/// is copied unchanged.
///
/// # Panics
///
/// Panics if the two buffers differ in dimensions — a buffer-size
/// mismatch between stages is a programming defect, not a recoverable
/// runtime condition.
#[must_use = "returns the freshly allocated composited buffer"]
pub fn composite(edges: &RasterBuffer, shaded: &RasterBuffer) -> RasterBuffer {
    assert_eq!(
        (edges.width(), edges.height()),
        (shaded.width(), shaded.height()),
        "edge mask and shaded buffer dimensions must match",
    );

    let mut out = shaded.clone();
    for (mask, px) in edges
        .pixels()
        .chunks_exact(4)
        .zip(out.pixels_mut().chunks_exact_mut(4))
    {
        if mask[0] == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
        }
    }
    out
}
