//! Sobel edge detection over the pre-quantization grayscale buffer.
//!
//! Convolves each interior pixel's 3x3 neighborhood with the horizontal
//! and vertical Sobel kernels and thresholds the gradient magnitude into
//! a binary mask: solid black `(0,0,0,255)` for edges, solid white
//! `(255,255,255,255)` for non-edges.
//!
//! Border pixels (`x = 0`, `x = width-1`, `y = 0`, `y = height-1`) are
//! **not computed**: the output buffer starts zero-initialized and the
//! border is left at `(0,0,0,0)` — fully transparent black. During
//! compositing a border pixel is therefore indistinguishable from an
//! edge pixel (R is 0 in both). This boundary behavior is a pinned part
//! of the output contract; see the tests at the bottom of this module.

use crate::types::RasterBuffer;

/// Horizontal Sobel kernel.
pub const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical Sobel kernel.
pub const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Detect edges in a grayscale buffer.
///
/// For every interior pixel the 3x3 neighborhood's luminance (the R
/// channel; the input has R = G = B) is convolved with [`SOBEL_X`] and
/// [`SOBEL_Y`]; the pixel is an edge when `sqrt(gx^2 + gy^2)` is
/// **strictly greater** than `edge_threshold`, so a magnitude exactly
/// equal to the threshold classifies as non-edge. Images narrower or
/// shorter than 3 pixels have no interior and come back entirely
/// transparent black.
#[must_use = "returns the binary edge mask"]
pub fn detect_edges(gray: &RasterBuffer, edge_threshold: f32) -> RasterBuffer {
    let (width, height) = (gray.width(), gray.height());
    let mut out = RasterBuffer::new(width, height);

    let threshold = f64::from(edge_threshold);
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, row) in SOBEL_X.iter().enumerate() {
                for (kx, &wx) in row.iter().enumerate() {
                    #[allow(clippy::cast_possible_truncation)]
                    let (nx, ny) = (x + kx as u32 - 1, y + ky as u32 - 1);
                    let lum = i32::from(gray.pixel(nx, ny)[0]);
                    gx += lum * wx;
                    gy += lum * SOBEL_Y[ky][kx];
                }
            }
            let magnitude = f64::from(gx * gx + gy * gy).sqrt();
            let shade = if magnitude > threshold { 0 } else { 255 };
            out.set_pixel(x, y, [shade, shade, shade, 255]);
        }
    }
    out
}
