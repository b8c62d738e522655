//! Cel shading: local contrast enhancement over the quantized buffer.
//!
//! Shadows are pushed darker and highlights lighter, exaggerating the
//! tone separation the quantizer produced:
//!
//! - `g < 128`: `clamp(g - (128 - g) * shadow_strength * 0.3, 0, 255)`
//! - `g > 192`: `clamp(g + 10, 0, 255)` — independent of `shadow_strength`
//! - `128 <= g <= 192`: unchanged
//!
//! The darkening amount is computed in `f32` and rounded with
//! [`f32::round`] (half away from zero); with the default strength 1.5 a
//! gray of 85 becomes `85 - 19.35 -> 66`. The two branches are mutually
//! exclusive and never interact: `shadow_strength` has no effect on the
//! highlight lift.

use crate::types::RasterBuffer;

/// Apply cel shading to a quantized grayscale buffer.
///
/// The gray value is taken from the R channel (the input has R = G = B)
/// and the enhanced value is written uniformly to R, G, and B; alpha
/// passes through unchanged.
#[must_use = "returns a freshly allocated shaded buffer"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn shade(input: &RasterBuffer, shadow_strength: f32) -> RasterBuffer {
    let mut out = input.clone();
    for px in out.pixels_mut().chunks_exact_mut(4) {
        let gray = px[0];
        let enhanced = if gray < 128 {
            let value = f32::from(gray) - (128.0 - f32::from(gray)) * shadow_strength * 0.3;
            value.round().clamp(0.0, 255.0) as u8
        } else if gray > 192 {
            gray.saturating_add(10)
        } else {
            gray
        };
        px[0] = enhanced;
        px[1] = enhanced;
        px[2] = enhanced;
    }
    out
}
