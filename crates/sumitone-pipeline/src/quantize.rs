//! Tone quantization: collapse luminance ranges to discrete levels.
//!
//! The tone table is an **ordered** list of `[min, max] -> value` rules.
//! Lookup is a linear scan in list order and the first matching rule
//! wins; overlapping ranges resolve by position, never by specificity.
//! A gray value no rule covers passes through unchanged — gaps in the
//! table are a valid configuration, not an error. This must never be
//! replaced with a sorted or binary-search lookup, which would assume
//! non-overlapping, gap-free ranges.

use crate::types::{RasterBuffer, ToneLevel};

/// Quantize a grayscale buffer against an ordered tone table.
///
/// Each pixel's gray value (taken from the R channel; the input has
/// R = G = B) is matched against `tone_levels` in list order. The first
/// entry whose `[min, max]` range contains the value replaces R, G, and
/// B with that entry's `value`; unmatched pixels are left unchanged.
/// Alpha always passes through.
#[must_use = "returns a freshly allocated quantized buffer"]
pub fn quantize(input: &RasterBuffer, tone_levels: &[ToneLevel]) -> RasterBuffer {
    let mut out = input.clone();
    for px in out.pixels_mut().chunks_exact_mut(4) {
        let gray = px[0];
        if let Some(level) = tone_levels.iter().find(|level| level.contains(gray)) {
            px[0] = level.value;
            px[1] = level.value;
            px[2] = level.value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PipelineConfig;

    fn uniform_gray(width: u32, height: u32, gray: u8) -> RasterBuffer {
        let mut buf = RasterBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buf.set_pixel(x, y, [gray, gray, gray, 255]);
            }
        }
        buf
    }

    #[test]
    fn default_table_maps_100_to_85() {
        let input = uniform_gray(2, 2, 100);
        let out = quantize(&input, &PipelineConfig::default_tone_levels());
        assert_eq!(out.pixel(0, 0), [85, 85, 85, 255]);
        assert_eq!(out.pixel(1, 1), [85, 85, 85, 255]);
    }

    #[test]
    fn default_table_covers_all_buckets() {
        let levels = PipelineConfig::default_tone_levels();
        let cases = [(0, 0), (63, 0), (64, 85), (127, 85), (128, 170), (191, 170), (192, 255), (255, 255)];
        for (gray, expected) in cases {
            let input = uniform_gray(1, 1, gray);
            let out = quantize(&input, &levels);
            assert_eq!(
                out.pixel(0, 0)[0],
                expected,
                "gray {gray} should quantize to {expected}",
            );
        }
    }

    #[test]
    fn first_match_wins_on_overlap() {
        // Both levels contain 100; list order decides.
        let levels = [ToneLevel::new(0, 200, 10), ToneLevel::new(50, 255, 99)];
        let out = quantize(&uniform_gray(1, 1, 100), &levels);
        assert_eq!(out.pixel(0, 0)[0], 10);

        // Reversed order, reversed winner.
        let reversed = [ToneLevel::new(50, 255, 99), ToneLevel::new(0, 200, 10)];
        let out = quantize(&uniform_gray(1, 1, 100), &reversed);
        assert_eq!(out.pixel(0, 0)[0], 99);
    }

    #[test]
    fn gap_passes_pixel_through_unchanged() {
        let levels = [ToneLevel::new(0, 50, 0), ToneLevel::new(200, 255, 255)];
        let out = quantize(&uniform_gray(1, 1, 100), &levels);
        assert_eq!(out.pixel(0, 0), [100, 100, 100, 255]);
    }

    #[test]
    fn empty_table_is_identity() {
        let input = uniform_gray(3, 3, 77);
        assert_eq!(quantize(&input, &[]), input);
    }

    #[test]
    fn alpha_is_unchanged() {
        let mut input = RasterBuffer::new(1, 2);
        input.set_pixel(0, 0, [100, 100, 100, 30]);
        input.set_pixel(0, 1, [100, 100, 100, 0]);
        let out = quantize(&input, &PipelineConfig::default_tone_levels());
        assert_eq!(out.pixel(0, 0), [85, 85, 85, 30]);
        assert_eq!(out.pixel(0, 1), [85, 85, 85, 0]);
    }

    #[test]
    fn partitioning_table_is_idempotent() {
        // For a table whose ranges partition [0, 255] and whose values
        // land inside their own bucket, quantizing twice equals once.
        let levels = PipelineConfig::default_tone_levels();
        let mut input = RasterBuffer::new(16, 16);
        for y in 0..16u32 {
            for x in 0..16u32 {
                #[allow(clippy::cast_possible_truncation)]
                let gray = (y * 16 + x) as u8;
                input.set_pixel(x, y, [gray, gray, gray, 255]);
            }
        }
        let once = quantize(&input, &levels);
        let twice = quantize(&once, &levels);
        assert_eq!(once, twice);
    }

    #[test]
    fn single_pixel_range_matches_exactly() {
        let levels = [ToneLevel::new(100, 100, 42)];
        assert_eq!(quantize(&uniform_gray(1, 1, 100), &levels).pixel(0, 0)[0], 42);
        assert_eq!(quantize(&uniform_gray(1, 1, 99), &levels).pixel(0, 0)[0], 99);
        assert_eq!(quantize(&uniform_gray(1, 1, 101), &levels).pixel(0, 0)[0], 101);
    }
}
