//! Configuration-holding orchestrator: `configure` and `process`.
//!
//! A [`Stylizer`] owns the process-wide [`PipelineConfig`] for its
//! lifetime. `configure` merges a partial [`ConfigUpdate`] and validates
//! the result before committing it; `process` snapshots the current
//! config once at call start and passes it explicitly into the stage
//! functions, so an in-flight call never observes a partial update.
//! Callers that interleave `configure` with concurrent `process` calls
//! must serialize externally — the orchestrator provides no locking.

use crate::types::{ConfigUpdate, PipelineConfig, PipelineError, RasterBuffer, StagedResult};

/// Stateful pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct Stylizer {
    config: PipelineConfig,
}

impl Stylizer {
    /// Create an orchestrator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Create an orchestrator with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `config` fails
    /// validation.
    pub fn with_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The current configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Merge a partial update into the configuration.
    ///
    /// Absent fields leave the current values untouched. The merged
    /// candidate is validated as a whole before being committed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the merged
    /// configuration is out of range (non-finite or non-positive
    /// `edge_threshold`, negative or non-finite `shadow_strength`,
    /// `min > max` in a tone level). On error the prior configuration
    /// is retained unchanged.
    pub fn configure(&mut self, update: &ConfigUpdate) -> Result<(), PipelineError> {
        let merged = update.apply(&self.config);
        merged.validate()?;
        self.config = merged;
        Ok(())
    }

    /// Decode `image_bytes` and run the full stylization pipeline.
    ///
    /// The configuration is snapshotted once at call start. Once the
    /// input decodes into a valid buffer, every stage is a total
    /// function and the call cannot fail.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] or
    /// [`PipelineError::InvalidInput`] if the input cannot be decoded.
    pub fn process(&self, image_bytes: &[u8]) -> Result<RasterBuffer, PipelineError> {
        crate::process(image_bytes, &self.config)
    }

    /// Like [`process`](Self::process), but preserving every
    /// intermediate stage output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] or
    /// [`PipelineError::InvalidInput`] if the input cannot be decoded.
    pub fn process_staged(&self, image_bytes: &[u8]) -> Result<StagedResult, PipelineError> {
        crate::process_staged(image_bytes, &self.config)
    }
}

impl Default for Stylizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ToneLevel;

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
    fn new_uses_default_config() {
        let stylizer = Stylizer::new();
        assert_eq!(*stylizer.config(), PipelineConfig::default());
    }

    #[test]
    fn with_config_rejects_invalid() {
        let config = PipelineConfig {
            edge_threshold: -1.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            Stylizer::with_config(config),
            Err(PipelineError::InvalidConfig(_)),
        ));
    }

    #[test]
    fn configure_merges_partial_update() {
        let mut stylizer = Stylizer::new();
        stylizer
            .configure(&ConfigUpdate {
                shadow_strength: Some(0.5),
                ..ConfigUpdate::default()
            })
            .unwrap();
        assert!((stylizer.config().shadow_strength - 0.5).abs() < f32::EPSILON);
        // Unspecified fields are untouched.
        assert!(
            (stylizer.config().edge_threshold - PipelineConfig::DEFAULT_EDGE_THRESHOLD).abs()
                < f32::EPSILON,
        );
        assert_eq!(
            stylizer.config().tone_levels,
            PipelineConfig::default_tone_levels(),
        );
    }

    #[test]
    fn configure_rejects_and_retains_prior_config() {
        let mut stylizer = Stylizer::new();
        stylizer
            .configure(&ConfigUpdate {
                edge_threshold: Some(75.0),
                ..ConfigUpdate::default()
            })
            .unwrap();

        let result = stylizer.configure(&ConfigUpdate {
            edge_threshold: Some(40.0),
            tone_levels: Some(vec![ToneLevel::new(200, 100, 0)]),
            ..ConfigUpdate::default()
        });
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));

        // The failed update must not have applied any of its fields.
        assert!((stylizer.config().edge_threshold - 75.0).abs() < f32::EPSILON);
        assert_eq!(
            stylizer.config().tone_levels,
            PipelineConfig::default_tone_levels(),
        );
    }

    #[test]
    fn configure_rejects_non_finite_edge_threshold() {
        let mut stylizer = Stylizer::new();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0, -3.0] {
            let result = stylizer.configure(&ConfigUpdate {
                edge_threshold: Some(bad),
                ..ConfigUpdate::default()
            });
            assert!(result.is_err(), "edge_threshold {bad} should be rejected");
        }
    }

    #[test]
    fn configure_rejects_negative_shadow_strength() {
        let mut stylizer = Stylizer::new();
        let result = stylizer.configure(&ConfigUpdate {
            shadow_strength: Some(-0.5),
            ..ConfigUpdate::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn process_uses_current_config_snapshot() {
        let png = gray_png(3, 3, 100);
        let mut stylizer = Stylizer::new();

        // Default config: 100 quantizes to 85, shades to 66.
        let before = stylizer.process(&png).unwrap();
        assert_eq!(before.pixel(1, 1), [66, 66, 66, 255]);

        // Reconfigure shading off: 85 stays 85.
        stylizer
            .configure(&ConfigUpdate {
                shadow_strength: Some(0.0),
                ..ConfigUpdate::default()
            })
            .unwrap();
        let after = stylizer.process(&png).unwrap();
        assert_eq!(after.pixel(1, 1), [85, 85, 85, 255]);
    }

    #[test]
    fn process_rejects_undecodable_input() {
        let stylizer = Stylizer::new();
        assert!(matches!(
            stylizer.process(&[]),
            Err(PipelineError::EmptyInput),
        ));
        assert!(matches!(
            stylizer.process(&[1, 2, 3]),
            Err(PipelineError::InvalidInput(_)),
        ));
    }

    #[test]
    fn process_staged_exposes_intermediates() {
        let stylizer = Stylizer::new();
        let staged = stylizer.process_staged(&gray_png(3, 3, 100)).unwrap();
        assert_eq!(staged.grayscale.pixel(1, 1)[0], 100);
        assert_eq!(staged.quantized.pixel(1, 1)[0], 85);
        assert_eq!(staged.shaded.pixel(1, 1)[0], 66);
        assert_eq!(staged.composited.pixel(1, 1)[0], 66);
    }
}
