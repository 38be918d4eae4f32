//! Single-frame entry point: mask, field, remap, compose.

use image::{DynamicImage, RgbaImage};

use crate::displacement::generate_displacement;
use crate::error::ShakeError;
use crate::mask::extract_mask;
use crate::resample::{compose, remap, RenderMode, SampleFilter};

/// Parameters for one frame. Immutable for the duration of a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Peak displacement in pixels.
    pub strength: f32,
    /// Noise cells across the frame width.
    pub cell_count: u32,
    /// Luma below this is ink.
    pub threshold: u8,
    pub seed: u64,
    /// Bilinear sampling when set, nearest otherwise.
    pub antialias: bool,
    pub mode: RenderMode,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            strength: 2.0,
            cell_count: 8,
            threshold: 80,
            seed: 0,
            antialias: true,
            mode: RenderMode::MaskOnly,
        }
    }
}

impl RenderParams {
    pub fn validate(&self) -> Result<(), ShakeError> {
        if !self.strength.is_finite() || self.strength < 0.0 {
            return Err(ShakeError::invalid_parameter(
                "strength",
                format!("must be a finite value >= 0, got {}", self.strength),
            ));
        }
        if self.cell_count < 1 {
            return Err(ShakeError::invalid_parameter(
                "cell_count",
                format!("must be >= 1, got {}", self.cell_count),
            ));
        }
        Ok(())
    }

    /// Same parameters with the seed advanced by `frame_index`.
    pub fn for_frame(&self, frame_index: u32) -> Self {
        Self {
            seed: self.seed.wrapping_add(u64::from(frame_index)),
            ..*self
        }
    }

    pub fn filter(&self) -> SampleFilter {
        SampleFilter::from_antialias(self.antialias)
    }
}

/// Render one shaken frame of `source`.
///
/// Pure and deterministic: the same source and parameters always give the
/// same bytes. Nothing is returned on failure.
pub fn render_frame(source: &DynamicImage, params: &RenderParams) -> Result<RgbaImage, ShakeError> {
    params.validate()?;
    let mask = extract_mask(source, params.threshold)?;
    let field = generate_displacement(
        mask.width(),
        mask.height(),
        params.cell_count,
        params.seed,
        params.strength,
    )?;
    let values = remap(&mask, &field, params.filter())?;
    Ok(compose(&values, params.mode))
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn dot_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(20, 12, |x, y| {
            if (6..14).contains(&x) && (3..9).contains(&y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        }))
    }

    #[test]
    fn validate_rejects_negative_strength_and_zero_cells() {
        let negative = RenderParams {
            strength: -1.0,
            ..RenderParams::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ShakeError::InvalidParameter {
                name: "strength",
                ..
            })
        ));

        let no_cells = RenderParams {
            cell_count: 0,
            ..RenderParams::default()
        };
        assert!(matches!(
            render_frame(&dot_image(), &no_cells),
            Err(ShakeError::InvalidParameter {
                name: "cell_count",
                ..
            })
        ));

        let infinite = RenderParams {
            strength: f32::INFINITY,
            ..RenderParams::default()
        };
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn for_frame_offsets_the_seed_with_wraparound() {
        let params = RenderParams {
            seed: u64::MAX,
            ..RenderParams::default()
        };
        assert_eq!(params.for_frame(0).seed, u64::MAX);
        assert_eq!(params.for_frame(2).seed, 1);
        assert_eq!(params.for_frame(2).strength, params.strength);
    }

    #[test]
    fn render_is_deterministic() {
        let params = RenderParams {
            strength: 3.0,
            cell_count: 3,
            seed: 17,
            ..RenderParams::default()
        };
        let a = render_frame(&dot_image(), &params).expect("render");
        let b = render_frame(&dot_image(), &params).expect("render");
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn output_matches_source_dimensions() {
        let frame = render_frame(&dot_image(), &RenderParams::default()).expect("render");
        assert_eq!(frame.dimensions(), (20, 12));
    }

    #[test]
    fn transparent_mode_clears_the_background() {
        let params = RenderParams {
            strength: 0.0,
            mode: RenderMode::Transparent,
            ..RenderParams::default()
        };
        let frame = render_frame(&dot_image(), &params).expect("render");
        assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(frame.get_pixel(8, 5).0, [0, 0, 0, 255]);
    }

    #[test]
    fn mask_only_and_threshold_all_render_identically() {
        let base = RenderParams {
            strength: 2.5,
            cell_count: 4,
            seed: 8,
            ..RenderParams::default()
        };
        let mask_only = render_frame(&dot_image(), &base).expect("render");
        let threshold_all = render_frame(
            &dot_image(),
            &RenderParams {
                mode: RenderMode::ThresholdAll,
                ..base
            },
        )
        .expect("render");
        assert_eq!(mask_only, threshold_all);
    }
}
