//! Inverse-remap resampling of the ink mask through a displacement field.
//!
//! Each output pixel asks where its content came from,
//! `(x - dx, y - dy)`, and reads the mask there. Every output pixel therefore
//! receives exactly one value; there are no holes or overlaps.

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use crate::displacement::DisplacementField;
use crate::error::ShakeError;
use crate::grid::ScalarGrid;

/// Resampled mask values above this count as ink.
pub const INK_CUTOFF: f32 = 0.5;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFilter {
    Nearest,
    Bilinear,
}

impl SampleFilter {
    pub fn from_antialias(antialias: bool) -> Self {
        if antialias {
            Self::Bilinear
        } else {
            Self::Nearest
        }
    }
}

/// How resampled mask values become output pixels.
///
/// `MaskOnly` and `ThresholdAll` render identically: remapping the mask already
/// decides ink versus paper, so both names share one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    MaskOnly,
    ThresholdAll,
    /// Ink on a fully transparent background.
    Transparent,
}

impl RenderMode {
    /// Transparent wins over mask-only; neither flag selects threshold-all.
    pub fn from_flags(mask_only: bool, transparent: bool) -> Self {
        match (mask_only, transparent) {
            (_, true) => Self::Transparent,
            (true, false) => Self::MaskOnly,
            (false, false) => Self::ThresholdAll,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::MaskOnly => "mask_only",
            Self::ThresholdAll => "threshold_all",
            Self::Transparent => "transparent",
        }
    }

    #[inline(always)]
    fn pixel(self, value: f32) -> Rgba<u8> {
        let ink = value > INK_CUTOFF;
        match (self, ink) {
            (_, true) => INK,
            (Self::Transparent, false) => CLEAR,
            (Self::MaskOnly | Self::ThresholdAll, false) => PAPER,
        }
    }
}

/// Mask value at the nearest pixel to `(sx, sy)`; off-image reads are background.
#[inline]
pub fn sample_nearest(mask: &ScalarGrid, sx: f32, sy: f32) -> f32 {
    let rx = sx.round();
    let ry = sy.round();
    if !(rx >= 0.0 && ry >= 0.0) {
        return 0.0;
    }
    mask.get(rx as usize, ry as usize).unwrap_or(0.0)
}

/// Bilinear mask value at `(sx, sy)`.
///
/// Neighbors outside the image contribute 0, so ink fades toward the border
/// instead of clamping or wrapping.
#[inline]
pub fn sample_bilinear(mask: &ScalarGrid, sx: f32, sy: f32) -> f32 {
    if !(sx.is_finite() && sy.is_finite()) {
        return 0.0;
    }
    let fx0 = sx.floor();
    let fy0 = sy.floor();
    // All four neighbors off-image; also keeps the casts below far from i64 limits.
    if fx0 < -1.0 || fy0 < -1.0 || fx0 >= mask.width() as f32 || fy0 >= mask.height() as f32 {
        return 0.0;
    }
    let tx = sx - fx0;
    let ty = sy - fy0;
    let x0 = fx0 as i64;
    let y0 = fy0 as i64;

    let read = |x: i64, y: i64| mask.get_signed(x, y).unwrap_or(0.0);
    read(x0, y0) * (1.0 - tx) * (1.0 - ty)
        + read(x0 + 1, y0) * tx * (1.0 - ty)
        + read(x0, y0 + 1) * (1.0 - tx) * ty
        + read(x0 + 1, y0 + 1) * tx * ty
}

/// Pull the mask through the field: `out[x, y] = mask[x - dx, y - dy]`.
pub fn remap(
    mask: &ScalarGrid,
    field: &DisplacementField,
    filter: SampleFilter,
) -> Result<ScalarGrid, ShakeError> {
    if field.width() != mask.width() || field.height() != mask.height() {
        return Err(ShakeError::invalid_parameter(
            "displacement",
            format!(
                "field is {}x{} but mask is {}x{}",
                field.width(),
                field.height(),
                mask.width(),
                mask.height()
            ),
        ));
    }

    let sample = match filter {
        SampleFilter::Nearest => sample_nearest,
        SampleFilter::Bilinear => sample_bilinear,
    };

    let mut out = ScalarGrid::new(mask.width(), mask.height())?;
    let rows = out.rows_mut().zip(field.dx().rows().zip(field.dy().rows()));
    for (y, (row, (row_dx, row_dy))) in rows.enumerate() {
        let fy = y as f32;
        for (x, ((cell, &dx), &dy)) in row.iter_mut().zip(row_dx).zip(row_dy).enumerate() {
            *cell = sample(mask, x as f32 - dx, fy - dy);
        }
    }
    Ok(out)
}

/// Turn resampled mask values into RGBA pixels.
pub fn compose(values: &ScalarGrid, mode: RenderMode) -> RgbaImage {
    let width = values.width() as u32;
    let mut out = RgbaImage::new(width, values.height() as u32);
    for (pixel, &value) in out.pixels_mut().zip(values.as_slice()) {
        *pixel = mode.pixel(value);
    }
    out
}
