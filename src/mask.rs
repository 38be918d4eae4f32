//! Binary ink mask extraction from RGB(A) sources.

use image::DynamicImage;

use crate::error::ShakeError;
use crate::grid::{checked_area, ScalarGrid};

pub const LUMA_RED: f32 = 0.299;
pub const LUMA_GREEN: f32 = 0.587;
pub const LUMA_BLUE: f32 = 0.114;

/// Borrowed interleaved 8-bit pixel buffer.
///
/// Supported layouts: 1 channel (luma), 2 (luma + alpha), 3 (RGB), 4 (RGBA).
/// Alpha is ignored for masking.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub data: &'a [u8],
}

#[inline(always)]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_RED * f32::from(r) + LUMA_GREEN * f32::from(g) + LUMA_BLUE * f32::from(b)
}

#[inline(always)]
fn ink(r: u8, g: u8, b: u8, threshold: f32) -> f32 {
    if luma(r, g, b) < threshold {
        1.0
    } else {
        0.0
    }
}

/// Threshold a decoded image into an ink mask: 1.0 where luma < `threshold`.
pub fn extract_mask(image: &DynamicImage, threshold: u8) -> Result<ScalarGrid, ShakeError> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    checked_area(width, height)?;

    let rgb = image.to_rgb8();
    let threshold = f32::from(threshold);
    let mut mask = ScalarGrid::new(width, height)?;
    for (row, pixels) in mask.rows_mut().zip(rgb.rows()) {
        for (cell, pixel) in row.iter_mut().zip(pixels) {
            let [r, g, b] = pixel.0;
            *cell = ink(r, g, b, threshold);
        }
    }
    Ok(mask)
}

/// Threshold a raw interleaved buffer into an ink mask.
pub fn extract_mask_raw(raw: &RawImage<'_>, threshold: u8) -> Result<ScalarGrid, ShakeError> {
    let width = raw.width as usize;
    let height = raw.height as usize;
    let pixel_count = checked_area(width, height)?;

    let channels = usize::from(raw.channels);
    if !(1..=4).contains(&channels) {
        return Err(ShakeError::UnsupportedPixelFormat {
            detail: format!("{channels} interleaved channels; expected 1, 2, 3 or 4"),
        });
    }
    let expected = pixel_count
        .checked_mul(channels)
        .ok_or(ShakeError::InvalidDimensions {
            width: u64::from(raw.width),
            height: u64::from(raw.height),
        })?;
    if raw.data.len() != expected {
        return Err(ShakeError::UnsupportedPixelFormat {
            detail: format!(
                "buffer holds {} bytes but {width}x{height}x{channels} needs {expected}",
                raw.data.len()
            ),
        });
    }

    let threshold = f32::from(threshold);
    let values = raw
        .data
        .chunks_exact(channels)
        .map(|px| match channels {
            1 | 2 => ink(px[0], px[0], px[0], threshold),
            _ => ink(px[0], px[1], px[2], threshold),
        })
        .collect();
    ScalarGrid::from_values(width, height, values)
}
