//! Flat row-major scalar grids used for masks and displacement fields.

use crate::error::ShakeError;

/// A `width x height` grid of `f32` cells stored contiguously, row by row.
///
/// All access goes through bounds-checked accessors; rows are exposed as
/// slices so hot loops can iterate without per-cell index math.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl ScalarGrid {
    /// Zero-filled grid. Fails for empty or overflowing dimensions.
    pub fn new(width: usize, height: usize) -> Result<Self, ShakeError> {
        let len = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            values: vec![0.0; len],
        })
    }

    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Result<Self, ShakeError> {
        let len = checked_area(width, height)?;
        if values.len() != len {
            return Err(ShakeError::invalid_parameter(
                "values",
                format!(
                    "expected {len} cells for a {width}x{height} grid, got {}",
                    values.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|idx| self.values[idx])
    }

    /// Lookup with signed coordinates; anything off the grid is `None`.
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> Option<f32> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    /// Returns `false` (and writes nothing) when `(x, y)` is off the grid.
    pub fn set(&mut self, x: usize, y: usize, value: f32) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.width)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.values.chunks_exact_mut(self.width)
    }
}

pub(crate) fn checked_area(width: usize, height: usize) -> Result<usize, ShakeError> {
    let invalid = || ShakeError::InvalidDimensions {
        width: width as u64,
        height: height as u64,
    };
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    width.checked_mul(height).ok_or_else(invalid)
}
