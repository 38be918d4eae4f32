//! Value-noise displacement fields.
//!
//! A coarse lattice of random values in `[-1, 1]` is spread over the frame and
//! interpolated per pixel with smoothstep-eased bilinear weights. Lattice
//! points are shared between neighboring cells, so the field is continuous
//! across cell boundaries, and the eased weights keep its first derivative
//! continuous there too.
//!
//! Two independent lattices drive the horizontal and vertical offsets. They
//! come from two PRNG streams: the frame seed itself and [`split_seed`] of it.

use crate::error::ShakeError;
use crate::grid::{checked_area, ScalarGrid};
use crate::rng::{split_seed, XorShift64};

/// Cubic ease `3t^2 - 2t^3`, clamped to `[0, 1]`.
#[inline(always)]
pub fn smoothstep(t: f32) -> f32 {
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

/// Linear blend written so `t = 0` and `t = 1` return the endpoints exactly.
#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Number of noise cells along each axis for a `width x height` frame.
///
/// `cells_x = max(1, cell_count)`; `cells_y` follows the frame aspect ratio so
/// cells stay roughly square in image space. Neither axis gets more cells than
/// it has pixels, which bounds the lattice by the frame area.
pub fn cell_dimensions(width: usize, height: usize, cell_count: u32) -> (usize, usize) {
    let cells_x = (cell_count.max(1) as usize).min(width.max(1));
    let ratio = height as f64 / width.max(1) as f64;
    let cells_y = ((cells_x as f64 * ratio).round().max(1.0) as usize).min(height.max(1));
    (cells_x, cells_y)
}

/// Random values at the corners of the noise cells.
///
/// A lattice with `cells_x x cells_y` cells stores
/// `(cells_x + 1) x (cells_y + 1)` points, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    cells_x: usize,
    cells_y: usize,
    points: Vec<f32>,
}

impl Lattice {
    pub fn random(cells_x: usize, cells_y: usize, rng: &mut XorShift64) -> Self {
        let cells_x = cells_x.max(1);
        let cells_y = cells_y.max(1);
        let points = (0..(cells_x + 1) * (cells_y + 1))
            .map(|_| rng.next_signed())
            .collect();
        Self {
            cells_x,
            cells_y,
            points,
        }
    }

    pub fn cells(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    /// Lattice points per axis: one more than the cell count.
    pub fn points(&self) -> (usize, usize) {
        (self.cells_x + 1, self.cells_y + 1)
    }

    /// Value at lattice point `(i, j)`, clamped onto the lattice edge.
    #[inline]
    pub fn point(&self, i: usize, j: usize) -> f32 {
        let i = i.min(self.cells_x);
        let j = j.min(self.cells_y);
        self.points[j * (self.cells_x + 1) + i]
    }

    /// Interpolate inside cell `(cx, cy)` at local offsets `tx, ty` in `[0, 1]`.
    #[inline]
    pub fn sample_cell(&self, cx: usize, cy: usize, tx: f32, ty: f32) -> f32 {
        let x0 = cx.min(self.cells_x);
        let y0 = cy.min(self.cells_y);
        let x1 = (x0 + 1).min(self.cells_x);
        let y1 = (y0 + 1).min(self.cells_y);

        let sx = smoothstep(tx);
        let sy = smoothstep(ty);
        let top = lerp(self.point(x0, y0), self.point(x1, y0), sx);
        let bottom = lerp(self.point(x0, y1), self.point(x1, y1), sx);
        lerp(top, bottom, sy)
    }

    /// Interpolate at continuous lattice coordinates `(fx, fy)`.
    #[inline]
    pub fn sample(&self, fx: f32, fy: f32) -> f32 {
        let (cx, tx) = split_coord(fx);
        let (cy, ty) = split_coord(fy);
        self.sample_cell(cx, cy, tx, ty)
    }
}

#[inline(always)]
fn split_coord(f: f32) -> (usize, f32) {
    let base = f.floor();
    let index = if base <= 0.0 { 0 } else { base as usize };
    (index, f - base)
}

/// Per-pixel displacement in pixels, one grid per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    dx: ScalarGrid,
    dy: ScalarGrid,
    strength: f32,
    cells: (usize, usize),
}

impl DisplacementField {
    pub fn dx(&self) -> &ScalarGrid {
        &self.dx
    }

    pub fn dy(&self) -> &ScalarGrid {
        &self.dy
    }

    pub fn width(&self) -> usize {
        self.dx.width()
    }

    pub fn height(&self) -> usize {
        self.dx.height()
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn cells(&self) -> (usize, usize) {
        self.cells
    }

    /// Lattice points per axis backing each of the two grids.
    pub fn lattice_points(&self) -> (usize, usize) {
        (self.cells.0 + 1, self.cells.1 + 1)
    }

    /// Offset `(dx, dy)` at pixel `(x, y)`.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        Some((self.dx.get(x, y)?, self.dy.get(x, y)?))
    }
}

/// Seeded lattice pair for one frame: `(horizontal, vertical)`.
pub fn lattices_for_seed(cells_x: usize, cells_y: usize, seed: u64) -> (Lattice, Lattice) {
    let mut horizontal = XorShift64::from_seed(seed);
    let mut vertical = XorShift64::from_seed(split_seed(seed));
    (
        Lattice::random(cells_x, cells_y, &mut horizontal),
        Lattice::random(cells_x, cells_y, &mut vertical),
    )
}

/// Build the displacement field for a `width x height` frame.
///
/// `cell_count` below 1 is treated as 1. Every value lies in
/// `[-strength, strength]`.
pub fn generate_displacement(
    width: usize,
    height: usize,
    cell_count: u32,
    seed: u64,
    strength: f32,
) -> Result<DisplacementField, ShakeError> {
    checked_area(width, height)?;
    if !strength.is_finite() || strength < 0.0 {
        return Err(ShakeError::invalid_parameter(
            "strength",
            format!("must be a finite value >= 0, got {strength}"),
        ));
    }

    let (cells_x, cells_y) = cell_dimensions(width, height, cell_count);
    let (lattice_x, lattice_y) = lattices_for_seed(cells_x, cells_y, seed);

    let cell_width = width as f32 / cells_x as f32;
    let cell_height = height as f32 / cells_y as f32;

    let mut dx = ScalarGrid::new(width, height)?;
    let mut dy = ScalarGrid::new(width, height)?;
    for (y, (row_x, row_y)) in dx.rows_mut().zip(dy.rows_mut()).enumerate() {
        let (cy, ty) = split_coord(y as f32 / cell_height);
        for (x, (out_x, out_y)) in row_x.iter_mut().zip(row_y.iter_mut()).enumerate() {
            let (cx, tx) = split_coord(x as f32 / cell_width);
            *out_x = scale(lattice_x.sample_cell(cx, cy, tx, ty), strength);
            *out_y = scale(lattice_y.sample_cell(cx, cy, tx, ty), strength);
        }
    }

    Ok(DisplacementField {
        dx,
        dy,
        strength,
        cells: (cells_x, cells_y),
    })
}

#[inline(always)]
fn scale(noise: f32, strength: f32) -> f32 {
    (noise * strength).clamp(-strength, strength)
}
