//! First-order (bilinear) sampling with nearest-edge boundary handling.
//!
//! Coordinates outside the array are clamped onto the border, so a sample
//! taken past an edge returns the edge value instead of a fill constant.

use ndarray::ArrayView2;

/// Lower grid index and fractional weight along one axis of length `len`.
#[inline]
fn axis_weights(coord: f64, len: usize) -> (usize, usize, f64) {
    let last = (len - 1) as f64;
    let clamped = coord.clamp(0.0, last);
    let lower = clamped.floor();
    let i0 = lower as usize;
    let i1 = (i0 + 1).min(len - 1);
    (i0, i1, clamped - lower)
}

/// Bilinear sample of `data` at fractional `(row, col)`.
///
/// `data` must be non-empty and `row`/`col` must not be NaN.
#[inline]
pub fn sample_bilinear(data: &ArrayView2<'_, f64>, row: f64, col: f64) -> f64 {
    let (height, width) = data.dim();
    let (r0, r1, fy) = axis_weights(row, height);
    let (c0, c1, fx) = axis_weights(col, width);

    let top = (1.0 - fx) * data[[r0, c0]] + fx * data[[r0, c1]];
    let bottom = (1.0 - fx) * data[[r1, c0]] + fx * data[[r1, c1]];
    (1.0 - fy) * top + fy * bottom
}

/// Samples `data` at every `(row, col)` shifted by `(dy, dx)`.
pub fn remap_coordinates(
    data: &ArrayView2<'_, f64>,
    coords: &[(usize, usize)],
    dy: f64,
    dx: f64,
) -> Vec<f64> {
    coords
        .iter()
        .map(|&(row, col)| sample_bilinear(data, row as f64 + dy, col as f64 + dx))
        .collect()
}
