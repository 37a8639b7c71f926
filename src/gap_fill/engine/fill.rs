use ndarray::{Array2, ArrayView2, Zip};
use tracing::{debug, instrument};

use crate::gap_fill::common::error::{GapFillError, Result};
use crate::gap_fill::engine::interpolation::remap_coordinates;
use crate::gap_fill::engine::types::{Image, SecondStage, ShiftedImage};

fn check_shape(what: &'static str, expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GapFillError::ShapeMismatch { what, expected, found })
    }
}

/// Row-major coordinates of every `true` entry.
fn true_coordinates(predicate: &Array2<bool>) -> Vec<(usize, usize)> {
    predicate
        .indexed_iter()
        .filter_map(|(index, &set)| set.then_some(index))
        .collect()
}

fn scatter(target: &mut Image, coords: &[(usize, usize)], values: Vec<f64>) {
    for (&index, value) in coords.iter().zip(values) {
        target[index] = value;
    }
}

/// Replaces every masked pixel of the flat-field corrected `base` with a
/// bilinear sample from the shifted secondary exposure(s).
///
/// Pass one samples `secondary` at `(row + dy1, col + dx1)` with its own gap
/// pixels zeroed. When `second_stage` carries a second exposure, pixels whose
/// first sample drew any weight from the gap are resampled from it at
/// `(row + dy2, col + dx2)`. That weight is found by remapping the gap mask
/// itself as floating point and thresholding at `> 0`, so a small fractional
/// contribution is enough to trigger the second pass.
///
/// Inputs are not modified. Fails with [`GapFillError::ShapeMismatch`] when
/// an array differs in shape from `base`, and with
/// [`GapFillError::MissingInput`] when `secondary` is `None`.
#[instrument(skip_all, fields(height = base.nrows(), width = base.ncols()))]
pub fn fill_gap(
    flatfield: ArrayView2<'_, f64>,
    mask: ArrayView2<'_, u8>,
    base: ArrayView2<'_, f64>,
    secondary: Option<ShiftedImage<'_>>,
    second_stage: SecondStage<'_>,
) -> Result<Image> {
    let shape = base.dim();
    check_shape("flatfield", shape, flatfield.dim())?;
    check_shape("mask", shape, mask.dim())?;
    let first = secondary
        .ok_or_else(|| GapFillError::MissingInput("first secondary image".to_string()))?;
    check_shape("first secondary image", shape, first.image.dim())?;
    let first_offset = first.offset.validated()?;
    if let SecondStage::WithSecondary(second) = &second_stage {
        check_shape("second secondary image", shape, second.image.dim())?;
        second.offset.validated()?;
    }

    let gap = mask.mapv(|v| v > 0);

    let mut corrected = &base * &flatfield;
    Zip::from(&mut corrected).and(&gap).for_each(|value, &is_gap| {
        if is_gap {
            *value = 0.0;
        }
    });

    let mut first_fill = &first.image * &flatfield;
    Zip::from(&mut first_fill).and(&gap).for_each(|value, &is_gap| {
        if is_gap {
            *value = 0.0;
        }
    });

    let gap_coords = true_coordinates(&gap);
    debug!(gap_pixels = gap_coords.len(), "Filling from first secondary image");
    let first_values = remap_coordinates(&first_fill.view(), &gap_coords, first_offset.dy, first_offset.dx);
    scatter(&mut corrected, &gap_coords, first_values);

    if let SecondStage::WithSecondary(second) = second_stage {
        let gap_weight = gap.mapv(|is_gap| if is_gap { 1.0 } else { 0.0 });
        let mut remapped_weight = gap_weight.clone();
        let weights = remap_coordinates(&gap_weight.view(), &gap_coords, first_offset.dy, first_offset.dx);
        scatter(&mut remapped_weight, &gap_coords, weights);

        let residual = remapped_weight.mapv(|w| w > 0.0);
        let residual_coords = true_coordinates(&residual);
        debug!(residual_pixels = residual_coords.len(), "Filling from second secondary image");

        let second_fill = &second.image * &flatfield;
        let second_values = remap_coordinates(
            &second_fill.view(),
            &residual_coords,
            second.offset.dy,
            second.offset.dx,
        );
        scatter(&mut corrected, &residual_coords, second_values);
    }

    Ok(corrected)
}
