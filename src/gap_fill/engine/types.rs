//! Array and offset types for the gap-fill engine

use ndarray::{Array2, ArrayView2};

use crate::gap_fill::common::error::{GapFillError, Result};

/// Detector image, (height, width), after conversion to floating point.
pub type Image = Array2<f64>;

/// Gap mask, (height, width). Any value above zero marks a pixel to fill.
pub type Mask = Array2<u8>;

/// Translation of a secondary exposure relative to the base, in pixels.
///
/// Positive values mean the scattering pattern moved right (`dx`) and down (`dy`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Converts an offset measured in millimetres into pixels.
    pub fn from_millimetres(dx_mm: f64, dy_mm: f64, pixel_size_mm: f64) -> Result<Self> {
        if !(pixel_size_mm.is_finite() && pixel_size_mm > 0.0) {
            return Err(GapFillError::InvalidOffset(format!(
                "pixel size must be positive, got {pixel_size_mm}"
            )));
        }
        Self::new(dx_mm / pixel_size_mm, dy_mm / pixel_size_mm).validated()
    }

    /// Rejects NaN or infinite components.
    pub fn validated(self) -> Result<Self> {
        if self.dx.is_finite() && self.dy.is_finite() {
            Ok(self)
        } else {
            Err(GapFillError::InvalidOffset(format!("({}, {})", self.dx, self.dy)))
        }
    }
}

/// A secondary exposure together with its translation.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedImage<'a> {
    pub image: ArrayView2<'a, f64>,
    pub offset: Offset,
}

impl<'a> ShiftedImage<'a> {
    pub fn new(image: ArrayView2<'a, f64>, offset: Offset) -> Self {
        Self { image, offset }
    }
}

/// Whether pixels left unresolved by the first secondary get a second pass.
#[derive(Debug, Clone, Copy)]
pub enum SecondStage<'a> {
    /// Single pass; residual gap pixels keep the first secondary's sample.
    NoSecondary,
    /// Residual gap pixels are resampled from this exposure.
    WithSecondary(ShiftedImage<'a>),
}

impl<'a> From<Option<ShiftedImage<'a>>> for SecondStage<'a> {
    fn from(value: Option<ShiftedImage<'a>>) -> Self {
        match value {
            Some(shifted) => SecondStage::WithSecondary(shifted),
            None => SecondStage::NoSecondary,
        }
    }
}
