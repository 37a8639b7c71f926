use ndarray::{s, Array2};
use tracing::debug;

use crate::gap_fill::common::error::Result;
use crate::gap_fill::detector::geometry::{DetectorGeometry, DetectorRegistry};
use crate::gap_fill::engine::Mask;

/// Rasterizes the gap bands of a geometry into a 0/1 mask.
pub fn rasterize_gaps(geometry: &DetectorGeometry) -> Mask {
    let mut mask = Array2::<u8>::zeros(geometry.shape());
    for (start, end) in geometry.row_ranges() {
        mask.slice_mut(s![start..=end, ..]).fill(1);
    }
    for (start, end) in geometry.col_ranges() {
        mask.slice_mut(s![.., start..=end]).fill(1);
    }
    mask
}

impl DetectorRegistry {
    pub fn generate_mask(&self, model: &str) -> Result<Mask> {
        let geometry = self.geometry(model)?;
        let mask = rasterize_gaps(geometry);
        debug!(
            model,
            height = geometry.height,
            width = geometry.width,
            "Generated detector gap mask"
        );
        Ok(mask)
    }
}

/// Stock gap mask of a built-in detector model.
pub fn generate_detector_mask(model: &str) -> Result<Mask> {
    DetectorRegistry::builtin().generate_mask(model)
}

/// Pixel pitch in millimetres of a built-in detector model.
pub fn detector_pixel_size(model: &str) -> Result<f64> {
    DetectorRegistry::builtin().pixel_size(model)
}
