//! Detector geometry module
//!
//! Holds the gap layout and pixel pitch of the supported pixel-array detectors
//! and turns a model name into its stock gap mask.

pub mod geometry;
mod mask;

pub use geometry::{DetectorGeometry, DetectorRegistry};
pub use mask::{detector_pixel_size, generate_detector_mask, rasterize_gaps};
