//! Gap-fill engine
//!
//! Flat-field correction followed by a cascaded, coordinate-remapped
//! bilinear fill of masked detector pixels.

mod fill;
pub mod interpolation;
pub mod types;

#[cfg(test)]
mod tests;

pub use fill::fill_gap;
pub use types::{Image, Mask, Offset, SecondStage, ShiftedImage};
