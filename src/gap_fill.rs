//! Detector gap-fill module
//!
//! This module reconstructs the insensitive inter-module gaps of a pixel-array
//! detector exposure from one or two translated exposures of the same sample,
//! with separate modules for detector geometry, the fill engine, TIFF I/O and
//! run orchestration.

pub mod common;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod engine;
pub mod tiff;

pub use common::{
    GapFillError,
    Result,
};

pub use config::{
    GapFillConfig,
    GapFillConfigBuilder,
    MaskSource,
    OffsetUnit,
};

pub use detector::{
    detector_pixel_size,
    generate_detector_mask,
    DetectorGeometry,
    DetectorRegistry,
};

pub use engine::{
    fill_gap,
    Image,
    Mask,
    Offset,
    SecondStage,
    ShiftedImage,
};

pub use self::tiff::{
    ImageReader,
    ImageWriter,
    StandardTiffReader,
    StandardTiffWriter,
    TiffCompression,
};

pub use conversions::{
    default_output_path,
    GapFillPipeline,
};
