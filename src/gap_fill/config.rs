//! Gap-fill configuration types

use std::path::PathBuf;

use crate::gap_fill::common::error::{GapFillError, Result};
use crate::gap_fill::detector::DetectorRegistry;
use crate::gap_fill::engine::Offset;
use crate::gap_fill::tiff::TiffCompression;

/// Where the gap mask comes from
#[derive(Debug, Clone, PartialEq)]
pub enum MaskSource {
    /// Stock mask of the configured detector model
    Detector,
    /// Custom mask image; any pixel above zero is filled
    File(PathBuf),
}

/// Unit the translation offsets are given in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Pixel,
    /// Converted to pixels with the detector pixel pitch
    Millimetre,
}

/// Configuration for a gap-fill run
#[derive(Debug, Clone)]
pub struct GapFillConfig {
    /// Detector model name, a key of the detector registry
    pub detector: String,
    /// Gap mask source
    pub mask: MaskSource,
    /// Translation of the first secondary exposure
    pub offset1: Offset,
    /// Translation of the second secondary exposure
    pub offset2: Offset,
    /// Unit of `offset1` and `offset2`
    pub unit: OffsetUnit,
    /// Pixel pitch in millimetres; overrides the registry value when set
    pub pixel_size: Option<f64>,
    /// Flat-field image; all ones when absent
    pub flatfield: Option<PathBuf>,
    /// Compression of the written TIFF
    pub compression: TiffCompression,
    /// Whether to reject zero-area images before filling
    pub validate_dimensions: bool,
}

impl Default for GapFillConfig {
    fn default() -> Self {
        Self {
            detector: "Eiger1M".to_string(),
            mask: MaskSource::Detector,
            offset1: Offset::new(3.0, -4.0),
            offset2: Offset::new(6.0, -8.0),
            unit: OffsetUnit::Pixel,
            pixel_size: None,
            flatfield: None,
            compression: TiffCompression::None,
            validate_dimensions: true,
        }
    }
}

impl GapFillConfig {
    pub fn builder() -> GapFillConfigBuilder {
        GapFillConfigBuilder::default()
    }

    /// Pixel pitch used for millimetre conversion.
    pub fn pixel_size_mm(&self) -> Result<f64> {
        match self.pixel_size {
            Some(size) => Ok(size),
            None => DetectorRegistry::builtin().pixel_size(&self.detector),
        }
    }

    /// Both offsets expressed in pixels.
    pub fn offsets_in_pixels(&self) -> Result<(Offset, Offset)> {
        match self.unit {
            OffsetUnit::Pixel => Ok((self.offset1.validated()?, self.offset2.validated()?)),
            OffsetUnit::Millimetre => {
                let pitch = self.pixel_size_mm()?;
                let convert = |offset: Offset| Offset::from_millimetres(offset.dx, offset.dy, pitch);
                Ok((convert(self.offset1)?, convert(self.offset2)?))
            }
        }
    }

    /// Checks the detector model and any pixel pitch override.
    pub fn validate(&self) -> Result<()> {
        DetectorRegistry::builtin().geometry(&self.detector)?;
        if let Some(size) = self.pixel_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(GapFillError::InvalidOffset(format!(
                    "pixel size must be positive, got {size}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for GapFillConfig
#[derive(Default)]
pub struct GapFillConfigBuilder {
    detector: Option<String>,
    mask: Option<MaskSource>,
    offset1: Option<Offset>,
    offset2: Option<Offset>,
    unit: Option<OffsetUnit>,
    pixel_size: Option<Option<f64>>,
    flatfield: Option<Option<PathBuf>>,
    compression: Option<TiffCompression>,
    validate_dimensions: Option<bool>,
}

impl GapFillConfigBuilder {
    pub fn detector(mut self, detector: impl Into<String>) -> Self {
        self.detector = Some(detector.into());
        self
    }

    pub fn mask(mut self, mask: MaskSource) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn offset1(mut self, dx: f64, dy: f64) -> Self {
        self.offset1 = Some(Offset::new(dx, dy));
        self
    }

    pub fn offset2(mut self, dx: f64, dy: f64) -> Self {
        self.offset2 = Some(Offset::new(dx, dy));
        self
    }

    pub fn unit(mut self, unit: OffsetUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn pixel_size(mut self, pixel_size: Option<f64>) -> Self {
        self.pixel_size = Some(pixel_size);
        self
    }

    pub fn flatfield(mut self, flatfield: Option<PathBuf>) -> Self {
        self.flatfield = Some(flatfield);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> GapFillConfig {
        let default = GapFillConfig::default();
        GapFillConfig {
            detector: self.detector.unwrap_or(default.detector),
            mask: self.mask.unwrap_or(default.mask),
            offset1: self.offset1.unwrap_or(default.offset1),
            offset2: self.offset2.unwrap_or(default.offset2),
            unit: self.unit.unwrap_or(default.unit),
            pixel_size: self.pixel_size.unwrap_or(default.pixel_size),
            flatfield: self.flatfield.unwrap_or(default.flatfield),
            compression: self.compression.unwrap_or(default.compression),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
