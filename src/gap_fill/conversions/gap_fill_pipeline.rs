use std::io::Write;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{info, instrument, warn};

use crate::gap_fill::{
    common::error::{GapFillError, Result},
    config::{GapFillConfig, MaskSource},
    detector::DetectorRegistry,
    engine::{fill_gap, Image, Mask, Offset, SecondStage, ShiftedImage},
    tiff::{ImageReader, ImageWriter, StandardTiffReader, StandardTiffWriter},
};

/// `<base dir>/filled_<base stem>.tif`
pub fn default_output_path(base: &Path) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let name = format!("filled_{stem}.tif");
    match base.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub struct GapFillPipeline<R: ImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    config: GapFillConfig,
}

impl GapFillPipeline<StandardTiffReader, StandardTiffWriter> {
    pub fn new(config: GapFillConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader: StandardTiffReader,
            writer: StandardTiffWriter,
            config,
        })
    }
}

impl<R: ImageReader, W: ImageWriter> GapFillPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: GapFillConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, image: &Image) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let (height, width) = image.dim();
        if width == 0 || height == 0 {
            return Err(GapFillError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Image> {
        let data = std::fs::read(path).map_err(|e| {
            GapFillError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        self.reader.read_image(&data)
    }

    /// Offsets of both secondary exposures in pixels.
    pub fn resolve_offsets(&self) -> Result<(Offset, Offset)> {
        self.config.offsets_in_pixels()
    }

    /// Gap mask from the detector registry or from the configured mask file.
    pub fn build_mask(&self) -> Result<Mask> {
        match &self.config.mask {
            MaskSource::Detector => DetectorRegistry::builtin().generate_mask(&self.config.detector),
            MaskSource::File(path) => {
                let _span = tracing::info_span!("load_mask", path = %path.display()).entered();
                let image = self.read_file(path)?;
                Ok(image.mapv(|v| u8::from(v > 0.0)))
            }
        }
    }

    /// Configured flat-field, or all ones of `shape`.
    pub fn load_flatfield(&self, shape: (usize, usize)) -> Result<Image> {
        match &self.config.flatfield {
            Some(path) => {
                let _span = tracing::info_span!("load_flatfield", path = %path.display()).entered();
                self.read_file(path)
            }
            None => Ok(Array2::ones(shape)),
        }
    }

    /// Fills the gaps of `base` from already decoded exposures.
    #[instrument(skip_all, fields(detector = %self.config.detector, second = second.is_some()))]
    pub fn fill(&self, base: &Image, first: Option<&Image>, second: Option<&Image>) -> Result<Image> {
        let Some(first) = first else {
            warn!("No first secondary image, nothing to fill from");
            return Err(GapFillError::MissingInput("first secondary image".to_string()));
        };

        self.validate_dimensions(base)?;

        let mask = {
            let _span = tracing::info_span!("build_mask").entered();
            self.build_mask()?
        };
        let flatfield = self.load_flatfield(base.dim())?;
        let (offset1, offset2) = self.resolve_offsets()?;
        info!(
            dx1 = offset1.dx,
            dy1 = offset1.dy,
            dx2 = offset2.dx,
            dy2 = offset2.dy,
            "Resolved offsets in pixels"
        );

        let second_stage: SecondStage<'_> = second
            .map(|image| ShiftedImage::new(image.view(), offset2))
            .into();

        let filled = {
            let _span = tracing::info_span!("fill_gap").entered();
            fill_gap(
                flatfield.view(),
                mask.view(),
                base.view(),
                Some(ShiftedImage::new(first.view(), offset1)),
                second_stage,
            )?
        };

        info!(
            height = filled.nrows(),
            width = filled.ncols(),
            "Gap fill complete"
        );
        Ok(filled)
    }

    /// Decodes the exposures, fills the gaps and encodes the result into `output`.
    #[instrument(skip_all, fields(input_size = base.len()))]
    pub fn fill_bytes(
        &self,
        base: &[u8],
        first: Option<&[u8]>,
        second: Option<&[u8]>,
        output: &mut dyn Write,
    ) -> Result<Image> {
        let (base, first, second) = {
            let _span = tracing::info_span!("decode_exposures").entered();
            let base = self.reader.read_image(base)?;
            let first = first.map(|data| self.reader.read_image(data)).transpose()?;
            let second = second.map(|data| self.reader.read_image(data)).transpose()?;
            (base, first, second)
        };

        let filled = self.fill(&base, first.as_ref(), second.as_ref())?;

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_image(&filled, output, &self.config)?;
        }

        Ok(filled)
    }

    /// Reads the exposures from disk and writes the filled image.
    ///
    /// Without an explicit `output`, the result goes next to `base` as
    /// `filled_<stem>.tif`. Returns the path written.
    #[instrument(skip_all)]
    pub fn fill_files(
        &self,
        base: &Path,
        first: Option<&Path>,
        second: Option<&Path>,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let output_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(base));

        info!(
            base = %base.display(),
            output = %output_path.display(),
            "Gap filling file"
        );

        let (base, first, second) = {
            let _span = tracing::info_span!("read_input_files").entered();
            let base = self.read_file(base)?;
            let first = first.map(|path| self.read_file(path)).transpose()?;
            let second = second.map(|path| self.read_file(path)).transpose()?;
            (base, first, second)
        };

        let filled = self.fill(&base, first.as_ref(), second.as_ref())?;

        let mut output_file = {
            let _span = tracing::info_span!("create_output_file").entered();
            std::fs::File::create(&output_path).map_err(|e| {
                GapFillError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?
        };

        {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_image(&filled, &mut output_file, &self.config)?;
        }

        Ok(output_path)
    }

    pub fn config(&self) -> &GapFillConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GapFillConfig) {
        self.config = config;
    }
}
