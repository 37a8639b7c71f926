use std::io::Write;
use tracing::debug;
use crate::gap_fill::common::error::{Result, GapFillError};
use crate::gap_fill::config::GapFillConfig;
use crate::gap_fill::engine::Image;
use crate::gap_fill::tiff::types::TiffCompression;
use crate::gap_fill::tiff::writer::ImageWriter;

/// Writes images as 32-bit float grayscale TIFF.
pub struct StandardTiffWriter;

impl ImageWriter for StandardTiffWriter {
    fn write_image(&self, image: &Image, output: &mut dyn Write, config: &GapFillConfig) -> Result<()> {
        let (height, width) = image.dim();
        debug!("Encoding TIFF image: {}x{}", width, height);

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        // Row-major samples regardless of the array's memory layout
        let samples: Vec<f32> = image.iter().map(|&v| v as f32).collect();

        {
            let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| GapFillError::EncodeError(e.to_string()))?
                .with_compression(compression);

            encoder.write_image::<tiff::encoder::colortype::Gray32Float>(
                width as u32,
                height as u32,
                &samples,
            ).map_err(|e| GapFillError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
