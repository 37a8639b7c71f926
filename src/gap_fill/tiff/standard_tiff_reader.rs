//! Detector image reader backed by the `tiff` crate.
//!
//! Pilatus and Eiger frames are commonly exported as single-channel TIFF with
//! 16- or 32-bit integer samples, and processed frames as 32-bit float. Every
//! sample type is widened to `f64` so the engine works on one numeric type.

use std::io::Cursor;

use ndarray::Array2;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::gap_fill::common::error::{GapFillError, Result};
use crate::gap_fill::engine::Image;
use crate::gap_fill::tiff::reader::ImageReader;

pub struct StandardTiffReader;

fn widen<T: Copy + Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

impl ImageReader for StandardTiffReader {
    /// Decodes the first page of a grayscale TIFF into a `(height, width)` array.
    ///
    /// Colour images yield [`GapFillError::UnsupportedFormat`]; malformed files
    /// yield [`GapFillError::DecodeError`].
    fn read_image(&self, data: &[u8]) -> Result<Image> {
        debug!("Decoding TIFF image, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data))
            .map_err(|e| GapFillError::DecodeError(e.to_string()))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| GapFillError::DecodeError(e.to_string()))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| GapFillError::DecodeError(e.to_string()))?;
        if !matches!(color_type, ColorType::Gray(_)) {
            return Err(GapFillError::UnsupportedFormat(format!(
                "expected single-channel image, found {:?}",
                color_type
            )));
        }

        let samples: Vec<f64> = match decoder
            .read_image()
            .map_err(|e| GapFillError::DecodeError(e.to_string()))?
        {
            DecodingResult::U8(v) => widen(v),
            DecodingResult::U16(v) => widen(v),
            DecodingResult::U32(v) => widen(v),
            // 64-bit integers may lose precision above 2^53
            DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
            DecodingResult::I8(v) => widen(v),
            DecodingResult::I16(v) => widen(v),
            DecodingResult::I32(v) => widen(v),
            DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
            DecodingResult::F32(v) => widen(v),
            DecodingResult::F64(v) => v,
            #[allow(unreachable_patterns)]
            _ => {
                return Err(GapFillError::UnsupportedFormat(
                    "unsupported sample type".to_string(),
                ));
            }
        };

        let (width, height) = (width as usize, height as usize);
        debug!("Decoded image: {}x{} ({:?})", width, height, color_type);

        Array2::from_shape_vec((height, width), samples)
            .map_err(|e| GapFillError::DecodeError(e.to_string()))
    }
}
