//! TIFF input/output module
//!
//! Reads detector exposures, flat-fields and custom masks from TIFF and
//! writes the filled result back as floating-point TIFF.

mod reader;
mod writer;
mod standard_tiff_reader;
mod standard_tiff_writer;
pub mod types;


pub use reader::ImageReader;
pub use writer::ImageWriter;
pub use standard_tiff_reader::StandardTiffReader;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::TiffCompression;
