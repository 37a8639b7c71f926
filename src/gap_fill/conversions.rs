//! Pipeline conversions module
//!
//! This module wires image loading, mask generation, the gap-fill engine
//! and TIFF output into one run.

mod gap_fill_pipeline;


pub use gap_fill_pipeline::{default_output_path, GapFillPipeline};
