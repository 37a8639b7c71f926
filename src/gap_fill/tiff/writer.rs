use std::io::Write;
use crate::gap_fill::common::error::Result;
use crate::gap_fill::config::GapFillConfig;
use crate::gap_fill::engine::Image;

pub trait ImageWriter {
    fn write_image(&self, image: &Image, output: &mut dyn Write, config: &GapFillConfig) -> Result<()>;
}
