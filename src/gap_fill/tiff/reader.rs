use crate::gap_fill::common::error::Result;
use crate::gap_fill::engine::Image;

pub trait ImageReader {
    fn read_image(&self, data: &[u8]) -> Result<Image>;
}
