use crate::types::{Depth, ImageInfo};

/// Read access to raster geometry.
pub trait ImageView {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn channels(&self) -> usize;
    fn depth(&self) -> Depth;
    fn has_alpha(&self) -> bool;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width(),
            height: self.height(),
            channels: self.channels(),
            alpha_channel: self.has_alpha(),
            depth: self.depth(),
        }
    }
}
