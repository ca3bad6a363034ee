use image::{ImageBuffer, Luma};
use std::sync::Arc;

/// 8-bit monochrome frame as delivered by the acquisition side.
#[derive(Clone, Debug)]
pub struct Frame {
    pub data: ImageBuffer<Luma<u8>, Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub nframe: u64,
    pub timestamp_raw: u64,
    /// Exposure the frame was taken with, in microseconds.
    pub exposure_time: f64,
}

impl Frame {
    pub fn new(
        data: ImageBuffer<Luma<u8>, Vec<u8>>,
        nframe: u64,
        timestamp_raw: u64,
        exposure_time: f64,
    ) -> Self {
        let (width, height) = data.dimensions();
        Self {
            data,
            width,
            height,
            nframe,
            timestamp_raw,
            exposure_time,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        self.data.as_raw()
    }
}

pub type ArcFrame = Arc<Frame>;

/// Floating-point image produced by HDR merging, relative radiance units.
pub type HdrImage = ImageBuffer<Luma<f32>, Vec<f32>>;
