use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, ImageFormat};
use log::debug;
use std::fs;
use std::path::Path;

use super::types::{Frame, HdrImage};
use crate::error::{AppError, Result};

/// Pixels at or below this normalized level carry no usable signal.
const Z_MIN: f32 = 0.01;
/// Pixels at or above this normalized level are treated as saturated.
const Z_MAX: f32 = 0.99;
const EPSILON: f32 = 1e-32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub min: u8,
    pub max: u8,
    pub mean: f64,
}

pub struct FrameProcessor;

impl FrameProcessor {
    /// Wrap a raw Mono8 buffer received from the acquisition side.
    pub fn from_raw(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        nframe: u64,
        timestamp_raw: u64,
        exposure_time: f64,
    ) -> Result<Frame> {
        let data: GrayImage = ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
            AppError::frame_processing(format!("buffer too small for {width}x{height} frame"))
        })?;
        Ok(Frame::new(data, nframe, timestamp_raw, exposure_time))
    }

    /// Per-pixel mean of `frames`, truncated to 8 bits. Metadata comes from
    /// the first frame.
    pub fn average<'a, I>(frames: I) -> Result<Frame>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let mut frames = frames.into_iter();
        let first = frames
            .next()
            .ok_or_else(|| AppError::frame_processing("no frames to average"))?;

        let mut sums: Vec<u32> = first.pixels().iter().map(|&p| u32::from(p)).collect();
        let mut count = 1u32;
        for frame in frames {
            if frame.data.dimensions() != first.data.dimensions() {
                return Err(AppError::frame_processing(format!(
                    "cannot average {}x{} frame with {}x{} frame",
                    frame.width, frame.height, first.width, first.height
                )));
            }
            for (sum, &p) in sums.iter_mut().zip(frame.pixels()) {
                *sum += u32::from(p);
            }
            count += 1;
        }
        debug!("Averaged {} frames", count);

        let pixels = sums
            .into_iter()
            .map(|sum| u8::try_from(sum / count).unwrap_or(u8::MAX))
            .collect();
        Self::from_raw(
            first.width,
            first.height,
            pixels,
            first.nframe,
            first.timestamp_raw,
            first.exposure_time,
        )
    }

    /// Merge differently exposed frames into one HDR image.
    ///
    /// `times` are the exposure times of `frames`; the result is scaled so
    /// that an exposure of `time_ref` maps radiance to the same level as the
    /// input. Each sample is weighted by a Gaussian centred on mid-grey;
    /// pixels under- or over-exposed in every frame are pinned to the darkest
    /// or brightest value the bracket can represent.
    pub fn merge_hdr(frames: &[Frame], times: &[f64], time_ref: f64) -> Result<HdrImage> {
        let first = frames
            .first()
            .ok_or_else(|| AppError::frame_processing("no frames to merge"))?;
        if frames.len() != times.len() {
            return Err(AppError::frame_processing(format!(
                "{} frames but {} exposure times",
                frames.len(),
                times.len()
            )));
        }
        if time_ref <= 0.0 || times.iter().any(|t| *t <= 0.0) {
            return Err(AppError::frame_processing("exposure times must be positive"));
        }
        if frames.iter().any(|f| f.data.dimensions() != first.data.dimensions()) {
            return Err(AppError::frame_processing("frames differ in size"));
        }

        let relative: Vec<f32> = times.iter().map(|t| (t / time_ref) as f32).collect();
        let t_min = relative.iter().copied().fold(f32::INFINITY, f32::min);
        let t_max = relative.iter().copied().fold(0.0, f32::max);

        let pixel_count = first.pixels().len();
        let mut merged = Vec::with_capacity(pixel_count);
        for idx in 0..pixel_count {
            let mut weighted = 0.0f32;
            let mut weights = 0.0f32;
            let mut all_under = true;
            let mut all_over = true;

            for (frame, t) in frames.iter().zip(&relative) {
                let z = f32::from(frame.pixels()[idx]) / f32::from(u8::MAX);
                all_under &= z < Z_MIN;
                all_over &= z > Z_MAX;

                let gaussian = if (Z_MIN..=Z_MAX).contains(&z) {
                    (-4.0 * ((z - 0.5) / 0.5).powi(2)).exp()
                } else {
                    0.0
                };
                let w = gaussian + EPSILON;
                weighted += w * z / t;
                weights += w;
            }

            let value = if all_under {
                Z_MIN / t_max
            } else if all_over {
                Z_MAX / t_min
            } else {
                weighted / weights
            };
            merged.push(value);
        }

        ImageBuffer::from_raw(first.width, first.height, merged)
            .ok_or_else(|| AppError::frame_processing("failed to build HDR image"))
    }

    /// Resize for display; `factor` must be positive.
    pub fn scale(frame: &Frame, factor: f32) -> Result<GrayImage> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(AppError::frame_processing(format!(
                "scale must be positive, got {factor}"
            )));
        }
        let width = ((frame.width as f32 * factor).round() as u32).max(1);
        let height = ((frame.height as f32 * factor).round() as u32).max(1);
        Ok(imageops::resize(&frame.data, width, height, FilterType::Triangle))
    }

    /// Write `image` as PNG, creating the parent folder if needed.
    pub fn save_png(image: &GrayImage, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        image.save_with_format(path, ImageFormat::Png)?;
        debug!("Saved {}", path.display());
        Ok(())
    }

    pub fn stats(frame: &Frame) -> FrameStats {
        let pixels = frame.pixels();
        if pixels.is_empty() {
            return FrameStats {
                min: 0,
                max: 0,
                mean: 0.0,
            };
        }
        let (min, max, sum) = pixels.iter().fold((u8::MAX, u8::MIN, 0u64), |(lo, hi, sum), &p| {
            (lo.min(p), hi.max(p), sum + u64::from(p))
        });
        FrameStats {
            min,
            max,
            mean: sum as f64 / pixels.len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, level: u8, exposure: f64) -> Frame {
        FrameProcessor::from_raw(
            width,
            height,
            vec![level; (width * height) as usize],
            0,
            0,
            exposure,
        )
        .unwrap()
    }

    #[test]
    fn test_from_raw_rejects_short_buffers() {
        assert!(FrameProcessor::from_raw(4, 4, vec![0; 15], 0, 0, 1.0).is_err());
    }

    #[test]
    fn test_average_truncates() {
        let frames = [solid(2, 2, 10, 1.0), solid(2, 2, 13, 1.0)];
        let avg = FrameProcessor::average(frames.iter()).unwrap();
        assert!(avg.pixels().iter().all(|&p| p == 11));
        assert_eq!(avg.width, 2);
    }

    #[test]
    fn test_average_rejects_mismatched_sizes() {
        let frames = [solid(2, 2, 10, 1.0), solid(3, 2, 10, 1.0)];
        assert!(FrameProcessor::average(frames.iter()).is_err());
        assert!(FrameProcessor::average(std::iter::empty()).is_err());
    }

    #[test]
    fn test_hdr_recovers_linear_radiance() {
        // Radiance r seen at t/t_ref = 1 and 2 gives z = r and 2r.
        let frames = [solid(1, 1, 51, 1000.0), solid(1, 1, 102, 2000.0)];
        let hdr = FrameProcessor::merge_hdr(&frames, &[1000.0, 2000.0], 1000.0).unwrap();
        let value = hdr.get_pixel(0, 0)[0];
        assert!((value - 0.2).abs() < 1e-3, "got {value}");
    }

    #[test]
    fn test_hdr_pins_saturated_and_dark_pixels() {
        let bright = [solid(1, 1, 255, 1000.0), solid(1, 1, 255, 4000.0)];
        let hdr = FrameProcessor::merge_hdr(&bright, &[1000.0, 4000.0], 1000.0).unwrap();
        assert!((hdr.get_pixel(0, 0)[0] - Z_MAX).abs() < 1e-6);

        let dark = [solid(1, 1, 0, 1000.0), solid(1, 1, 0, 4000.0)];
        let hdr = FrameProcessor::merge_hdr(&dark, &[1000.0, 4000.0], 1000.0).unwrap();
        assert!((hdr.get_pixel(0, 0)[0] - Z_MIN / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_hdr_argument_checks() {
        let frames = [solid(1, 1, 100, 1000.0)];
        assert!(FrameProcessor::merge_hdr(&frames, &[1000.0, 2000.0], 1000.0).is_err());
        assert!(FrameProcessor::merge_hdr(&frames, &[0.0], 1000.0).is_err());
        assert!(FrameProcessor::merge_hdr(&[], &[], 1000.0).is_err());
    }

    #[test]
    fn test_scale_and_stats() {
        let frame = solid(8, 4, 40, 1.0);
        let small = FrameProcessor::scale(&frame, 0.25).unwrap();
        assert_eq!(small.dimensions(), (2, 1));
        assert!(FrameProcessor::scale(&frame, 0.0).is_err());

        let stats = FrameProcessor::stats(&frame);
        assert_eq!((stats.min, stats.max), (40, 40));
        assert!((stats.mean - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_png_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("frame.png");
        let small = FrameProcessor::scale(&solid(8, 8, 90, 1.0), 0.5).unwrap();
        FrameProcessor::save_png(&small, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (4, 4));
    }
}
