//! RGBA float thumbnails
//!
//! Thumbnails are always four channels (the preview consumer cannot handle
//! anything else) and stored bottom row first, which is the layout the
//! preview images expect.

use crate::decode;
use crate::errors::WorkerError;
use crate::resample;
use image::DynamicImage;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

/// Channels per thumbnail pixel
pub const THUMBNAIL_CHANNELS: usize = 4;

/// Gamma applied to LDR colour samples when converting them to float
const LDR_GAMMA: f32 = 2.2;

/// A scaled, vertically mirrored RGBA float image
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// `width * height * 4` samples, bottom row first
    pub pixels: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    /// RGBA samples of the pixel at (`x`, `y`) in stored order
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * THUMBNAIL_CHANNELS;
        self.pixels.get(start..start + THUMBNAIL_CHANNELS)
    }
}

/// Compute the thumbnail dimensions for an image of `width` x `height`
///
/// The longer side becomes `max_size`; the shorter side is scaled by the
/// aspect ratio and truncated, but never drops below one pixel.
pub fn thumbnail_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let max = f64::from(max_size);
    let (w, h) = match width.cmp(&height) {
        Ordering::Equal => (max_size, max_size),
        Ordering::Less => {
            let aspect = f64::from(width) / f64::from(height);
            ((max * aspect) as u32, max_size)
        }
        Ordering::Greater => {
            let aspect = f64::from(height) / f64::from(width);
            (max_size, (max * aspect) as u32)
        }
    };
    (w.max(1), h.max(1))
}

/// Load the image at `path` as an RGBA float thumbnail no larger than `max_size`
///
/// LDR sources are linearised (`(v / 255) ^ 2.2` on colour, alpha linear);
/// HDR and OpenEXR sources keep their float values.
pub fn load_image_scaled(path: &Path, max_size: u32) -> Result<Thumbnail, WorkerError> {
    if max_size == 0 {
        return Err(WorkerError::InvalidSize(0));
    }

    let image = decode::open_image(path).map_err(|source| WorkerError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let (width, height) = (image.width(), image.height());
    let linear = to_linear_rgba(image);
    let (thumb_width, thumb_height) = thumbnail_size(width, height, max_size);

    let scaled = resample::resize(
        &linear,
        width,
        height,
        THUMBNAIL_CHANNELS,
        thumb_width,
        thumb_height,
    );
    let pixels = mirror_rows(&scaled, thumb_width as usize * THUMBNAIL_CHANNELS);

    debug!(
        "Scaled {} from {}x{} to {}x{}",
        path.display(),
        width,
        height,
        thumb_width,
        thumb_height
    );

    Ok(Thumbnail {
        pixels,
        width: thumb_width,
        height: thumb_height,
    })
}

fn to_linear_rgba(image: DynamicImage) -> Vec<f32> {
    let is_float = decode::is_float(&image);
    let mut samples = image.into_rgba32f().into_raw();

    if !is_float {
        for pixel in samples.chunks_exact_mut(THUMBNAIL_CHANNELS) {
            for value in &mut pixel[..3] {
                *value = value.powf(LDR_GAMMA);
            }
        }
    }

    samples
}

/// Row `y` moves to row `height - y - 1`
fn mirror_rows(samples: &[f32], stride: usize) -> Vec<f32> {
    samples
        .chunks_exact(stride)
        .rev()
        .flatten()
        .copied()
        .collect()
}
