//! Loading raw image samples into a caller-owned buffer

use crate::decode;
use crate::errors::WorkerError;
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of [`load_image_array`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The target buffer was filled
    Loaded,
    /// The file could not be decoded; the target buffer is untouched
    Unreadable,
}

/// Dimensions of an image in its native 8-bit layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl ImageInfo {
    /// Number of bytes [`load_image_array`] expects in its target buffer
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * usize::from(self.channels)
    }
}

/// Load the image at `path` into `target`, halving every sample
///
/// Samples are 8-bit in the image's own channel count (grey, grey+alpha,
/// RGB or RGBA), row-major from the top row. Each value is stored as
/// `v / 2` so it fits a signed char.
///
/// An unreadable file is not an error: a warning is logged and
/// [`LoadStatus::Unreadable`] is returned. A decoded image whose sample count
/// differs from `target.len()` is an error.
pub fn load_image_array(target: &mut [u8], path: &Path) -> Result<LoadStatus, WorkerError> {
    let image = match decode::open_image(path) {
        Ok(image) => image,
        Err(err) => {
            warn!(
                "[NodePreview] Could not load image from path: {} ({})",
                path.display(),
                err
            );
            return Ok(LoadStatus::Unreadable);
        }
    };

    let samples = native_samples(image);
    if samples.len() != target.len() {
        return Err(WorkerError::SizeMismatch {
            target: target.len(),
            image: samples.len(),
        });
    }

    for (dst, src) in target.iter_mut().zip(&samples) {
        *dst = src / 2;
    }

    debug!(
        "Loaded {} samples from {}",
        samples.len(),
        path.display()
    );
    Ok(LoadStatus::Loaded)
}

/// Read the dimensions and channel count of the image at `path`
pub fn image_info(path: &Path) -> Result<ImageInfo, WorkerError> {
    let image = decode::open_image(path).map_err(|source| WorkerError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(ImageInfo {
        width: image.width(),
        height: image.height(),
        channels: native_channel_count(&image),
    })
}

fn native_channel_count(image: &DynamicImage) -> u8 {
    image.color().channel_count().clamp(1, 4)
}

/// Flatten to 8-bit samples, keeping the native channel count
fn native_samples(image: DynamicImage) -> Vec<u8> {
    if decode::is_float(&image) {
        return hdr_samples(&image);
    }

    match native_channel_count(&image) {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        _ => image.into_rgba8().into_raw(),
    }
}

/// Quantize float sources with a 1/2.2 display gamma on the colour channels
fn hdr_samples(image: &DynamicImage) -> Vec<u8> {
    const INV_GAMMA: f32 = 1.0 / 2.2;

    let channels = usize::from(native_channel_count(image));
    let floats: Vec<f32> = if channels == 4 {
        image.to_rgba32f().into_raw()
    } else {
        image.to_rgb32f().into_raw()
    };

    floats
        .chunks_exact(channels)
        .flat_map(|pixel| {
            pixel.iter().enumerate().map(|(i, &v)| {
                let v = if i < 3 { v.max(0.0).powf(INV_GAMMA) } else { v };
                (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, Rgb32FImage, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_load_rgb_halves_samples() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("rgb.png");
        let image = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([255, 128, 1])
            } else {
                Rgb([0, 10, 200])
            }
        });
        assert!(image.save(&path).is_ok());

        let mut target = vec![0u8; 6];
        let status = load_image_array(&mut target, &path);
        assert!(matches!(status, Ok(LoadStatus::Loaded)));
        assert_eq!(target, vec![127, 64, 0, 0, 5, 100]);
    }

    #[test]
    fn test_load_keeps_native_channel_count() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let grey_path = temp_dir.path().join("grey.png");
        assert!(GrayImage::from_pixel(3, 2, Luma([90])).save(&grey_path).is_ok());

        let rgba_path = temp_dir.path().join("rgba.png");
        assert!(RgbaImage::from_pixel(3, 2, Rgba([2, 4, 6, 8]))
            .save(&rgba_path)
            .is_ok());

        let mut grey = vec![0u8; 6];
        assert!(matches!(
            load_image_array(&mut grey, &grey_path),
            Ok(LoadStatus::Loaded)
        ));
        assert!(grey.iter().all(|&v| v == 45));

        let mut rgba = vec![0u8; 24];
        assert!(matches!(
            load_image_array(&mut rgba, &rgba_path),
            Ok(LoadStatus::Loaded)
        ));
        assert_eq!(&rgba[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_sixteen_bit_source_is_quantized() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("deep.png");
        // Multiples of 257 map to exact 8-bit values
        let image: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(2, 1, Rgb([65535, 128 * 257, 0]));
        assert!(image.save(&path).is_ok());

        let mut target = vec![0u8; 6];
        let status = load_image_array(&mut target, &path);
        assert!(matches!(status, Ok(LoadStatus::Loaded)), "{:?}", status);
        assert_eq!(target, vec![127, 64, 0, 127, 64, 0]);
    }

    #[test]
    fn test_float_source_is_gamma_encoded() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("linear.exr");
        let image = Rgb32FImage::from_pixel(1, 1, Rgb([1.0, 0.5, 4.0]));
        assert!(image.save(&path).is_ok());

        let mid = ((0.5f32.powf(1.0 / 2.2) * 255.0 + 0.5) as u8) / 2;
        let mut target = vec![0u8; 3];
        let status = load_image_array(&mut target, &path);
        assert!(matches!(status, Ok(LoadStatus::Loaded)), "{:?}", status);
        assert_eq!(mid, 93);
        // Values above 1.0 saturate
        assert_eq!(target, vec![127, mid, 127]);
    }

    #[test]
    fn test_size_mismatch_is_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("rgb.png");
        assert!(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])).save(&path).is_ok());

        let mut target = vec![7u8; 10];
        let result = load_image_array(&mut target, &path);
        assert!(matches!(
            result,
            Err(WorkerError::SizeMismatch {
                target: 10,
                image: 12
            })
        ));
        assert!(target.iter().all(|&v| v == 7));
    }

    #[test]
    fn test_unreadable_file_leaves_target_untouched() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let garbage = temp_dir.path().join("garbage.png");
        assert!(std::fs::write(&garbage, b"not an image").is_ok());

        let mut target = vec![9u8; 4];
        let status = load_image_array(&mut target, &garbage);
        assert!(matches!(status, Ok(LoadStatus::Unreadable)));

        let missing = temp_dir.path().join("missing.png");
        let status = load_image_array(&mut target, &missing);
        assert!(matches!(status, Ok(LoadStatus::Unreadable)));
        assert_eq!(target, vec![9u8; 4]);
    }

    #[test]
    fn test_image_info() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("info.png");
        assert!(RgbaImage::from_pixel(5, 3, Rgba([0, 0, 0, 255]))
            .save(&path)
            .is_ok());

        let info = image_info(&path);
        assert!(info.is_ok());
        let Ok(info) = info else {
            return;
        };
        assert_eq!(
            info,
            ImageInfo {
                width: 5,
                height: 3,
                channels: 4
            }
        );
        assert_eq!(info.byte_len(), 60);
    }
}
