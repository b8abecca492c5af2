//! Image commands backed by the worker library

use crate::errors::CliError;
use crate::logger;
use image::{Rgba, RgbaImage};
use nodepreview_config::Config;
use nodepreview_worker::{
    image_info, load_image_array, load_image_scaled, to_valid_identifier, LoadStatus, Thumbnail,
};
use std::path::{Path, PathBuf};

/// `nodepreview thumbnail`
pub fn handle_thumbnail(
    path: &Path,
    max_size: Option<u32>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let max_size = match max_size {
        Some(size) => size,
        None => Config::load()?.thumbnail_size(),
    };

    let thumb = load_image_scaled(path, max_size)?;
    println!("{}x{}", thumb.width, thumb.height);

    if let Some(output) = output {
        thumbnail_to_rgba8(&thumb).save(&output)?;
        logger::success(&format!("Wrote thumbnail to {}", output.display()));
    }
    Ok(())
}

/// Convert a thumbnail back to a displayable top-row-first 8-bit image
///
/// Pixels missing from a short `pixels` buffer are left transparent.
pub fn thumbnail_to_rgba8(thumb: &Thumbnail) -> RgbaImage {
    const INV_GAMMA: f32 = 1.0 / 2.2;
    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;

    RgbaImage::from_fn(thumb.width, thumb.height, |x, y| {
        match thumb.pixel(x, thumb.height - y - 1) {
            Some(&[r, g, b, a]) => Rgba([
                to_byte(r.max(0.0).powf(INV_GAMMA)),
                to_byte(g.max(0.0).powf(INV_GAMMA)),
                to_byte(b.max(0.0).powf(INV_GAMMA)),
                to_byte(a),
            ]),
            _ => Rgba([0, 0, 0, 0]),
        }
    })
}

/// `nodepreview load`
///
/// Without `size` the buffer is sized to fit the image exactly.
pub fn handle_load(path: &Path, size: Option<usize>) -> Result<(), CliError> {
    let size = match size {
        Some(size) => size,
        None => match image_info(path) {
            Ok(info) => info.byte_len(),
            Err(e) => {
                logger::warn(&e.to_string());
                0
            }
        },
    };

    let mut buffer = vec![0u8; size];
    match load_image_array(&mut buffer, path)? {
        LoadStatus::Loaded => {
            let max = buffer.iter().copied().max().unwrap_or(0);
            println!("Loaded {} bytes (max sample {})", buffer.len(), max);
        }
        LoadStatus::Unreadable => {
            println!("Could not load image from path: {}", path.display());
        }
    }
    Ok(())
}

/// `nodepreview identifier`
pub fn handle_identifier(name: &str) {
    println!("{}", to_valid_identifier(name));
}
