//! Shared image decoding

use image::{DynamicImage, ImageError, ImageReader};
use std::path::Path;

/// Decode an image, detecting the format from its contents
///
/// OpenEXR and Radiance HDR files are recognised by their magic bytes, so a
/// file that is not a regular LDR format falls through to those decoders.
pub(crate) fn open_image(path: &Path) -> Result<DynamicImage, ImageError> {
    let image = ImageReader::open(path)
        .map_err(ImageError::IoError)?
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;
    tracing::trace!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        color = ?image.color(),
        "decoded image"
    );
    Ok(image)
}

/// Whether the decoded samples are floating point (HDR/OpenEXR sources)
pub(crate) fn is_float(image: &DynamicImage) -> bool {
    matches!(
        image,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
    )
}
