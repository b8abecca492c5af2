//! Node Preview Worker
//!
//! Image helpers used by the node preview add-on:
//! 1. Loading an image's raw 8-bit samples into a caller-owned buffer
//! 2. Producing vertically mirrored RGBA float thumbnails
//! 3. Turning arbitrary names into identifier-safe strings
//!
//! With the `python` feature the same functions are exposed as the
//! `nodepreview_worker` extension module.

mod decode;
pub mod errors;
pub mod identifier;
pub mod image_array;
mod resample;
pub mod thumbnail;

#[cfg(feature = "python")]
mod python;

pub use errors::WorkerError;
pub use identifier::to_valid_identifier;
pub use image_array::{image_info, load_image_array, ImageInfo, LoadStatus};
pub use thumbnail::{load_image_scaled, thumbnail_size, Thumbnail, THUMBNAIL_CHANNELS};

/// Name under which the extension module is importable
pub const MODULE_NAME: &str = "nodepreview_worker";
