use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the worker functions
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Mismatch between target buffer size ({target}) and size of loaded image ({image})")]
    SizeMismatch { target: usize, image: usize },

    #[error("Could not load image: {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid thumbnail size: {0}")]
    InvalidSize(i64),

    #[error("Target buffer is read-only")]
    ReadOnlyBuffer,
}
