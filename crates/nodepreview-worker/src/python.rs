//! `nodepreview_worker` extension module
//!
//! Decoding and resampling run with the interpreter detached so preview
//! generation does not block other Python threads.

use crate::errors::WorkerError;
use crate::image_array::{self, LoadStatus};
use crate::{identifier, thumbnail, MODULE_NAME};
use pyo3::buffer::PyBuffer;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyMemoryView;
use std::path::PathBuf;

impl From<WorkerError> for PyErr {
    fn from(err: WorkerError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Decode off the interpreter; `None` when the file is unreadable
fn load_detached(
    py: Python<'_>,
    len: usize,
    filepath: PathBuf,
) -> Result<Option<Vec<u8>>, WorkerError> {
    py.detach(move || {
        let mut target = vec![0u8; len];
        match image_array::load_image_array(&mut target, &filepath)? {
            LoadStatus::Loaded => Ok(Some(target)),
            LoadStatus::Unreadable => Ok(None),
        }
    })
}

/// load_image_array(array, filepath)
///
/// Fill any writable, contiguous buffer with the image's samples halved. The
/// buffer is viewed as raw bytes, so its byte length must match the image.
#[pyfunction]
#[pyo3(name = "load_image_array")]
fn py_load_image_array(
    py: Python<'_>,
    array: &Bound<'_, PyAny>,
    filepath: PathBuf,
) -> PyResult<()> {
    let bytes = PyMemoryView::from(array)?.call_method1("cast", ("B",))?;
    let buffer = PyBuffer::<u8>::get(&bytes)?;
    if buffer.readonly() {
        return Err(WorkerError::ReadOnlyBuffer.into());
    }
    if let Some(samples) = load_detached(py, buffer.item_count(), filepath)? {
        buffer.copy_from_slice(py, &samples)?;
    }
    Ok(())
}

/// load_image_scaled(filepath, max_size) -> (list[float], width, height)
#[pyfunction]
#[pyo3(name = "load_image_scaled")]
fn py_load_image_scaled(
    py: Python<'_>,
    filepath: PathBuf,
    max_size: i32,
) -> PyResult<(Vec<f32>, u32, u32)> {
    let max_size = u32::try_from(max_size)
        .ok()
        .filter(|size| *size > 0)
        .ok_or(WorkerError::InvalidSize(i64::from(max_size)))?;

    let thumb = py.detach(move || thumbnail::load_image_scaled(&filepath, max_size))?;
    Ok((thumb.pixels, thumb.width, thumb.height))
}

/// to_valid_identifier(name) -> str
#[pyfunction]
#[pyo3(name = "to_valid_identifier")]
fn py_to_valid_identifier(name: &str) -> String {
    identifier::to_valid_identifier(name)
}

#[pymodule]
fn nodepreview_worker(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_load_image_array, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_image_scaled, m)?)?;
    m.add_function(wrap_pyfunction!(py_to_valid_identifier, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    tracing::debug!("initialized {} module", MODULE_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyo3::types::{PyByteArray, PyBytes};
    use tempfile::TempDir;

    fn with_module<F>(f: F)
    where
        F: for<'py> FnOnce(&Bound<'py, PyModule>) -> PyResult<()>,
    {
        Python::initialize();
        let result = Python::attach(|py| {
            let m = PyModule::new(py, MODULE_NAME)?;
            nodepreview_worker(&m)?;
            f(&m)
        });
        assert!(result.is_ok(), "python call failed: {:?}", result.err());
    }

    fn write_rgb(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("rgb.png");
        let image = image::RgbImage::from_pixel(2, 1, image::Rgb([255, 128, 2]));
        assert!(image.save(&path).is_ok());
        path
    }

    #[test]
    fn test_to_valid_identifier_binding() {
        with_module(|m| {
            let name: String = m
                .getattr("to_valid_identifier")?
                .call1(("Mix RGB",))?
                .extract()?;
            assert_eq!(name, "nMix_32RGB");
            Ok(())
        });
    }

    #[test]
    fn test_load_image_array_fills_bytearray() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = write_rgb(&temp_dir);

        with_module(|m| {
            let target = PyByteArray::new(m.py(), &[0u8; 6]);
            m.getattr("load_image_array")?.call1((&target, &path))?;
            assert_eq!(target.to_vec(), vec![127, 64, 1, 127, 64, 1]);
            Ok(())
        });
    }

    #[test]
    fn test_load_image_array_accepts_any_writable_buffer() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = write_rgb(&temp_dir);

        with_module(|m| {
            let py = m.py();
            let func = m.getattr("load_image_array")?;

            // Two float32 items are eight bytes, not the six the image needs
            let floats = py.import("array")?.getattr("array")?.call1(("f", vec![0.0f32; 2]))?;
            let err = func.call1((&floats, &path));
            assert!(err.as_ref().is_err_and(|e| e.is_instance_of::<PyValueError>(py)
                && e.to_string().contains("Mismatch between target buffer size (8)")));

            let readonly = PyBytes::new(py, &[0u8; 6]);
            let err = func.call1((&readonly, &path));
            assert!(err.is_err_and(|e| e.is_instance_of::<PyValueError>(py)));
            Ok(())
        });
    }

    #[test]
    fn test_load_image_scaled_binding() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = write_rgb(&temp_dir);

        with_module(|m| {
            let (pixels, width, height): (Vec<f32>, u32, u32) = m
                .getattr("load_image_scaled")?
                .call1((&path, 4))?
                .extract()?;
            assert_eq!((width, height), (4, 2));
            assert_eq!(pixels.len(), 4 * 2 * 4);

            let err = m.getattr("load_image_scaled")?.call1((&path, 0));
            assert!(err.is_err());
            Ok(())
        });
    }
}
