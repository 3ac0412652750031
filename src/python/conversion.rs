//! Conversions between numpy arrays and samples.
//!
//! Inputs are copied into owned arrays so augmentation can run without
//! holding the GIL; outputs are moved into numpy without a further copy.

use numpy::{
    IntoPyArray, PyArray3, PyArray4, PyArray5, PyReadonlyArray3, PyReadonlyArray4,
    PyReadonlyArray5,
};
use pyo3::prelude::*;

use super::validation::to_py_err;
use crate::sample::Sample;
use ndarray::{Array4, Array5};

/// An (image, label) pair as numpy arrays.
pub type PyPair<'py> = (Bound<'py, PyArray4<f32>>, Bound<'py, PyArray3<u8>>);

/// A stacked (images, labels) batch as numpy arrays.
pub type PyBatch<'py> = (Bound<'py, PyArray5<f32>>, Bound<'py, PyArray4<u8>>);

/// Copy numpy image and label arrays into a validated sample.
pub fn sample_from_numpy(
    image: &PyReadonlyArray4<'_, f32>,
    label: &PyReadonlyArray3<'_, u8>,
    context: &str,
) -> PyResult<Sample> {
    Sample::new(image.as_array().to_owned(), label.as_array().to_owned())
        .map_err(|e| to_py_err(e, context))
}

/// Move a sample into a pair of numpy arrays.
pub fn sample_to_numpy(py: Python<'_>, sample: Sample) -> PyPair<'_> {
    let (image, label) = sample.into_parts();
    (image.into_pyarray(py), label.into_pyarray(py))
}

/// Copy stacked numpy batches into owned arrays.
pub fn batch_from_numpy(
    images: &PyReadonlyArray5<'_, f32>,
    labels: &PyReadonlyArray4<'_, u8>,
) -> (Array5<f32>, Array4<u8>) {
    (images.as_array().to_owned(), labels.as_array().to_owned())
}

/// Move stacked batches into numpy arrays.
pub fn batch_to_numpy(py: Python<'_>, images: Array5<f32>, labels: Array4<u8>) -> PyBatch<'_> {
    (images.into_pyarray(py), labels.into_pyarray(py))
}
