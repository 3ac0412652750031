//! Random augmentation functions for Python bindings.
//!
//! Images are float32 arrays shaped (depth, height, width, channel) and labels
//! uint8 arrays shaped (depth, height, width). Every function returns a new
//! `(image, label)` tuple.

use numpy::{PyReadonlyArray3, PyReadonlyArray4, PyReadonlyArray5};
use pyo3::prelude::*;

use super::conversion::{
    batch_from_numpy, batch_to_numpy, sample_from_numpy, sample_to_numpy, PyBatch, PyPair,
};
use super::validation::{
    to_py_err, validate_probability, validate_technique_count, validate_workers,
};
use crate::config::AugmentConfig;
use crate::sample::Sample;
use crate::transforms;

fn apply_pair<'py, F>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    context: &str,
    f: F,
) -> PyResult<PyPair<'py>>
where
    F: FnOnce(&Sample) -> crate::Result<Sample> + Send,
{
    let sample = sample_from_numpy(&image, &label, context)?;
    let out = py
        .allow_threads(|| f(&sample))
        .map_err(|e| to_py_err(e, context))?;
    Ok(sample_to_numpy(py, out))
}

/// Apply augmentation technique `technique` with probability 1 - passthrough_prob.
///
/// Args:
///     image: float32 array (D, H, W, C)
///     label: uint8 array (D, H, W)
///     technique: Index into the first `n_techniques` techniques
///         (0 flip, 1 brightness, 2 rotation, 3 elastic, 4 shift, 5 swirl,
///         6 tumor removal, 7 one-class flip)
///     n_techniques: Number of enabled techniques (default: 6)
///     passthrough_prob: Probability of returning the input unchanged (default: 0.5)
///     seed: Optional random seed for reproducibility
///
/// Returns:
///     (image, label) tuple
#[pyfunction]
#[pyo3(signature = (image, label, technique, n_techniques=6, passthrough_prob=0.5, seed=None))]
pub fn combine_aug<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    technique: usize,
    n_techniques: usize,
    passthrough_prob: f64,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    validate_technique_count(n_techniques, "combine_aug")?;
    validate_probability(passthrough_prob, "combine_aug")?;
    let config = AugmentConfig::new()
        .technique_count(n_techniques)
        .passthrough_prob(passthrough_prob);

    let sample = sample_from_numpy(&image, &label, "combine_aug")?;
    let out = py
        .allow_threads(|| crate::combine_aug(sample, technique, &config, seed))
        .map_err(|e| to_py_err(e, "combine_aug"))?;
    Ok(sample_to_numpy(py, out))
}

/// Augment a stacked batch on a worker pool.
///
/// Args:
///     images: float32 array (N, D, H, W, C)
///     labels: uint8 array (N, D, H, W)
///     workers: Worker threads for this call (default: 8)
///     n_techniques: Number of enabled techniques (default: 6)
///     seed: Optional random seed for reproducibility
///
/// Returns:
///     (images, labels) tuple with the input shapes
///
/// Example:
///     >>> xb, yb = volaug.aug_batch(xb, yb, seed=0)
#[pyfunction]
#[pyo3(signature = (images, labels, workers=8, n_techniques=6, seed=None))]
pub fn aug_batch<'py>(
    py: Python<'py>,
    images: PyReadonlyArray5<'py, f32>,
    labels: PyReadonlyArray4<'py, u8>,
    workers: usize,
    n_techniques: usize,
    seed: Option<u64>,
) -> PyResult<PyBatch<'py>> {
    validate_workers(workers, "aug_batch")?;
    validate_technique_count(n_techniques, "aug_batch")?;
    let config = AugmentConfig::new()
        .workers(workers)
        .technique_count(n_techniques);

    let (images, labels) = batch_from_numpy(&images, &labels);
    let (out_images, out_labels) = py
        .allow_threads(|| crate::aug_batch(images.view(), labels.view(), &config, seed))
        .map_err(|e| to_py_err(e, "aug_batch"))?;
    Ok(batch_to_numpy(py, out_images, out_labels))
}

/// Draw one technique index per batch element.
#[pyfunction]
#[pyo3(signature = (n, n_techniques=6, seed=None))]
pub fn random_decisions(n: usize, n_techniques: usize, seed: Option<u64>) -> PyResult<Vec<usize>> {
    crate::random_decisions(n, n_techniques, seed).map_err(|e| to_py_err(e, "random_decisions"))
}

/// Flip image and label along a random spatial axis.
#[pyfunction]
#[pyo3(signature = (image, label, seed=None))]
pub fn flip3d<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "flip3d", |s| transforms::random_flip(s, seed))
}

/// Flip one random label class (1, 2 or 3) along a random axis.
#[pyfunction]
#[pyo3(signature = (image, label, seed=None))]
pub fn one_class_flip<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "one_class_flip", |s| {
        transforms::random_one_class_flip(s, seed)
    })
}

/// Rotate by three random angles in [0, max_angle).
#[pyfunction]
#[pyo3(signature = (image, label, max_angle=None, about_center=false, seed=None))]
pub fn rotation3d<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    max_angle: Option<f64>,
    about_center: bool,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "rotation3d", |s| {
        transforms::random_rotation(s, max_angle, about_center, seed)
    })
}

/// Shift by truncated-normal offsets (default std 20 voxels per axis).
#[pyfunction]
#[pyo3(signature = (image, label, shift_stds=None, seed=None))]
pub fn shift3d<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    shift_stds: Option<[f64; 3]>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "shift3d", |s| {
        transforms::random_shift(s, shift_stds, seed)
    })
}

/// Swirl in a random axis plane.
#[pyfunction]
#[pyo3(signature = (image, label, radius=None, strength_std=None, seed=None))]
pub fn swirl3d<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    radius: Option<f64>,
    strength_std: Option<f64>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "swirl3d", |s| {
        transforms::random_swirl(s, radius, strength_std, seed)
    })
}

/// Per-channel power-law brightness change.
#[pyfunction]
#[pyo3(signature = (image, label, gain_range=None, gamma_range=None, seed=None))]
pub fn brightness<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    gain_range: Option<(f32, f32)>,
    gamma_range: Option<(f32, f32)>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "brightness", |s| {
        transforms::random_brightness(s, gain_range, gamma_range, seed)
    })
}

/// Random elastic deformation.
#[pyfunction]
#[pyo3(signature = (image, label, sigma=None, points=None, seed=None))]
pub fn elastic<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
    sigma: Option<f64>,
    points: Option<usize>,
    seed: Option<u64>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "elastic", |s| {
        transforms::random_elastic(s, sigma, points, seed)
    })
}

/// Zero the image under the label and clear the label.
#[pyfunction]
pub fn tumor_removal<'py>(
    py: Python<'py>,
    image: PyReadonlyArray4<'py, f32>,
    label: PyReadonlyArray3<'py, u8>,
) -> PyResult<PyPair<'py>> {
    apply_pair(py, image, label, "tumor_removal", |s| {
        Ok(transforms::remove_tumor(s))
    })
}
