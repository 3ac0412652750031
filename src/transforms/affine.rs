//! Rotations and translations resampled through an affine mapping.
//!
//! Both transforms follow the backward-mapping convention of
//! [`resample`](super::interpolate::resample): the output voxel at `o` reads
//! the source voxel at `matrix · o + offset`. Image channels use cubic
//! interpolation, labels nearest, and anything mapped from outside the volume
//! becomes zero.

use crate::error::{Error, Result};
use crate::rng::{get_rng, truncated_normal};
use crate::sample::Sample;
use crate::transforms::interpolate::{resample, resample_nearest, BoundaryMode, Interpolation};
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// Row-major 3×3 matrix.
pub type Matrix3 = [[f64; 3]; 3];

/// Default upper bound for each random rotation angle.
pub const DEFAULT_MAX_ANGLE: f64 = FRAC_PI_2;

/// Default per-axis standard deviation of random shifts, in voxels.
pub const DEFAULT_SHIFT_STDS: [f64; 3] = [20.0, 20.0, 20.0];

fn matmul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Rotation matrix `Rx(alpha) · Ry(beta) · Rz(gamma)`.
pub fn rotation_matrix(angles: [f64; 3]) -> Matrix3 {
    let [alpha, beta, gamma] = angles;
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let (sg, cg) = gamma.sin_cos();

    let rx = [[1.0, 0.0, 0.0], [0.0, ca, -sa], [0.0, sa, ca]];
    let ry = [[cb, 0.0, sb], [0.0, 1.0, 0.0], [-sb, 0.0, cb]];
    let rz = [[cg, -sg, 0.0], [sg, cg, 0.0], [0.0, 0.0, 1.0]];

    matmul(&matmul(&rx, &ry), &rz)
}

/// Resample every channel and the label through `source = matrix · o + offset`.
///
/// # Errors
///
/// Returns [`Error::TransformError`] if the matrix or offset is not finite.
pub fn affine_transform(sample: &Sample, matrix: &Matrix3, offset: [f64; 3]) -> Result<Sample> {
    if matrix.iter().flatten().chain(offset.iter()).any(|v| !v.is_finite()) {
        return Err(Error::transform(
            "affine_transform",
            "matrix and offset must be finite",
        ));
    }

    let map = |o: [f64; 3]| {
        let mut src = offset;
        for (s, row) in src.iter_mut().zip(matrix) {
            *s += row[0] * o[0] + row[1] * o[1] + row[2] * o[2];
        }
        src
    };

    let image = sample.map_channels(|_, channel| {
        Ok(resample(
            channel,
            Interpolation::Cubic,
            BoundaryMode::Constant,
            map,
        ))
    })?;
    let label = resample_nearest(sample.label().view(), BoundaryMode::Constant, map);
    Ok(Sample::from_parts(image, label))
}

/// Rotate by the given angles (radians) about the x, y and z axes.
///
/// With `about_center` false the rotation pivots on voxel `(0, 0, 0)`;
/// otherwise it pivots on the volume centre.
#[must_use = "this function returns a Result and does not modify the original"]
pub fn rotate(sample: &Sample, angles: [f64; 3], about_center: bool) -> Result<Sample> {
    let matrix = rotation_matrix(angles);
    let offset = if about_center {
        let center = sample.spatial_shape().map(|n| (n as f64 - 1.0) / 2.0);
        let mut offset = center;
        for (o, row) in offset.iter_mut().zip(&matrix) {
            *o -= row[0] * center[0] + row[1] * center[1] + row[2] * center[2];
        }
        offset
    } else {
        [0.0; 3]
    };
    affine_transform(sample, &matrix, offset)
}

/// Rotate by three angles drawn uniformly from `[0, max_angle)`.
///
/// # Arguments
///
/// * `sample` - Input image/label pair
/// * `max_angle` - Upper bound for each angle in radians (default: π/2)
/// * `about_center` - Pivot on the volume centre instead of the origin
/// * `seed` - Optional random seed for reproducibility
#[must_use = "this function returns a Result and does not modify the original"]
pub fn random_rotation(
    sample: &Sample,
    max_angle: Option<f64>,
    about_center: bool,
    seed: Option<u64>,
) -> Result<Sample> {
    let max_angle = max_angle.unwrap_or(DEFAULT_MAX_ANGLE);
    if !(max_angle.is_finite() && max_angle >= 0.0) {
        return Err(Error::Configuration(format!(
            "max rotation angle must be non-negative and finite (got {})",
            max_angle
        )));
    }
    let mut rng = get_rng(seed);
    let angles = if max_angle > 0.0 {
        [(); 3].map(|_| rng.gen_range(0.0..max_angle))
    } else {
        [0.0; 3]
    };
    rotate(sample, angles, about_center)
}

/// Translate by `offsets` voxels along (depth, height, width).
#[must_use = "this function returns a Result and does not modify the original"]
pub fn shift(sample: &Sample, offsets: [f64; 3]) -> Result<Sample> {
    let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    affine_transform(sample, &identity, offsets.map(|s| -s))
}

/// Translate by per-axis offsets from a truncated normal on `[-std, std]`.
///
/// # Arguments
///
/// * `sample` - Input image/label pair
/// * `stds` - Per-axis standard deviation in voxels (default: 20 on each axis)
/// * `seed` - Optional random seed for reproducibility
#[must_use = "this function returns a Result and does not modify the original"]
pub fn random_shift(sample: &Sample, stds: Option<[f64; 3]>, seed: Option<u64>) -> Result<Sample> {
    let stds = stds.unwrap_or(DEFAULT_SHIFT_STDS);
    let mut rng = get_rng(seed);
    let offsets = stds.map(|std| truncated_normal(&mut rng, std));
    shift(sample, offsets)
}
