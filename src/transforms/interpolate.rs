//! Coordinate-mapped resampling of 3D volumes.
//!
//! Every spatial transform in this crate is expressed as a backward mapping:
//! for each output voxel, a closure returns the (fractional) source coordinate
//! to read from. The volume is then sampled at that coordinate with nearest,
//! trilinear or cubic B-spline interpolation.
//!
//! Cubic interpolation works on B-spline coefficients rather than raw voxel
//! values. The coefficients come from the exact recursive prefilter (single
//! pole `sqrt(3) - 2`, mirror-symmetric boundaries), so sampling at integer
//! coordinates reproduces the input.

use ndarray::{Array3, ArrayView3, Axis, Zip};

/// A point in voxel coordinates (depth, height, width).
pub type Coord = [f64; 3];

/// Coordinates within this distance outside the volume are treated as inside.
const EDGE_TOLERANCE: f64 = 1e-6;

/// Cubic B-spline pole.
const POLE: f64 = -0.267_949_192_431_122_7;

/// Truncation tolerance of the causal initialisation sum.
const PREFILTER_TOLERANCE: f64 = 1e-10;

/// Interpolation method used when sampling between voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Spline order 0. The only method valid for label maps.
    Nearest,
    /// Spline order 1.
    Trilinear,
    /// Spline order 3.
    #[default]
    Cubic,
}

/// How source coordinates outside the volume are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Outside voxels read as zero.
    #[default]
    Constant,
    /// Coordinates mirror about the edge voxel centres without repeating
    /// them, so `-1` reads voxel `1` and `n` reads voxel `n - 2`.
    Reflect,
}

impl BoundaryMode {
    /// Map a source coordinate into `[0, n-1]` per axis, or `None` when the
    /// output voxel should take the fill value.
    fn fold(self, p: Coord, shape: [usize; 3]) -> Option<Coord> {
        let mut q = p;
        for axis in 0..3 {
            let last = shape[axis] as f64 - 1.0;
            let x = p[axis];
            q[axis] = match self {
                Self::Constant => {
                    if !(x >= -EDGE_TOLERANCE && x <= last + EDGE_TOLERANCE) {
                        return None;
                    }
                    x.clamp(0.0, last)
                }
                Self::Reflect => reflect(x, shape[axis]),
            };
        }
        Some(q)
    }
}

fn reflect(x: f64, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let last = n as f64 - 1.0;
    let period = 2.0 * last;
    let mut y = x.rem_euclid(period);
    if y > last {
        y = period - y;
    }
    y.clamp(0.0, last)
}

/// Mirror an integer index into `[0, n)` without repeating the edge sample.
fn mirror(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let mut i = i.rem_euclid(period);
    if i >= n as isize {
        i = period - i;
    }
    i as usize
}

/// Resample a floating-point volume through a backward coordinate mapping.
///
/// The output has the same shape as `volume`. `map` receives the output voxel
/// coordinate and returns the source coordinate to sample.
pub fn resample<F>(
    volume: ArrayView3<'_, f32>,
    interp: Interpolation,
    mode: BoundaryMode,
    map: F,
) -> Array3<f32>
where
    F: Fn(Coord) -> Coord + Sync,
{
    let (d, h, w) = volume.dim();
    let shape = [d, h, w];
    let coeffs = match interp {
        Interpolation::Cubic => spline_coefficients(volume.mapv(f64::from)),
        Interpolation::Nearest | Interpolation::Trilinear => volume.mapv(f64::from),
    };

    let mut out = Array3::<f32>::zeros((d, h, w));
    Zip::indexed(&mut out).par_for_each(|(i, j, k), o| {
        let Some(p) = mode.fold(map([i as f64, j as f64, k as f64]), shape) else {
            return;
        };
        let v = match interp {
            Interpolation::Nearest => coeffs[nearest_index(p)],
            Interpolation::Trilinear => sample_linear(&coeffs, p),
            Interpolation::Cubic => sample_cubic(&coeffs, p),
        };
        *o = v as f32;
    });
    out
}

/// Resample a discrete volume with nearest-neighbour lookup.
///
/// Used for label maps: every output value is copied from some input voxel or
/// is `T::default()`, so no new classes can appear.
pub fn resample_nearest<T, F>(volume: ArrayView3<'_, T>, mode: BoundaryMode, map: F) -> Array3<T>
where
    T: Copy + Default + Send + Sync,
    F: Fn(Coord) -> Coord + Sync,
{
    let (d, h, w) = volume.dim();
    let shape = [d, h, w];
    let mut out = Array3::<T>::default((d, h, w));
    Zip::indexed(&mut out).par_for_each(|(i, j, k), o| {
        if let Some(p) = mode.fold(map([i as f64, j as f64, k as f64]), shape) {
            *o = volume[nearest_index(p)];
        }
    });
    out
}

fn nearest_index(p: Coord) -> [usize; 3] {
    // Folded coordinates are non-negative and within bounds.
    [
        p[0].round() as usize,
        p[1].round() as usize,
        p[2].round() as usize,
    ]
}

/// Weighted sum over a separable `K`-tap neighbourhood.
fn separable_sum<const K: usize>(
    c: &Array3<f64>,
    idx: &[[usize; K]; 3],
    weights: &[[f64; K]; 3],
) -> f64 {
    let mut acc = 0.0;
    for (&i, &wi) in idx[0].iter().zip(&weights[0]) {
        if wi == 0.0 {
            continue;
        }
        for (&j, &wj) in idx[1].iter().zip(&weights[1]) {
            if wj == 0.0 {
                continue;
            }
            for (&k, &wk) in idx[2].iter().zip(&weights[2]) {
                if wk == 0.0 {
                    continue;
                }
                acc += wi * wj * wk * c[[i, j, k]];
            }
        }
    }
    acc
}

fn sample_linear(c: &Array3<f64>, p: Coord) -> f64 {
    let dims = c.shape();
    let mut idx = [[0usize; 2]; 3];
    let mut weights = [[0.0f64; 2]; 3];
    for axis in 0..3 {
        let f = p[axis].floor();
        let t = p[axis] - f;
        let i0 = f as usize;
        idx[axis] = [i0, (i0 + 1).min(dims[axis] - 1)];
        weights[axis] = [1.0 - t, t];
    }
    separable_sum(c, &idx, &weights)
}

/// Sample prefiltered cubic B-spline coefficients at `p`.
pub(crate) fn sample_cubic(c: &Array3<f64>, p: Coord) -> f64 {
    let dims = c.shape();
    let mut idx = [[0usize; 4]; 3];
    let mut weights = [[0.0f64; 4]; 3];
    for axis in 0..3 {
        let f = p[axis].floor();
        let base = f as isize - 1;
        for (tap, slot) in idx[axis].iter_mut().enumerate() {
            *slot = mirror(base + tap as isize, dims[axis]);
        }
        weights[axis] = cubic_weights(p[axis] - f);
    }
    separable_sum(c, &idx, &weights)
}

fn cubic_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let s = 1.0 - t;
    [
        s * s * s / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// Convert samples to cubic B-spline coefficients, in place along each axis.
pub(crate) fn spline_coefficients(mut c: Array3<f64>) -> Array3<f64> {
    for axis in 0..3 {
        Zip::from(c.lanes_mut(Axis(axis))).par_for_each(|mut lane| {
            let mut line = lane.to_vec();
            prefilter_line(&mut line);
            lane.iter_mut().zip(line).for_each(|(dst, v)| *dst = v);
        });
    }
    c
}

fn prefilter_line(c: &mut [f64]) {
    let n = c.len();
    if n < 2 {
        return;
    }
    let z = POLE;
    let gain = (1.0 - z) * (1.0 - 1.0 / z);
    c.iter_mut().for_each(|v| *v *= gain);

    c[0] = initial_causal(c, z);
    for k in 1..n {
        c[k] += z * c[k - 1];
    }
    c[n - 1] = (z / (z * z - 1.0)) * (z * c[n - 2] + c[n - 1]);
    for k in (0..n - 1).rev() {
        c[k] = z * (c[k + 1] - c[k]);
    }
}

fn initial_causal(c: &[f64], z: f64) -> f64 {
    let n = c.len();
    let horizon = (PREFILTER_TOLERANCE.ln() / z.abs().ln()).ceil() as usize;
    if horizon < n {
        let mut zn = z;
        let mut sum = c[0];
        for &v in &c[1..horizon] {
            sum += zn * v;
            zn *= z;
        }
        sum
    } else {
        let iz = 1.0 / z;
        let mut zn = z;
        let mut z2n = z.powi(n as i32 - 1);
        let mut sum = c[0] + z2n * c[n - 1];
        z2n *= z2n * iz;
        for &v in &c[1..n - 1] {
            sum += (zn + z2n) * v;
            zn *= z;
            z2n *= iz;
        }
        sum / (1.0 - zn * zn)
    }
}
