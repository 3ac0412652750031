//! Non-linear warps: in-plane swirl and random elastic deformation.

use crate::error::{Error, Result};
use crate::rng::{get_rng, truncated_normal};
use crate::sample::{check_axis, Sample};
use crate::transforms::interpolate::{
    resample, resample_nearest, sample_cubic, spline_coefficients, BoundaryMode, Coord,
    Interpolation,
};
use ndarray::{Array3, ArrayView3, Zip};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::LN_2;

/// Axis pairs a swirl can act on.
pub const SWIRL_PLANES: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

/// Default swirl radius in voxels.
pub const DEFAULT_SWIRL_RADIUS: f64 = 100.0;

/// Default standard deviation of the swirl strength.
pub const DEFAULT_SWIRL_STRENGTH_STD: f64 = 1.0;

/// Default standard deviation of elastic control-point displacements, in voxels.
pub const DEFAULT_ELASTIC_SIGMA: f64 = 2.0;

/// Default number of elastic control points per axis.
pub const DEFAULT_ELASTIC_POINTS: usize = 3;

/// Swirl mapping in the plane of the first two axes of a `shape` volume.
///
/// The rotation angle decays with distance from the plane centre and has
/// dropped to about 1/1000 of `strength` at `radius`.
fn swirl_mapping(
    shape: [usize; 3],
    strength: f64,
    radius: f64,
) -> impl Fn(Coord) -> Coord + Sync + Copy {
    let y0 = (shape[0] as f64 - 1.0) / 2.0;
    let x0 = (shape[1] as f64 - 1.0) / 2.0;
    let decay = radius / 5.0 * LN_2;
    move |p: Coord| {
        let y = p[0] - y0;
        let x = p[1] - x0;
        let rho = x.hypot(y);
        let theta = strength * (-rho / decay).exp() + y.atan2(x);
        [y0 + rho * theta.sin(), x0 + rho * theta.cos(), p[2]]
    }
}

/// Swap `plane` to the front, apply `f` in that frame, then swap back.
fn in_plane<T, F>(volume: ArrayView3<'_, T>, plane: (usize, usize), f: F) -> Array3<T>
where
    T: Clone,
    F: FnOnce(ArrayView3<'_, T>) -> Array3<T>,
{
    let mut view = volume;
    view.swap_axes(plane.0, plane.1);
    let mut out = f(view);
    out.swap_axes(plane.0, plane.1);
    out.as_standard_layout().into_owned()
}

/// Swirl every image channel and the label in the plane of two spatial axes.
///
/// The pair is swapped so the swirl acts on the leading two axes of the
/// swapped volume, slice by slice along the remaining axis, and the original
/// axis order is restored afterwards. Coordinates leaving the volume are
/// reflected back in.
///
/// # Errors
///
/// Returns an error if the axes are invalid or equal, or if `radius` is not a
/// positive finite number.
#[must_use = "this function returns a Result and does not modify the original"]
pub fn swirl(sample: &Sample, plane: (usize, usize), strength: f64, radius: f64) -> Result<Sample> {
    check_axis(plane.0, "swirl")?;
    check_axis(plane.1, "swirl")?;
    if plane.0 == plane.1 {
        return Err(Error::InvalidDimensions(
            "swirl: plane axes must be different".into(),
        ));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(Error::transform(
            "swirl",
            format!("radius must be positive and finite (got {})", radius),
        ));
    }
    if !strength.is_finite() {
        return Err(Error::transform(
            "swirl",
            format!("strength must be finite (got {})", strength),
        ));
    }

    let mut shape = sample.spatial_shape();
    shape.swap(plane.0, plane.1);
    let map = swirl_mapping(shape, strength, radius);

    let image = sample.map_channels(|_, channel| {
        Ok(in_plane(channel, plane, |v| {
            resample(v, Interpolation::Cubic, BoundaryMode::Reflect, map)
        }))
    })?;
    let label = in_plane(sample.label().view(), plane, |v| {
        resample_nearest(v, BoundaryMode::Reflect, map)
    });
    Ok(Sample::from_parts(image, label))
}

/// Swirl in a random plane with strength from a truncated normal.
///
/// # Arguments
///
/// * `sample` - Input image/label pair
/// * `radius` - Swirl extent in voxels (default: 100)
/// * `strength_std` - Standard deviation of the strength (default: 1)
/// * `seed` - Optional random seed for reproducibility
#[must_use = "this function returns a Result and does not modify the original"]
pub fn random_swirl(
    sample: &Sample,
    radius: Option<f64>,
    strength_std: Option<f64>,
    seed: Option<u64>,
) -> Result<Sample> {
    let radius = radius.unwrap_or(DEFAULT_SWIRL_RADIUS);
    let strength_std = strength_std.unwrap_or(DEFAULT_SWIRL_STRENGTH_STD);
    let mut rng = get_rng(seed);
    let plane = SWIRL_PLANES[rng.gen_range(0..SWIRL_PLANES.len())];
    let strength = truncated_normal(&mut rng, strength_std);
    swirl(sample, plane, strength, radius)
}

/// Coarse grid of control-point displacements, one component per spatial axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementGrid {
    components: [Array3<f64>; 3],
}

impl DisplacementGrid {
    /// Build a grid from per-axis displacement components of equal shape.
    pub fn new(components: [Array3<f64>; 3]) -> Result<Self> {
        let shape = components[0].shape();
        if components.iter().any(|c| c.shape() != shape) {
            return Err(Error::ShapeMismatch(
                "displacement components must share one grid shape".into(),
            ));
        }
        if shape.iter().any(|&n| n < 2) {
            return Err(Error::InvalidDimensions(format!(
                "displacement grid needs at least 2 control points per axis (got {:?})",
                shape
            )));
        }
        if components.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::transform(
                "elastic_deform",
                "displacements must be finite",
            ));
        }
        Ok(Self { components })
    }

    /// A grid with no displacement.
    pub fn zeros(points: usize) -> Result<Self> {
        let zero = Array3::zeros((points, points, points));
        Self::new([zero.clone(), zero.clone(), zero])
    }

    /// Control-point displacements drawn from `N(0, sigma²)`.
    pub fn random<R: Rng + ?Sized>(points: usize, sigma: f64, rng: &mut R) -> Result<Self> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(Error::Configuration(format!(
                "elastic sigma must be non-negative and finite (got {})",
                sigma
            )));
        }
        let mut component = || {
            Array3::from_shape_simple_fn((points, points, points), || {
                rng.sample::<f64, _>(StandardNormal) * sigma
            })
        };
        let components = [component(), component(), component()];
        Self::new(components)
    }

    /// Number of control points along each axis.
    pub fn points(&self) -> [usize; 3] {
        let (a, b, c) = self.components[0].dim();
        [a, b, c]
    }

    /// Interpolate the control grid to a dense field over `shape` with cubic
    /// B-splines. Control points sit evenly from the first to the last voxel.
    fn dense(&self, shape: [usize; 3]) -> [Array3<f64>; 3] {
        let points = self.points();
        let scale: [f64; 3] = std::array::from_fn(|a| {
            if shape[a] > 1 {
                (points[a] - 1) as f64 / (shape[a] - 1) as f64
            } else {
                0.0
            }
        });
        self.components.clone().map(|component| {
            let coeffs = spline_coefficients(component);
            let mut field = Array3::<f64>::zeros((shape[0], shape[1], shape[2]));
            Zip::indexed(&mut field).par_for_each(|(i, j, k), v| {
                let u = [
                    i as f64 * scale[0],
                    j as f64 * scale[1],
                    k as f64 * scale[2],
                ];
                *v = sample_cubic(&coeffs, u);
            });
            field
        })
    }
}

/// Deform image and label with the smooth field interpolated from `grid`.
///
/// Image channels are resampled linearly, the label by nearest neighbour, and
/// both read zero outside the volume.
#[must_use = "this function returns a Result and does not modify the original"]
pub fn elastic_deform(sample: &Sample, grid: &DisplacementGrid) -> Result<Sample> {
    let [dz, dy, dx] = grid.dense(sample.spatial_shape());
    let map = |o: Coord| {
        let idx = [o[0] as usize, o[1] as usize, o[2] as usize];
        [o[0] + dz[idx], o[1] + dy[idx], o[2] + dx[idx]]
    };

    let image = sample.map_channels(|_, channel| {
        Ok(resample(
            channel,
            Interpolation::Trilinear,
            BoundaryMode::Constant,
            map,
        ))
    })?;
    let label = resample_nearest(sample.label().view(), BoundaryMode::Constant, map);
    Ok(Sample::from_parts(image, label))
}

/// Elastic deformation from a random control grid.
///
/// # Arguments
///
/// * `sample` - Input image/label pair
/// * `sigma` - Standard deviation of control-point displacements (default: 2)
/// * `points` - Control points per axis (default: 3)
/// * `seed` - Optional random seed for reproducibility
#[must_use = "this function returns a Result and does not modify the original"]
pub fn random_elastic(
    sample: &Sample,
    sigma: Option<f64>,
    points: Option<usize>,
    seed: Option<u64>,
) -> Result<Sample> {
    let sigma = sigma.unwrap_or(DEFAULT_ELASTIC_SIGMA);
    let points = points.unwrap_or(DEFAULT_ELASTIC_POINTS);
    let mut rng = get_rng(seed);
    let grid = DisplacementGrid::random(points, sigma, &mut rng)?;
    elastic_deform(sample, &grid)
}
