//! Paired image/label transforms.
//!
//! Every transform takes a [`Sample`](crate::Sample) and returns a new one.
//! Spatial transforms apply one coordinate mapping to all image channels and
//! to the label; image channels are interpolated smoothly while labels always
//! use nearest-neighbour lookup, so no fractional classes appear.

pub mod affine;
pub mod augment;
pub mod flip;
pub mod intensity;
pub mod interpolate;
pub mod warp;

pub use affine::{
    affine_transform, random_rotation, random_shift, rotate, rotation_matrix, shift, Matrix3,
};
pub use augment::{combine_aug, random_decisions, Technique, DEFAULT_TECHNIQUES};
pub use flip::{flip, one_class_flip, random_flip, random_one_class_flip, FLIPPABLE_LABELS};
pub use intensity::{brightness, random_brightness, remove_tumor, PowerLaw};
pub use interpolate::{resample, resample_nearest, BoundaryMode, Coord, Interpolation};
pub use warp::{
    elastic_deform, random_elastic, random_swirl, swirl, DisplacementGrid, SWIRL_PLANES,
};
