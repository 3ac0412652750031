//! Axis flips of whole volumes and of single label classes.

use crate::error::Result;
use crate::rng::get_rng;
use crate::sample::{check_axis, Sample};
use ndarray::{Array, Axis, Dimension, Zip};
use rand::Rng;

/// Label values eligible for [`one_class_flip`].
pub const FLIPPABLE_LABELS: [u8; 3] = [1, 2, 3];

fn flipped<A: Clone, D: Dimension>(arr: &Array<A, D>, axis: usize) -> Array<A, D> {
    let mut arr = arr.clone();
    arr.invert_axis(Axis(axis));
    arr.as_standard_layout().into_owned()
}

/// Reverse image (all channels) and label along a spatial axis.
///
/// Applying the same flip twice returns the original sample.
#[must_use = "this function returns a new sample and does not modify the original"]
pub fn flip(sample: &Sample, axis: usize) -> Result<Sample> {
    check_axis(axis, "flip")?;
    Ok(Sample::from_parts(
        flipped(sample.image(), axis),
        flipped(sample.label(), axis),
    ))
}

/// Flip along a spatial axis chosen uniformly at random.
///
/// # Example
///
/// ```ignore
/// let augmented = random_flip(&sample, Some(42))?;
/// ```
#[must_use = "this function returns a new sample and does not modify the original"]
pub fn random_flip(sample: &Sample, seed: Option<u64>) -> Result<Sample> {
    let mut rng = get_rng(seed);
    flip(sample, rng.gen_range(0..3))
}

/// Flip only the voxels belonging to one label class.
///
/// Where the original label equals `class`, image channels and label take the
/// content mirrored along `axis`; every other voxel is left untouched.
#[must_use = "this function returns a new sample and does not modify the original"]
pub fn one_class_flip(sample: &Sample, axis: usize, class: u8) -> Result<Sample> {
    check_axis(axis, "one_class_flip")?;
    let label = sample.label();
    let flipped_label = flipped(label, axis);

    let image = sample.map_channels(|_, channel| {
        let mut mirrored = channel.to_owned();
        mirrored.invert_axis(Axis(axis));
        let mut out = channel.to_owned();
        Zip::from(&mut out)
            .and(&mirrored)
            .and(label)
            .for_each(|o, &m, &l| {
                if l == class {
                    *o = m;
                }
            });
        Ok(out)
    })?;

    let mut new_label = label.clone();
    Zip::from(&mut new_label)
        .and(&flipped_label)
        .and(label)
        .for_each(|o, &m, &l| {
            if l == class {
                *o = m;
            }
        });

    Ok(Sample::from_parts(image, new_label))
}

/// One-class flip with a random axis and a random class from [`FLIPPABLE_LABELS`].
#[must_use = "this function returns a new sample and does not modify the original"]
pub fn random_one_class_flip(sample: &Sample, seed: Option<u64>) -> Result<Sample> {
    let mut rng = get_rng(seed);
    let axis = rng.gen_range(0..3);
    let class = FLIPPABLE_LABELS[rng.gen_range(0..FLIPPABLE_LABELS.len())];
    one_class_flip(sample, axis, class)
}
