//! Batch-level augmentation on a dedicated worker pool.
//!
//! A batch is augmented in three steps:
//! 1. One technique decision and one seed are drawn per sample from the batch
//!    RNG, in sample order, so the result does not depend on scheduling
//! 2. A pool of `workers` threads is built for this call and runs the combiner
//!    on every sample
//! 3. Results are collected in the original order; the first failure aborts
//!    the whole batch

use crate::config::AugmentConfig;
use crate::error::{Error, Result};
use crate::rng::get_rng;
use crate::sample::{validate_pair, Sample};
use crate::transforms::augment::{combine_aug, decisions_from};
use ndarray::{stack, Array4, Array5, ArrayView4, ArrayView5, Axis};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

/// Augment a batch of samples, preserving order.
///
/// # Errors
///
/// Returns the first error raised by any sample, or a configuration or
/// worker-pool error. No partial batch is returned.
pub fn aug_samples(
    samples: Vec<Sample>,
    config: &AugmentConfig,
    seed: Option<u64>,
) -> Result<Vec<Sample>> {
    config.validate()?;
    let mut rng = get_rng(seed);
    let decisions = decisions_from(&mut rng, samples.len(), config.techniques.len())?;
    let seeds: Vec<u64> = (0..samples.len()).map(|_| rng.gen()).collect();

    debug!(
        batch_size = samples.len(),
        workers = config.workers,
        techniques = config.techniques.len(),
        "augmenting batch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("volaug-worker-{i}"))
        .build()
        .map_err(|e| Error::WorkerPool(format!("failed to build worker pool: {e}")))?;

    pool.install(|| {
        samples
            .into_par_iter()
            .zip(decisions)
            .zip(seeds)
            .map(|((sample, decision), sample_seed)| {
                combine_aug(sample, decision, config, Some(sample_seed))
            })
            .collect()
    })
}

/// Augment stacked image and label batches.
///
/// `images` has shape (batch, depth, height, width, channel) and `labels`
/// (batch, depth, height, width). The returned arrays are freshly allocated
/// with the same shapes.
///
/// # Example
///
/// ```ignore
/// let config = AugmentConfig::default();
/// let (images, labels) = aug_batch(images.view(), labels.view(), &config, None)?;
/// ```
pub fn aug_batch(
    images: ArrayView5<'_, f32>,
    labels: ArrayView4<'_, u8>,
    config: &AugmentConfig,
    seed: Option<u64>,
) -> Result<(Array5<f32>, Array4<u8>)> {
    config.validate()?;
    let batch_size = images.len_of(Axis(0));
    if labels.len_of(Axis(0)) != batch_size {
        return Err(Error::ShapeMismatch(format!(
            "batch has {} images but {} labels",
            batch_size,
            labels.len_of(Axis(0))
        )));
    }
    if batch_size == 0 {
        return Ok((images.to_owned(), labels.to_owned()));
    }

    let samples = images
        .outer_iter()
        .zip(labels.outer_iter())
        .map(|(image, label)| {
            validate_pair(image, label)?;
            Ok(Sample::from_parts(image.to_owned(), label.to_owned()))
        })
        .collect::<Result<Vec<_>>>()?;

    let augmented = aug_samples(samples, config, seed)?;

    let image_views: Vec<ArrayView4<'_, f32>> =
        augmented.iter().map(|s| s.image().view()).collect();
    let label_views: Vec<_> = augmented.iter().map(|s| s.label().view()).collect();
    let out_images = stack(Axis(0), &image_views)
        .map_err(|e| Error::ShapeMismatch(format!("cannot restack images: {e}")))?;
    let out_labels = stack(Axis(0), &label_views)
        .map_err(|e| Error::ShapeMismatch(format!("cannot restack labels: {e}")))?;
    Ok((out_images, out_labels))
}
