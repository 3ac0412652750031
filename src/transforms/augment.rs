//! Random augmentation selection for ML training.
//!
//! Each training sample receives at most one transform per batch: a decision
//! index picks the technique, and a coin flip decides whether it is applied
//! at all, so roughly half of every batch stays unaugmented.

use crate::config::AugmentConfig;
use crate::error::{Error, Result};
use crate::rng::get_rng;
use crate::sample::Sample;
use crate::transforms::{affine, flip, intensity, warp};
use rand::prelude::*;
use std::fmt;
use tracing::trace;

/// An augmentation technique the combiner can dispatch to.
///
/// Discriminants are the canonical decision indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    /// Mirror along a random spatial axis.
    Flip = 0,
    /// Per-channel power-law intensity change.
    Brightness = 1,
    /// Random 3D rotation.
    Rotation = 2,
    /// Random elastic deformation.
    Elastic = 3,
    /// Random translation.
    Shift = 4,
    /// Random in-plane swirl.
    Swirl = 5,
    /// Erase labelled regions.
    TumorRemoval = 6,
    /// Mirror a single label class.
    OneClassFlip = 7,
}

/// Techniques enabled by default, in decision order.
pub const DEFAULT_TECHNIQUES: [Technique; 6] = [
    Technique::Flip,
    Technique::Brightness,
    Technique::Rotation,
    Technique::Elastic,
    Technique::Shift,
    Technique::Swirl,
];

impl Technique {
    /// Every technique in canonical order.
    pub const ALL: [Technique; 8] = [
        Technique::Flip,
        Technique::Brightness,
        Technique::Rotation,
        Technique::Elastic,
        Technique::Shift,
        Technique::Swirl,
        Technique::TumorRemoval,
        Technique::OneClassFlip,
    ];

    /// Look up a technique by canonical index.
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::UnsupportedTechnique {
                index,
                available: Self::ALL.len(),
            })
    }

    /// Short snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Flip => "flip",
            Self::Brightness => "brightness",
            Self::Rotation => "rotation",
            Self::Elastic => "elastic",
            Self::Shift => "shift",
            Self::Swirl => "swirl",
            Self::TumorRemoval => "tumor_removal",
            Self::OneClassFlip => "one_class_flip",
        }
    }

    /// Apply this technique with parameters from `config`.
    pub fn apply(
        self,
        sample: &Sample,
        config: &AugmentConfig,
        seed: Option<u64>,
    ) -> Result<Sample> {
        match self {
            Self::Flip => flip::random_flip(sample, seed),
            Self::Brightness => intensity::random_brightness(
                sample,
                Some(config.gain_range),
                Some(config.gamma_range),
                seed,
            ),
            Self::Rotation => affine::random_rotation(
                sample,
                Some(config.max_rotation),
                config.rotate_about_center,
                seed,
            ),
            Self::Elastic => warp::random_elastic(
                sample,
                Some(config.elastic_sigma),
                Some(config.elastic_points),
                seed,
            ),
            Self::Shift => affine::random_shift(sample, Some(config.shift_stds), seed),
            Self::Swirl => warp::random_swirl(
                sample,
                Some(config.swirl_radius),
                Some(config.swirl_strength_std),
                seed,
            ),
            Self::TumorRemoval => Ok(intensity::remove_tumor(sample)),
            Self::OneClassFlip => flip::random_one_class_flip(sample, seed),
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Draw `n` technique indices uniformly from `[0, n_techniques)`.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if `n_techniques` is zero.
pub fn random_decisions(n: usize, n_techniques: usize, seed: Option<u64>) -> Result<Vec<usize>> {
    let mut rng = get_rng(seed);
    decisions_from(&mut rng, n, n_techniques)
}

pub(crate) fn decisions_from<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    n_techniques: usize,
) -> Result<Vec<usize>> {
    if n_techniques == 0 {
        return Err(Error::Configuration(
            "cannot draw decisions from zero techniques".into(),
        ));
    }
    Ok((0..n).map(|_| rng.gen_range(0..n_techniques)).collect())
}

/// Apply the technique at index `technique` of `config`, or pass the sample
/// through unchanged with probability `config.passthrough_prob`.
///
/// The index is checked before the coin flip, so an invalid index always
/// fails.
///
/// # Example
///
/// ```ignore
/// let config = AugmentConfig::default();
/// let augmented = combine_aug(sample, 2, &config, Some(7))?;
/// ```
pub fn combine_aug(
    sample: Sample,
    technique: usize,
    config: &AugmentConfig,
    seed: Option<u64>,
) -> Result<Sample> {
    config.validate()?;
    let chosen = *config
        .techniques
        .get(technique)
        .ok_or(Error::UnsupportedTechnique {
            index: technique,
            available: config.techniques.len(),
        })?;

    let mut rng = get_rng(seed);
    if rng.gen::<f64>() < config.passthrough_prob {
        trace!(technique = %chosen, "passthrough");
        return Ok(sample);
    }

    let technique_seed: u64 = rng.gen();
    trace!(technique = %chosen, seed = technique_seed, "applying augmentation");
    chosen.apply(&sample, config, Some(technique_seed))
}
