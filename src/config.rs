//! Augmentation parameters.
//!
//! [`AugmentConfig`] gathers every tunable of the combiner and batch driver.
//! Defaults reproduce the standard training setup: six techniques, half of
//! each batch left untouched, eight workers.

use crate::error::{Error, Result};
use crate::transforms::affine::{DEFAULT_MAX_ANGLE, DEFAULT_SHIFT_STDS};
use crate::transforms::augment::{Technique, DEFAULT_TECHNIQUES};
use crate::transforms::intensity::{DEFAULT_GAIN_RANGE, DEFAULT_GAMMA_RANGE};
use crate::transforms::warp::{
    DEFAULT_ELASTIC_POINTS, DEFAULT_ELASTIC_SIGMA, DEFAULT_SWIRL_RADIUS,
    DEFAULT_SWIRL_STRENGTH_STD,
};

/// Default number of batch workers.
pub const DEFAULT_WORKERS: usize = 8;

/// Default probability that the combiner leaves a sample unchanged.
pub const DEFAULT_PASSTHROUGH_PROB: f64 = 0.5;

/// Builder for augmentation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentConfig {
    pub(crate) techniques: Vec<Technique>,
    pub(crate) passthrough_prob: f64,
    pub(crate) workers: usize,
    pub(crate) shift_stds: [f64; 3],
    pub(crate) max_rotation: f64,
    pub(crate) rotate_about_center: bool,
    pub(crate) swirl_radius: f64,
    pub(crate) swirl_strength_std: f64,
    pub(crate) gain_range: (f32, f32),
    pub(crate) gamma_range: (f32, f32),
    pub(crate) elastic_sigma: f64,
    pub(crate) elastic_points: usize,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AugmentConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            techniques: DEFAULT_TECHNIQUES.to_vec(),
            passthrough_prob: DEFAULT_PASSTHROUGH_PROB,
            workers: DEFAULT_WORKERS,
            shift_stds: DEFAULT_SHIFT_STDS,
            max_rotation: DEFAULT_MAX_ANGLE,
            rotate_about_center: false,
            swirl_radius: DEFAULT_SWIRL_RADIUS,
            swirl_strength_std: DEFAULT_SWIRL_STRENGTH_STD,
            gain_range: DEFAULT_GAIN_RANGE,
            gamma_range: DEFAULT_GAMMA_RANGE,
            elastic_sigma: DEFAULT_ELASTIC_SIGMA,
            elastic_points: DEFAULT_ELASTIC_POINTS,
        }
    }

    /// Replace the technique list. Decision `i` selects `techniques[i]`.
    pub fn techniques(mut self, techniques: &[Technique]) -> Self {
        self.techniques = techniques.to_vec();
        self
    }

    /// Use the first `n` techniques in canonical order.
    pub fn technique_count(mut self, n: usize) -> Self {
        self.techniques = Technique::ALL.iter().copied().take(n).collect();
        self
    }

    /// Append a technique to the list.
    pub fn with_technique(mut self, technique: Technique) -> Self {
        self.techniques.push(technique);
        self
    }

    /// Set the probability of leaving a sample unchanged.
    pub fn passthrough_prob(mut self, prob: f64) -> Self {
        self.passthrough_prob = prob;
        self
    }

    /// Set the number of batch workers.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set per-axis shift standard deviations in voxels.
    pub fn shift_stds(mut self, stds: [f64; 3]) -> Self {
        self.shift_stds = stds;
        self
    }

    /// Set the upper bound of each rotation angle in radians.
    pub fn max_rotation(mut self, radians: f64) -> Self {
        self.max_rotation = radians;
        self
    }

    /// Rotate about the volume centre instead of voxel (0, 0, 0).
    pub fn rotate_about_center(mut self, enabled: bool) -> Self {
        self.rotate_about_center = enabled;
        self
    }

    /// Set the swirl radius in voxels.
    pub fn swirl_radius(mut self, radius: f64) -> Self {
        self.swirl_radius = radius;
        self
    }

    /// Set the swirl strength standard deviation.
    pub fn swirl_strength_std(mut self, std: f64) -> Self {
        self.swirl_strength_std = std;
        self
    }

    /// Set the brightness gain range.
    pub fn gain_range(mut self, min: f32, max: f32) -> Self {
        self.gain_range = (min, max);
        self
    }

    /// Set the brightness gamma range.
    pub fn gamma_range(mut self, min: f32, max: f32) -> Self {
        self.gamma_range = (min, max);
        self
    }

    /// Set the elastic control-point displacement deviation.
    pub fn elastic_sigma(mut self, sigma: f64) -> Self {
        self.elastic_sigma = sigma;
        self
    }

    /// Set the number of elastic control points per axis.
    pub fn elastic_points(mut self, points: usize) -> Self {
        self.elastic_points = points;
        self
    }

    /// Enabled techniques, in decision order.
    pub fn technique_list(&self) -> &[Technique] {
        &self.techniques
    }

    /// Number of batch workers.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        if self.techniques.is_empty() {
            return Err(Error::Configuration(
                "at least one technique must be enabled".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.passthrough_prob) {
            return Err(Error::Configuration(format!(
                "passthrough probability must be between 0.0 and 1.0 (got {})",
                self.passthrough_prob
            )));
        }
        if self.workers == 0 {
            return Err(Error::Configuration("workers must be positive".into()));
        }
        let deviations = [
            ("shift std", self.shift_stds[0]),
            ("shift std", self.shift_stds[1]),
            ("shift std", self.shift_stds[2]),
            ("max rotation", self.max_rotation),
            ("swirl strength std", self.swirl_strength_std),
            ("elastic sigma", self.elastic_sigma),
        ];
        for (name, value) in deviations {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Configuration(format!(
                    "{} must be non-negative and finite (got {})",
                    name, value
                )));
            }
        }
        if !(self.swirl_radius.is_finite() && self.swirl_radius > 0.0) {
            return Err(Error::Configuration(format!(
                "swirl radius must be positive and finite (got {})",
                self.swirl_radius
            )));
        }
        for (name, (min, max)) in [("gain", self.gain_range), ("gamma", self.gamma_range)] {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(Error::Configuration(format!(
                    "{} range must be finite and ordered (got {} to {})",
                    name, min, max
                )));
            }
        }
        if self.elastic_points < 2 {
            return Err(Error::Configuration(format!(
                "elastic grid needs at least 2 points per axis (got {})",
                self.elastic_points
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AugmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.technique_list().len(), 6);
        assert_eq!(config.worker_count(), 8);
        assert_eq!(config.shift_stds, [20.0; 3]);
        assert_eq!(config.swirl_radius, 100.0);
        assert_eq!(config.gain_range, (0.8, 1.2));
        assert_eq!(config.elastic_sigma, 2.0);
    }

    #[test]
    fn test_technique_count_and_append() {
        let config = AugmentConfig::new().technique_count(8);
        assert_eq!(config.technique_list(), &Technique::ALL);

        let config = AugmentConfig::new().with_technique(Technique::TumorRemoval);
        assert_eq!(config.technique_list()[6], Technique::TumorRemoval);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AugmentConfig::new().techniques(&[]).validate().is_err());
        assert!(AugmentConfig::new().passthrough_prob(1.5).validate().is_err());
        assert!(AugmentConfig::new().workers(0).validate().is_err());
        assert!(AugmentConfig::new()
            .shift_stds([1.0, -1.0, 1.0])
            .validate()
            .is_err());
        assert!(AugmentConfig::new().swirl_radius(0.0).validate().is_err());
        assert!(AugmentConfig::new().gain_range(1.2, 0.8).validate().is_err());
        assert!(AugmentConfig::new()
            .elastic_sigma(f64::NAN)
            .validate()
            .is_err());
        assert!(AugmentConfig::new().elastic_points(1).validate().is_err());
    }
}
