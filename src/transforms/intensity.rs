//! Intensity-only transforms: power-law brightness and tumour removal.

use crate::error::{Error, Result};
use crate::rng::get_rng;
use crate::sample::Sample;
use ndarray::{Axis, Zip};
use rand::Rng;

/// Default range for the per-channel gain.
pub const DEFAULT_GAIN_RANGE: (f32, f32) = (0.8, 1.2);

/// Default range for the per-channel gamma.
pub const DEFAULT_GAMMA_RANGE: (f32, f32) = (0.8, 1.2);

/// Per-channel parameters of the power-law mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLaw {
    /// Multiplicative gain.
    pub gain: f32,
    /// Exponent applied to the absolute intensity.
    pub gamma: f32,
}

impl PowerLaw {
    /// The mapping that leaves intensities unchanged.
    pub const IDENTITY: Self = Self {
        gain: 1.0,
        gamma: 1.0,
    };

    fn apply(self, v: f32) -> f32 {
        v.signum() * self.gain * v.abs().powf(self.gamma)
    }
}

/// Map every channel through `sign(x) · gain · |x|^gamma`.
///
/// `params` holds one entry per channel. The label is returned unchanged.
#[must_use = "this function returns a Result and does not modify the original"]
pub fn brightness(sample: &Sample, params: &[PowerLaw]) -> Result<Sample> {
    if params.len() != sample.channels() {
        return Err(Error::ShapeMismatch(format!(
            "brightness: {} parameter sets for {} channels",
            params.len(),
            sample.channels()
        )));
    }
    if params
        .iter()
        .any(|p| !(p.gain.is_finite() && p.gamma.is_finite()))
    {
        return Err(Error::transform(
            "brightness",
            "gain and gamma must be finite",
        ));
    }

    let mut image = sample.image().clone();
    for (mut channel, &p) in image.axis_iter_mut(Axis(3)).zip(params) {
        channel.par_mapv_inplace(|v| p.apply(v));
    }
    Ok(Sample::from_parts(image, sample.label().clone()))
}

/// Brightness change with gain and gamma drawn uniformly per channel.
///
/// # Arguments
///
/// * `sample` - Input image/label pair
/// * `gain_range` - Range for the gain (default: (0.8, 1.2))
/// * `gamma_range` - Range for the gamma (default: (0.8, 1.2))
/// * `seed` - Optional random seed for reproducibility
#[must_use = "this function returns a Result and does not modify the original"]
pub fn random_brightness(
    sample: &Sample,
    gain_range: Option<(f32, f32)>,
    gamma_range: Option<(f32, f32)>,
    seed: Option<u64>,
) -> Result<Sample> {
    let (gain_min, gain_max) = gain_range.unwrap_or(DEFAULT_GAIN_RANGE);
    let (gamma_min, gamma_max) = gamma_range.unwrap_or(DEFAULT_GAMMA_RANGE);
    for (name, min, max) in [("gain", gain_min, gain_max), ("gamma", gamma_min, gamma_max)] {
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(Error::Configuration(format!(
                "brightness {} range must be finite and ordered (got {} to {})",
                name, min, max
            )));
        }
    }

    let mut rng = get_rng(seed);
    let params: Vec<PowerLaw> = (0..sample.channels())
        .map(|_| PowerLaw {
            gain: rng.gen_range(gain_min..=gain_max),
            gamma: rng.gen_range(gamma_min..=gamma_max),
        })
        .collect();
    brightness(sample, &params)
}

/// Erase the tumour: zero the image wherever the label is nonzero, then clear
/// the label.
///
/// Produces "healthy" training examples from annotated ones.
#[must_use = "this function returns a new sample and does not modify the original"]
pub fn remove_tumor(sample: &Sample) -> Sample {
    let label = sample.label();
    let mut image = sample.image().clone();
    for mut channel in image.axis_iter_mut(Axis(3)) {
        Zip::from(&mut channel).and(label).for_each(|v, &l| {
            if l != 0 {
                *v = 0.0;
            }
        });
    }
    Sample::from_parts(image, ndarray::Array3::zeros(label.raw_dim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    fn create_test_sample() -> Sample {
        let image = Array4::from_shape_fn((4, 4, 4, 3), |(i, j, k, c)| {
            (i as f32 - 1.5) * (j as f32 + 0.5) - k as f32 * 0.25 + c as f32
        });
        let label = Array3::from_shape_fn((4, 4, 4), |(i, j, k)| {
            if i >= 2 && j >= 1 {
                ((i + j + k) % 3 + 1) as u8
            } else {
                0
            }
        });
        Sample::new(image, label).unwrap()
    }

    #[test]
    fn test_brightness_identity() {
        let sample = create_test_sample();
        let out = brightness(&sample, &[PowerLaw::IDENTITY; 3]).unwrap();
        assert_eq!(out, sample);
    }

    #[test]
    fn test_brightness_formula_and_sign() {
        let sample = create_test_sample();
        let p = PowerLaw {
            gain: 1.1,
            gamma: 0.9,
        };
        let out = brightness(&sample, &[p; 3]).unwrap();
        for (&a, &b) in sample.image().iter().zip(out.image().iter()) {
            let expected = a.signum() * 1.1 * a.abs().powf(0.9);
            assert!((b - expected).abs() < 1e-5);
            if a != 0.0 {
                assert_eq!(a.signum(), b.signum());
            }
        }
    }

    #[test]
    fn test_brightness_channel_count_mismatch() {
        let sample = create_test_sample();
        let err = brightness(&sample, &[PowerLaw::IDENTITY; 2]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_random_brightness_keeps_label() {
        let sample = create_test_sample();
        let out = random_brightness(&sample, None, None, Some(42)).unwrap();
        assert_eq!(out.label(), sample.label());
        assert_eq!(out.image().shape(), sample.image().shape());
        assert_ne!(out.image(), sample.image());
    }

    #[test]
    fn test_random_brightness_degenerate_range_is_identity() {
        let sample = create_test_sample();
        let out = random_brightness(&sample, Some((1.0, 1.0)), Some((1.0, 1.0)), Some(1)).unwrap();
        assert_eq!(out, sample);
    }

    #[test]
    fn test_random_brightness_rejects_inverted_range() {
        let sample = create_test_sample();
        assert!(random_brightness(&sample, Some((1.2, 0.8)), None, Some(1)).is_err());
    }

    #[test]
    fn test_random_brightness_rejects_non_finite_range() {
        let sample = create_test_sample();
        let ranges = [
            (Some((f32::NAN, 1.0)), None),
            (None, Some((0.8, f32::INFINITY))),
            (Some((f32::NEG_INFINITY, 1.0)), None),
        ];
        for (gain, gamma) in ranges {
            let err = random_brightness(&sample, gain, gamma, Some(1)).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)));
        }
    }

    #[test]
    fn test_remove_tumor() {
        let sample = create_test_sample();
        let out = remove_tumor(&sample);
        assert!(out.label().iter().all(|&l| l == 0));
        for ((i, j, k, c), &v) in out.image().indexed_iter() {
            if sample.label()[[i, j, k]] != 0 {
                assert_eq!(v, 0.0);
            } else {
                assert_eq!(v, sample.image()[[i, j, k, c]]);
            }
        }
    }
}
