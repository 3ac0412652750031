//! End-to-end tests for the augmentation contract.
//!
//! These exercise the public API the way a training loop does: a BraTS-like
//! batch of multi-channel volumes with sparse tumour labels goes through the
//! combiner and batch driver, and every transform is checked for shape and
//! label integrity.

use ndarray::{Array3, Array4, Array5, Axis};
use volaug::transforms::{self, DisplacementGrid, PowerLaw, SWIRL_PLANES};
use volaug::{aug_batch, aug_samples, combine_aug, AugmentConfig, Error, Sample, Technique};

/// Build a sample with a smooth image and a spherical "tumour" of three classes.
fn create_test_sample(n: usize, channels: usize, offset: f32) -> Sample {
    let center = (n as f32 - 1.0) / 2.0;
    let image = Array4::from_shape_fn((n, n, n, channels), |(i, j, k, c)| {
        let x = i as f32 - center;
        let y = j as f32 - center;
        let z = k as f32 - center;
        (x * 0.3).sin() + (y * 0.2 + 0.4).cos() * 2.0 + z * 0.05 + c as f32 + offset
    });
    let label = Array3::from_shape_fn((n, n, n), |(i, j, k)| {
        let d = ((i as f32 - center).powi(2)
            + (j as f32 - center).powi(2)
            + (k as f32 - center).powi(2))
        .sqrt();
        match d {
            d if d < 2.0 => 3,
            d if d < 3.5 => 2,
            d if d < 5.0 => 1,
            _ => 0,
        }
    });
    Sample::new(image, label).unwrap()
}

fn create_batch(n: usize) -> (Array5<f32>, Array4<u8>) {
    let samples: Vec<Sample> = (0..n)
        .map(|b| create_test_sample(16, 2, b as f32 * 10.0))
        .collect();
    let images: Vec<_> = samples.iter().map(|s| s.image().view()).collect();
    let labels: Vec<_> = samples.iter().map(|s| s.label().view()).collect();
    (
        ndarray::stack(Axis(0), &images).unwrap(),
        ndarray::stack(Axis(0), &labels).unwrap(),
    )
}

fn assert_close(a: &Array4<f32>, b: &Array4<f32>) {
    assert_eq!(a.shape(), b.shape());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() < 1e-4, "{} vs {}", x, y);
    }
}

#[test]
fn test_aug_batch_shapes_for_standard_batch() {
    let (images, labels) = create_batch(4);
    let (out_images, out_labels) =
        aug_batch(images.view(), labels.view(), &AugmentConfig::default(), Some(2024)).unwrap();
    assert_eq!(out_images.shape(), &[4, 16, 16, 16, 2]);
    assert_eq!(out_labels.shape(), &[4, 16, 16, 16]);
}

#[test]
fn test_aug_batch_is_seed_reproducible() {
    let (images, labels) = create_batch(4);
    let config = AugmentConfig::default();
    let a = aug_batch(images.view(), labels.view(), &config, Some(9)).unwrap();
    let b = aug_batch(images.view(), labels.view(), &config, Some(9)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_aug_batch_never_invents_labels() {
    let (images, labels) = create_batch(4);
    let config = AugmentConfig::new().technique_count(8).passthrough_prob(0.0);
    for seed in 0..4 {
        let (_, out_labels) = aug_batch(images.view(), labels.view(), &config, Some(seed)).unwrap();
        assert!(out_labels.iter().all(|&l| l <= 3));
    }
}

#[test]
fn test_aug_samples_preserves_order() {
    let samples: Vec<Sample> = (0..6)
        .map(|b| create_test_sample(8, 1, b as f32 * 100.0))
        .collect();
    // Flips permute voxels, so each output keeps the mean of its own input.
    let config = AugmentConfig::new()
        .techniques(&[Technique::Flip])
        .passthrough_prob(0.0)
        .workers(3);
    let out = aug_samples(samples.clone(), &config, Some(5)).unwrap();
    assert_eq!(out.len(), samples.len());
    for (input, output) in samples.iter().zip(out.iter()) {
        let expected = input.image().mean().unwrap();
        let actual = output.image().mean().unwrap();
        assert!((expected - actual).abs() < 1e-2, "{} vs {}", expected, actual);
    }
}

#[test]
fn test_combine_aug_passthrough_probability() {
    let sample = create_test_sample(8, 2, 1.0);
    let config = AugmentConfig::default();
    let trials = 600u64;
    let unchanged = (0..trials)
        .filter(|&seed| {
            let technique = (seed % 2) as usize; // flip or brightness
            combine_aug(sample.clone(), technique, &config, Some(seed)).unwrap() == sample
        })
        .count();
    let rate = unchanged as f64 / trials as f64;
    assert!((0.42..=0.58).contains(&rate), "passthrough rate {}", rate);
}

#[test]
fn test_combine_aug_unsupported_technique() {
    let sample = create_test_sample(8, 1, 0.0);
    let err = combine_aug(sample, 7, &AugmentConfig::default(), Some(0)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedTechnique { index: 7, .. }));
    assert!(err.to_string().contains("unsupported technique"));
}

#[test]
fn test_every_transform_preserves_spatial_shape() {
    let sample = create_test_sample(12, 3, 0.5);
    let outputs = vec![
        transforms::random_flip(&sample, Some(1)).unwrap(),
        transforms::random_one_class_flip(&sample, Some(1)).unwrap(),
        transforms::random_rotation(&sample, None, false, Some(1)).unwrap(),
        transforms::random_rotation(&sample, None, true, Some(1)).unwrap(),
        transforms::random_shift(&sample, None, Some(1)).unwrap(),
        transforms::random_swirl(&sample, None, None, Some(1)).unwrap(),
        transforms::random_brightness(&sample, None, None, Some(1)).unwrap(),
        transforms::random_elastic(&sample, None, None, Some(1)).unwrap(),
        transforms::remove_tumor(&sample),
    ];
    for out in outputs {
        assert_eq!(out.image().shape(), sample.image().shape());
        assert_eq!(out.label().shape(), sample.label().shape());
        assert_eq!(out.spatial_shape(), sample.spatial_shape());
    }
}

#[test]
fn test_flip_round_trip() {
    let sample = create_test_sample(10, 2, 0.0);
    for axis in 0..3 {
        let twice = transforms::flip(&transforms::flip(&sample, axis).unwrap(), axis).unwrap();
        assert_eq!(twice, sample);
    }
}

#[test]
fn test_one_class_flip_outside_mask_unchanged() {
    // Shift the tumour off-centre so flipping actually moves it.
    let sample = transforms::shift(&create_test_sample(12, 2, 0.0), [3.0, 0.0, 0.0]).unwrap();
    for seed in 0..12 {
        let out = transforms::random_one_class_flip(&sample, Some(seed)).unwrap();
        let changed_classes: Vec<u8> = sample
            .label()
            .iter()
            .zip(out.label().iter())
            .filter(|(a, b)| a != b)
            .map(|(&a, _)| a)
            .collect();
        // Only voxels of a single class may change.
        if let Some(&first) = changed_classes.first() {
            assert!(first != 0);
            assert!(changed_classes.iter().all(|&c| c == first));
        }
    }
}

#[test]
fn test_brightness_identity_and_label() {
    let sample = create_test_sample(8, 3, -1.0);
    let out = transforms::brightness(&sample, &[PowerLaw::IDENTITY; 3]).unwrap();
    assert_eq!(out, sample);

    let out = transforms::random_brightness(&sample, None, None, Some(8)).unwrap();
    assert_eq!(out.label(), sample.label());
}

#[test]
fn test_tumor_removal_contract() {
    let sample = create_test_sample(10, 2, 3.0);
    let out = transforms::remove_tumor(&sample);
    assert!(out.label().iter().all(|&l| l == 0));
    for ((i, j, k, _), &v) in out.image().indexed_iter() {
        if sample.label()[[i, j, k]] != 0 {
            assert_eq!(v, 0.0);
        }
    }
}

#[test]
fn test_zero_magnitude_spatial_transforms_are_identity() {
    let sample = create_test_sample(10, 2, 0.0);

    let rotated = transforms::rotate(&sample, [0.0; 3], false).unwrap();
    assert_eq!(rotated.label(), sample.label());
    assert_close(rotated.image(), sample.image());

    let shifted = transforms::shift(&sample, [0.0; 3]).unwrap();
    assert_eq!(shifted.label(), sample.label());
    assert_close(shifted.image(), sample.image());

    for plane in SWIRL_PLANES {
        let swirled = transforms::swirl(&sample, plane, 0.0, 100.0).unwrap();
        assert_eq!(swirled.label(), sample.label());
        assert_close(swirled.image(), sample.image());
    }

    let grid = DisplacementGrid::zeros(3).unwrap();
    let deformed = transforms::elastic_deform(&sample, &grid).unwrap();
    assert_eq!(deformed, sample);
}

#[test]
fn test_shape_mismatch_rejected_before_dispatch() {
    let images = Array5::<f32>::zeros((2, 8, 8, 8, 2));
    let labels = Array4::<u8>::zeros((2, 8, 8, 7));
    let err = aug_batch(images.view(), labels.view(), &AugmentConfig::default(), None).unwrap_err();
    assert!(matches!(err, Error::ShapeMismatch(_)));

    let err = Sample::new(Array4::zeros((8, 8, 8, 1)), Array3::zeros((8, 8, 9))).unwrap_err();
    assert!(err.to_string().contains("does not match"));
}
