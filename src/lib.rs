//! # volaug
//!
//! Randomized augmentation for paired 3D medical volumes and segmentation
//! label maps.
//!
//! A [`Sample`] holds a multi-channel image (depth, height, width, channel)
//! and a co-registered label map (depth, height, width). Transforms move both
//! through the same spatial mapping, interpolating image channels smoothly and
//! labels by nearest neighbour.
//!
//! ## Batch augmentation
//!
//! ```ignore
//! use volaug::{aug_batch, AugmentConfig};
//!
//! let config = AugmentConfig::default();
//! let (images, labels) = aug_batch(images.view(), labels.view(), &config, Some(42))?;
//! ```
//!
//! ## Single transforms
//!
//! ```ignore
//! use volaug::{transforms, Sample};
//!
//! let sample = Sample::new(image, label)?;
//! let rotated = transforms::random_rotation(&sample, None, false, Some(7))?;
//! let flipped = transforms::flip(&sample, 2)?;
//! ```

#![deny(unsafe_code)]

pub mod batch;
pub mod config;
pub mod error;
pub mod rng;
pub mod sample;
pub mod transforms;

#[cfg(feature = "python")]
pub mod python;

pub use batch::{aug_batch, aug_samples};
pub use config::AugmentConfig;
pub use error::{Error, Result};
pub use sample::Sample;
pub use transforms::{combine_aug, random_decisions, Technique};
