//! Paired image/label volumes.
//!
//! A [`Sample`] owns a multi-channel image laid out as (depth, height, width,
//! channel) and an integer label map laid out as (depth, height, width). The
//! constructor guarantees that both share the same spatial extent, which every
//! transform in this crate relies on.

use crate::error::{Error, Result};
use ndarray::{Array3, Array4, ArrayView3, ArrayView4, Axis};

/// Number of spatial axes in a volume.
pub const SPATIAL_AXES: usize = 3;

/// A co-registered image and segmentation label map.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    image: Array4<f32>,
    label: Array3<u8>,
}

impl Sample {
    /// Create a sample, checking that image and label share spatial dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the image has no channels or any
    /// spatial axis is empty, and [`Error::ShapeMismatch`] if the spatial shape
    /// of the image differs from the label shape.
    pub fn new(image: Array4<f32>, label: Array3<u8>) -> Result<Self> {
        validate_pair(image.view(), label.view())?;
        Ok(Self { image, label })
    }

    /// Build a sample from parts already known to be consistent.
    pub(crate) fn from_parts(image: Array4<f32>, label: Array3<u8>) -> Self {
        debug_assert_eq!(&image.shape()[..SPATIAL_AXES], label.shape());
        Self { image, label }
    }

    /// Image volume (depth, height, width, channel).
    pub fn image(&self) -> &Array4<f32> {
        &self.image
    }

    /// Label volume (depth, height, width).
    pub fn label(&self) -> &Array3<u8> {
        &self.label
    }

    /// Consume the sample and return `(image, label)`.
    pub fn into_parts(self) -> (Array4<f32>, Array3<u8>) {
        (self.image, self.label)
    }

    /// Spatial shape shared by image and label.
    pub fn spatial_shape(&self) -> [usize; 3] {
        let (d, h, w) = self.label.dim();
        [d, h, w]
    }

    /// Number of image channels.
    pub fn channels(&self) -> usize {
        self.image.len_of(Axis(3))
    }

    /// View of a single image channel.
    pub fn channel(&self, c: usize) -> ArrayView3<'_, f32> {
        self.image.index_axis(Axis(3), c)
    }

    /// Apply `f` to every image channel and reassemble a 4-D image.
    pub(crate) fn map_channels<F>(&self, mut f: F) -> Result<Array4<f32>>
    where
        F: FnMut(usize, ArrayView3<'_, f32>) -> Result<Array3<f32>>,
    {
        let mut out = Array4::<f32>::zeros(self.image.raw_dim());
        for c in 0..self.channels() {
            let channel = f(c, self.channel(c))?;
            if channel.shape() != &out.shape()[..SPATIAL_AXES] {
                return Err(Error::ShapeMismatch(format!(
                    "channel {} produced shape {:?}, expected {:?}",
                    c,
                    channel.shape(),
                    &out.shape()[..SPATIAL_AXES]
                )));
            }
            out.index_axis_mut(Axis(3), c).assign(&channel);
        }
        Ok(out)
    }
}

/// Check that an image/label pair is well formed.
pub fn validate_pair(image: ArrayView4<'_, f32>, label: ArrayView3<'_, u8>) -> Result<()> {
    let shape = image.shape();
    if shape[3] == 0 {
        return Err(Error::InvalidDimensions(
            "image must have at least one channel".into(),
        ));
    }
    if let Some(axis) = shape[..SPATIAL_AXES].iter().position(|&n| n == 0) {
        return Err(Error::InvalidDimensions(format!(
            "image spatial axis {} is empty (shape {:?})",
            axis, shape
        )));
    }
    if &shape[..SPATIAL_AXES] != label.shape() {
        return Err(Error::ShapeMismatch(format!(
            "image spatial shape {:?} does not match label shape {:?}",
            &shape[..SPATIAL_AXES],
            label.shape()
        )));
    }
    Ok(())
}

/// Check that `axis` names a spatial axis.
pub(crate) fn check_axis(axis: usize, operation: &str) -> Result<()> {
    if axis >= SPATIAL_AXES {
        return Err(Error::InvalidDimensions(format!(
            "{}: axis {} is out of range (must be 0, 1, or 2)",
            operation, axis
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_matching_shapes() {
        let sample = Sample::new(Array4::zeros((4, 5, 6, 2)), Array3::zeros((4, 5, 6))).unwrap();
        assert_eq!(sample.spatial_shape(), [4, 5, 6]);
        assert_eq!(sample.channels(), 2);
    }

    #[test]
    fn test_new_rejects_mismatch() {
        let err = Sample::new(Array4::zeros((4, 5, 6, 2)), Array3::zeros((4, 6, 5))).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_new_rejects_empty_axes() {
        let err = Sample::new(Array4::zeros((4, 4, 4, 0)), Array3::zeros((4, 4, 4))).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions(_)));

        let err = Sample::new(Array4::zeros((0, 4, 4, 1)), Array3::zeros((0, 4, 4))).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions(_)));
    }

    #[test]
    fn test_map_channels_keeps_order() {
        let mut image = Array4::<f32>::zeros((2, 2, 2, 3));
        for c in 0..3 {
            image.index_axis_mut(Axis(3), c).fill(c as f32);
        }
        let sample = Sample::new(image, Array3::zeros((2, 2, 2))).unwrap();
        let doubled = sample.map_channels(|_, ch| Ok(ch.mapv(|v| v * 2.0))).unwrap();
        for c in 0..3 {
            assert!(doubled
                .index_axis(Axis(3), c)
                .iter()
                .all(|&v| v == 2.0 * c as f32));
        }
    }

    #[test]
    fn test_check_axis() {
        assert!(check_axis(2, "flip").is_ok());
        assert!(check_axis(3, "flip").is_err());
    }
}
