/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! In-memory image representation
//!
//! An image is a dense, row-major array described by a shape and
//! a flat sample buffer. The element type is tracked at runtime so
//! that callers can hand any array to the encoder and get a proper error
//! back instead of a silent conversion.

use crate::errors::PfmEncodeErrors;
use crate::shape::channels_for_shape;

/// Flat storage for image samples
///
/// PFM only stores [`f32`] samples, the remaining variants exist so
/// that arrays of other element types can be represented and rejected
/// by the encoder.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>)
}

impl PixelData {
    /// Number of samples stored
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(data) => data.len(),
            PixelData::U16(data) => data.len(),
            PixelData::F32(data) => data.len(),
            PixelData::F64(data) => data.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of a single sample in bytes
    pub const fn size_of(&self) -> usize {
        match self {
            PixelData::U8(_) => core::mem::size_of::<u8>(),
            PixelData::U16(_) => core::mem::size_of::<u16>(),
            PixelData::F32(_) => core::mem::size_of::<f32>(),
            PixelData::F64(_) => core::mem::size_of::<f64>()
        }
    }

    /// Name of the sample type, used in error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            PixelData::U8(_) => "u8",
            PixelData::U16(_) => "u16",
            PixelData::F32(_) => "f32",
            PixelData::F64(_) => "f64"
        }
    }

    /// Return the samples if they are 32-bit floats
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            PixelData::F32(data) => Some(data),
            _ => None
        }
    }
}

/// A dense image array
///
/// The shape follows the `(height, width[, channels])` convention,
/// samples are stored row by row with channels interleaved per pixel.
///
/// # Example
/// ```
/// use zune_pfm::PfmImage;
///
/// // a 2x3 grayscale image
/// let image = PfmImage::from_f32(&[2, 3], vec![0.0, 0.1, 0.2, 1.0, 1.1, 1.2]).unwrap();
///
/// assert_eq!(image.dimensions(), Some((3, 2)));
/// assert_eq!(image.channels(), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PfmImage {
    shape: Vec<usize>,
    data:  PixelData
}

impl PfmImage {
    /// Create a new image from a shape and its samples
    ///
    /// # Errors
    /// If the number of samples does not match the product of `shape`
    pub fn new(shape: &[usize], data: PixelData) -> Result<PfmImage, PfmEncodeErrors> {
        let expected = shape
            .iter()
            .try_fold(1_usize, |acc, dim| acc.checked_mul(*dim))
            .ok_or(PfmEncodeErrors::Static("overflow detected"))?;

        if expected != data.len() {
            return Err(PfmEncodeErrors::WrongInputSize(expected, data.len()));
        }
        Ok(PfmImage {
            shape: shape.to_vec(),
            data
        })
    }

    /// Create a new image holding 32-bit float samples
    pub fn from_f32(shape: &[usize], data: Vec<f32>) -> Result<PfmImage, PfmEncodeErrors> {
        Self::new(shape, PixelData::F32(data))
    }

    /// Construct from parts already known to agree, used by the decoder
    pub(crate) fn from_parts(shape: Vec<usize>, data: Vec<f32>) -> PfmImage {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());

        PfmImage {
            shape,
            data: PixelData::F32(data)
        }
    }

    /// Array shape, `(height, width)` or `(height, width, channels)`
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Raw samples
    pub const fn data(&self) -> &PixelData {
        &self.data
    }

    /// Samples as 32-bit floats or `None` if the image stores
    /// a different type
    pub fn as_f32(&self) -> Option<&[f32]> {
        self.data.as_f32()
    }

    /// Consume the image returning its float samples
    ///
    /// Returns `None` if the image stores a different type
    pub fn into_f32(self) -> Option<Vec<f32>> {
        match self.data {
            PixelData::F32(data) => Some(data),
            _ => None
        }
    }

    /// Number of channels or `None` if the shape is not a valid
    /// PFM shape
    pub fn channels(&self) -> Option<usize> {
        channels_for_shape(&self.shape)
    }

    /// Image width and height or `None` if the shape is not a
    /// valid PFM shape
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.channels()?;
        Some((self.shape[1], self.shape[0]))
    }

    /// Read a single sample, returning `None` for out of bounds
    /// coordinates or non-float images
    pub fn get(&self, row: usize, column: usize, channel: usize) -> Option<f32> {
        let (width, height) = self.dimensions()?;
        let channels = self.channels()?;

        if row >= height || column >= width || channel >= channels {
            return None;
        }
        let index = (row * width + column) * channels + channel;

        self.as_f32()?.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_length_is_rejected() {
        let err = PfmImage::from_f32(&[2, 2], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, PfmEncodeErrors::WrongInputSize(4, 3)));
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let err = PfmImage::from_f32(&[usize::MAX, 2], vec![]).unwrap_err();
        assert!(matches!(err, PfmEncodeErrors::Static(_)));
    }

    #[test]
    fn get_reads_interleaved_samples() {
        let data: Vec<f32> = (0..12).map(|x| x as f32).collect();
        let image = PfmImage::from_f32(&[2, 2, 3], data).unwrap();

        assert_eq!(image.get(0, 0, 0), Some(0.0));
        assert_eq!(image.get(0, 1, 2), Some(5.0));
        assert_eq!(image.get(1, 0, 1), Some(7.0));
        assert_eq!(image.get(2, 0, 0), None);
        assert_eq!(image.get(0, 0, 3), None);
    }

    #[test]
    fn non_float_images_report_their_type() {
        let image = PfmImage::new(&[2, 2], PixelData::F64(vec![1.0; 4])).unwrap();

        assert_eq!(image.as_f32(), None);
        assert_eq!(image.data().type_name(), "f64");
        assert_eq!(image.data().size_of(), 8);
        assert_eq!(image.dimensions(), Some((2, 2)));
    }
}
