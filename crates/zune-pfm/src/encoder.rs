/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PFM encoder

use std::io::Write;

use zune_core::log::trace;

use crate::errors::PfmEncodeErrors;
use crate::header::PfmHeader;
use crate::image::PfmImage;
use crate::transcode::encode_rows;

/// A simple PFM encoder
///
/// Data is written in the byte order of the machine running the encoder,
/// the sign of the stored scale records that order.
pub struct PfmEncoder<'a> {
    image: &'a PfmImage,
    scale: f32
}

impl<'a> PfmEncoder<'a> {
    /// Create a new PFM encoder context that can encode
    /// the provided image with a scale of `1.0`
    pub fn new(image: &'a PfmImage) -> PfmEncoder<'a> {
        Self { image, scale: 1.0 }
    }

    /// Set the scale factor stored in the header
    ///
    /// Only the magnitude is used, the sign is chosen by the encoder
    /// to match the native byte order.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Validate the image and scale, returning the header that would
    /// be written
    ///
    /// # Errors
    /// See [`PfmHeader::from_image`]
    pub fn header(&self) -> Result<PfmHeader, PfmEncodeErrors> {
        PfmHeader::from_image(self.image, self.scale)
    }

    /// Number of bytes the encoded file will occupy
    ///
    /// Returns `None` if the image can't be encoded
    pub fn expected_buffer_size(&self) -> Option<usize> {
        let header = self.header().ok()?;

        header.payload_size()?.checked_add(header.to_bytes().len())
    }

    /// Encode into a sink
    ///
    /// # Returns
    /// - Ok(usize): The number of bytes written into out
    /// - Err(PfmEncodeErrors): An error if something occurred
    ///
    /// # Examples
    /// - Encode a black image of 10x10 into memory
    ///```
    /// use zune_pfm::{PfmEncoder, PfmImage};
    ///
    /// let image = PfmImage::from_f32(&[10, 10, 3], vec![0.0; 300]).unwrap();
    /// let encoder = PfmEncoder::new(&image);
    ///
    /// let mut output = Vec::with_capacity(encoder.expected_buffer_size().unwrap());
    /// let size = encoder.encode(&mut output).unwrap();
    ///
    /// assert_eq!(size, output.len());
    ///```
    pub fn encode<W: Write>(&self, mut out: W) -> Result<usize, PfmEncodeErrors> {
        let header = self.header()?;

        let samples = self
            .image
            .as_f32()
            .ok_or(PfmEncodeErrors::InvalidDataType(self.image.data().type_name()))?;

        let headers = header.to_bytes();

        trace!(
            "Writing {} image {}x{} with scale {}",
            header.version,
            header.width,
            header.height,
            header.signed_scale()
        );

        out.write_all(&headers)?;

        let row_stride = header.width * header.version.num_channels();
        let written = encode_rows(samples, row_stride, &mut out)?;

        Ok(headers.len() + written)
    }
}
