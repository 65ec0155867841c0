/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::{BufRead, Read};

use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::log::{trace, warn};
use zune_core::options::DecoderOptions;

use crate::errors::PfmDecodeErrors;
use crate::header::{parse_dimensions_line, parse_scale_line, PfmEndian, PfmHeader, PfmVersion};
use crate::image::PfmImage;
use crate::transcode::decode_rows;

/// Longest header line we are willing to read
const MAX_HEADER_LINE: usize = 1024;

const INITIAL_PAYLOAD_CAPACITY: usize = 1 << 20;

/// A PFM decoder
///
/// The decoder reads from any buffered reader, e.g a `BufReader<File>`
/// or a `Cursor` over bytes already in memory.
pub struct PfmDecoder<R: BufRead> {
    reader:          R,
    options:         DecoderOptions,
    header:          Option<PfmHeader>,
    header_error:    Option<String>,
    decoded_headers: bool
}

impl<R> PfmDecoder<R>
where
    R: BufRead
{
    /// Create a new PFM decoder with default options
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use zune_pfm::PfmDecoder;
    ///
    /// let mut decoder = PfmDecoder::new(Cursor::new(b"NOT VALID PFM"));
    ///
    /// assert!(decoder.decode().is_err());
    /// ```
    pub fn new(reader: R) -> PfmDecoder<R> {
        Self::new_with_options(reader, DecoderOptions::default())
    }

    /// Create a new PFM decoder with the specified options
    ///
    /// # Arguments
    /// - `reader`: Source of PFM encoded bytes
    /// - `options`: Limits and strictness used while decoding
    ///
    /// # Example
    /// - Refuse images wider than 50 pixels
    /// ```
    /// use std::io::Cursor;
    /// use zune_core::options::DecoderOptions;
    /// use zune_pfm::PfmDecoder;
    ///
    /// let options = DecoderOptions::default().set_max_width(50);
    /// let mut decoder = PfmDecoder::new_with_options(Cursor::new(b"Pf\n100 1\n-1.0\n"), options);
    ///
    /// assert!(decoder.decode_headers().is_err());
    /// ```
    pub fn new_with_options(reader: R, options: DecoderOptions) -> PfmDecoder<R> {
        PfmDecoder {
            reader,
            options,
            header: None,
            header_error: None,
            decoded_headers: false
        }
    }

    /// Decode the three header lines
    ///
    /// The struct is modified in place and header fields can be
    /// read back with the appropriate getters.
    ///
    /// A failed header can't be retried, the reader has already moved past
    /// an unknown number of bytes. Later calls report the first failure.
    pub fn decode_headers(&mut self) -> Result<(), PfmDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        if let Some(err) = &self.header_error {
            return Err(PfmDecodeErrors::InvalidHeader(format!(
                "Header decoding already failed: {err}"
            )));
        }
        self.read_headers().map_err(|err| {
            self.header_error = Some(err.to_string());
            err
        })
    }

    fn read_headers(&mut self) -> Result<(), PfmDecodeErrors> {
        let mut line = Vec::with_capacity(64);

        self.read_header_line(&mut line, "identifier")?;
        let version = PfmVersion::from_line(&line)?;

        self.read_header_line(&mut line, "dimensions")?;
        let (width, height) = parse_dimensions_line(&line)?;

        if width > self.options.get_max_width() {
            return Err(PfmDecodeErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                width
            ));
        }
        if height > self.options.get_max_height() {
            return Err(PfmDecodeErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                height
            ));
        }

        self.read_header_line(&mut line, "scale")?;
        let (scale, endian) = parse_scale_line(&line)?;

        trace!("Version: {version}");
        trace!("Width: {width}");
        trace!("Height: {height}");
        trace!("Scale: {scale}, endian: {endian:?}");

        self.header = Some(PfmHeader {
            version,
            width,
            height,
            scale,
            endian
        });
        self.decoded_headers = true;

        Ok(())
    }

    /// Read a single header line into `line`, without the line terminator
    fn read_header_line(
        &mut self, line: &mut Vec<u8>, name: &'static str
    ) -> Result<(), PfmDecodeErrors> {
        line.clear();

        let limit = u64::try_from(MAX_HEADER_LINE).unwrap_or(u64::MAX);
        let size = (&mut self.reader).take(limit).read_until(b'\n', line)?;

        if line.last() != Some(&b'\n') {
            let msg = if size >= MAX_HEADER_LINE {
                format!("The {name} line is longer than {MAX_HEADER_LINE} bytes")
            } else {
                format!("Unexpected end of file while reading the {name} line")
            };
            return Err(PfmDecodeErrors::InvalidHeader(msg));
        }
        line.pop();

        Ok(())
    }

    /// Get the decoded header or `None` if headers haven't been decoded
    pub const fn header(&self) -> Option<&PfmHeader> {
        self.header.as_ref()
    }

    /// Get image dimensions as a tuple of width and height
    /// or `None` if the image headers haven't been decoded.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.map(|h| (h.width, h.height))
    }

    /// Return the image colorspace, `Luma` for `Pf` and `RGB` for `PF`
    /// images or `None` if headers haven't been decoded
    pub fn colorspace(&self) -> Option<ColorSpace> {
        self.header.map(|h| h.version.colorspace())
    }

    /// Return the bit depth of the image, PFM is always 32-bit float
    /// or `None` if headers haven't been decoded
    pub fn bit_depth(&self) -> Option<BitDepth> {
        self.header.map(|_| BitDepth::Float32)
    }

    /// Return the magnitude of the scale factor found in the header
    ///
    /// The decoder does not apply it to the samples, callers wanting
    /// physical values multiply by it themselves.
    pub fn scale(&self) -> Option<f32> {
        self.header.map(|h| h.scale)
    }

    /// Return the byte order of the pixel data
    pub fn endianness(&self) -> Option<PfmEndian> {
        self.header.map(|h| h.endian)
    }

    /// Return the number of `f32` samples needed to hold the decoded image
    ///
    /// # Returns
    ///  - `Some(usize)`: Minimum size for a buffer needed to decode the image
    ///  - `None`: Indicates the image headers were not decoded or
    ///    `width*height*channels` calculation overflows a usize
    pub fn output_buffer_size(&self) -> Option<usize> {
        let header = self.header?;

        header
            .width
            .checked_mul(header.height)?
            .checked_mul(header.version.num_channels())
    }

    /// Decode into a pre-allocated buffer, rows are returned top to bottom
    ///
    /// It is an error if the buffer size is smaller than
    /// [`output_buffer_size()`](Self::output_buffer_size)
    ///
    /// If the buffer is bigger than expected, the extra samples are left untouched
    ///
    /// # Example
    /// ```
    /// use std::io::Cursor;
    /// use zune_pfm::PfmDecoder;
    ///
    /// let mut file = b"Pf\n1 1\n-1.0\n".to_vec();
    /// file.extend_from_slice(&0.5_f32.to_le_bytes());
    ///
    /// let mut decoder = PfmDecoder::new(Cursor::new(file));
    /// decoder.decode_headers().unwrap();
    ///
    /// let mut out = vec![0.0; decoder.output_buffer_size().unwrap()];
    /// decoder.decode_into(&mut out).unwrap();
    ///
    /// assert_eq!(out, [0.5]);
    /// ```
    pub fn decode_into(&mut self, buffer: &mut [f32]) -> Result<(), PfmDecodeErrors> {
        self.decode_headers()?;

        let output_size = self.checked_output_size()?;

        if buffer.len() < output_size {
            return Err(PfmDecodeErrors::TooSmallOutputArray(
                output_size,
                buffer.len()
            ));
        }
        let payload = self.read_payload()?;

        self.convert_payload(&payload, &mut buffer[..output_size]);

        Ok(())
    }

    fn checked_output_size(&self) -> Result<usize, PfmDecodeErrors> {
        self.output_buffer_size()
            .ok_or(PfmDecodeErrors::TooLargeDimensions(
                "output size",
                usize::MAX,
                0
            ))
    }

    /// Read exactly the number of payload bytes the header declares
    fn read_payload(&mut self) -> Result<Vec<u8>, PfmDecodeErrors> {
        let payload_size = self
            .header
            .and_then(|h| h.payload_size())
            .ok_or(PfmDecodeErrors::TooLargeDimensions(
                "payload size",
                usize::MAX,
                0
            ))?;

        // the header may lie about dimensions, so let the buffer grow
        // with the data actually present instead of trusting it upfront
        let mut payload = Vec::with_capacity(payload_size.min(INITIAL_PAYLOAD_CAPACITY));

        // read one byte past the payload so that trailing data can be detected
        let limit = u64::try_from(payload_size)
            .unwrap_or(u64::MAX)
            .saturating_add(1);

        (&mut self.reader).take(limit).read_to_end(&mut payload)?;

        if payload.len() < payload_size {
            return Err(PfmDecodeErrors::TruncatedData(payload_size, payload.len()));
        }
        if payload.len() > payload_size {
            let extra = payload.len() - payload_size;

            if self.options.get_strict_mode() {
                return Err(PfmDecodeErrors::TrailingData(extra));
            }
            warn!("Ignoring trailing bytes after pixel data");
            payload.truncate(payload_size);
        }
        Ok(payload)
    }

    fn convert_payload(&self, payload: &[u8], output: &mut [f32]) {
        if let Some(header) = self.header {
            let row_stride = header.width * header.version.num_channels();

            decode_rows(payload, header.endian, row_stride, output);
        }
    }

    /// Decode a PFM file returning the image
    ///
    /// The returned image has shape `(height, width)` for `Pf` files and
    /// `(height, width, 3)` for `PF` files.
    ///
    /// # Returns
    /// - `Ok(PfmImage)`: The decoded image
    /// - `Err(PfmDecodeErrors)`: Indicates an unrecoverable
    ///   error occurred during decoding.
    pub fn decode(&mut self) -> Result<PfmImage, PfmDecodeErrors> {
        self.decode_headers()?;

        let size = self.checked_output_size()?;
        // validate the payload before allocating the output
        let payload = self.read_payload()?;

        let mut samples = vec![0.0_f32; size];

        self.convert_payload(&payload, &mut samples);

        let (width, height) = self.dimensions().unwrap_or((0, 0));

        let shape = match self.header.map(|h| h.version) {
            Some(PfmVersion::Color) => vec![height, width, 3],
            _ => vec![height, width]
        };

        Ok(PfmImage::from_parts(shape, samples))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn pfm_file(header: &str, samples: &[f32], endian: PfmEndian) -> Vec<u8> {
        let mut data = header.as_bytes().to_vec();

        for sample in samples {
            match endian {
                PfmEndian::Little => data.extend_from_slice(&sample.to_le_bytes()),
                PfmEndian::Big => data.extend_from_slice(&sample.to_be_bytes())
            }
        }
        data
    }

    #[test]
    fn getters_are_none_before_headers() {
        let decoder = PfmDecoder::new(Cursor::new(b"Pf\n1 1\n1.0\n"));

        assert!(decoder.dimensions().is_none());
        assert!(decoder.colorspace().is_none());
        assert!(decoder.bit_depth().is_none());
        assert!(decoder.scale().is_none());
        assert!(decoder.output_buffer_size().is_none());
    }

    #[test]
    fn header_fields() {
        let file = pfm_file("PF\n4 2\n-2.5\n", &[0.0; 24], PfmEndian::Little);
        let mut decoder = PfmDecoder::new(Cursor::new(file));

        decoder.decode_headers().unwrap();

        assert_eq!(decoder.dimensions(), Some((4, 2)));
        assert_eq!(decoder.colorspace(), Some(ColorSpace::RGB));
        assert_eq!(decoder.bit_depth(), Some(BitDepth::Float32));
        assert_eq!(decoder.scale(), Some(2.5));
        assert_eq!(decoder.endianness(), Some(PfmEndian::Little));
        assert_eq!(decoder.output_buffer_size(), Some(24));
    }

    #[test]
    fn big_and_little_endian_files_agree() {
        let samples = [0.0_f32, 1.0, 2.0, 3.0, 4.0, 5.0];

        let little = pfm_file("Pf\n3 2\n-1.0\n", &samples, PfmEndian::Little);
        let big = pfm_file("Pf\n3 2\n1.0\n", &samples, PfmEndian::Big);

        let little = PfmDecoder::new(Cursor::new(little)).decode().unwrap();
        let big = PfmDecoder::new(Cursor::new(big)).decode().unwrap();

        assert_eq!(little, big);
        assert_eq!(little.shape(), [2, 3]);
        // bottom row comes first in the file
        assert_eq!(little.as_f32().unwrap(), [3.0, 4.0, 5.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn color_images_have_three_axes() {
        let file = pfm_file("PF\n2 1\n-1.0\n", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], PfmEndian::Little);
        let image = PfmDecoder::new(Cursor::new(file)).decode().unwrap();

        assert_eq!(image.shape(), [1, 2, 3]);
        assert_eq!(image.get(0, 1, 0), Some(4.0));
    }

    #[test]
    fn crlf_header_lines_are_accepted() {
        let file = pfm_file("Pf\r\n1 1\r\n-1.0\r\n", &[7.0], PfmEndian::Little);
        let image = PfmDecoder::new(Cursor::new(file)).decode().unwrap();

        assert_eq!(image.as_f32().unwrap(), [7.0]);
    }

    #[test]
    fn truncated_payload() {
        let mut file = pfm_file("Pf\n2 2\n-1.0\n", &[1.0; 4], PfmEndian::Little);
        file.truncate(file.len() - 3);

        let err = PfmDecoder::new(Cursor::new(file)).decode().unwrap_err();

        assert!(matches!(err, PfmDecodeErrors::TruncatedData(16, 13)));
    }

    #[test]
    fn trailing_data_depends_on_strict_mode() {
        let mut file = pfm_file("Pf\n1 1\n-1.0\n", &[1.0], PfmEndian::Little);
        file.extend_from_slice(b"garbage");

        let image = PfmDecoder::new(Cursor::new(file.clone())).decode().unwrap();
        assert_eq!(image.as_f32().unwrap(), [1.0]);

        let options = DecoderOptions::default().set_strict_mode(true);
        let err = PfmDecoder::new_with_options(Cursor::new(file), options)
            .decode()
            .unwrap_err();
        assert!(matches!(err, PfmDecodeErrors::TrailingData(1)));
    }

    #[test]
    fn early_end_of_header() {
        let err = PfmDecoder::new(Cursor::new(b"Pf\n1 1")).decode().unwrap_err();
        assert!(matches!(err, PfmDecodeErrors::InvalidHeader(_)));

        let err = PfmDecoder::new(Cursor::new(b"")).decode().unwrap_err();
        assert!(matches!(err, PfmDecodeErrors::InvalidHeader(_)));
    }

    #[test]
    fn overlong_header_line() {
        let mut file = b"Pf\n".to_vec();
        file.extend(core::iter::repeat(b'1').take(MAX_HEADER_LINE + 10));

        let err = PfmDecoder::new(Cursor::new(file)).decode().unwrap_err();
        assert!(matches!(err, PfmDecodeErrors::InvalidHeader(_)));
    }

    #[test]
    fn dimension_limits() {
        let options = DecoderOptions::default().set_max_height(10);
        let mut decoder =
            PfmDecoder::new_with_options(Cursor::new(b"Pf\n1 11\n-1.0\n"), options);

        let err = decoder.decode_headers().unwrap_err();
        assert!(matches!(
            err,
            PfmDecodeErrors::TooLargeDimensions("height", 10, 11)
        ));
    }

    #[test]
    fn small_output_buffer() {
        let file = pfm_file("Pf\n2 2\n-1.0\n", &[1.0; 4], PfmEndian::Little);
        let mut decoder = PfmDecoder::new(Cursor::new(file));
        let mut out = [0.0; 3];

        let err = decoder.decode_into(&mut out).unwrap_err();
        assert!(matches!(err, PfmDecodeErrors::TooSmallOutputArray(4, 3)));
    }

    #[test]
    fn zero_scale_in_file() {
        let file = pfm_file("Pf\n1 1\n0.0\n", &[1.0], PfmEndian::Little);
        let err = PfmDecoder::new(Cursor::new(file)).decode().unwrap_err();

        assert!(matches!(err, PfmDecodeErrors::InvalidScale(_)));
    }

    #[test]
    fn tiny_negative_scale_reads_little_endian() {
        let file = pfm_file("Pf\n1 1\n-1e-50\n", &[3.5], PfmEndian::Little);
        let mut decoder = PfmDecoder::new(Cursor::new(file));

        let image = decoder.decode().unwrap();

        assert_eq!(decoder.endianness(), Some(PfmEndian::Little));
        assert!(decoder.scale().unwrap() > 0.0);
        assert_eq!(image.as_f32().unwrap(), [3.5]);
    }

    #[test]
    fn failed_headers_are_not_reparsed() {
        let options = DecoderOptions::default().set_max_width(2);
        let file = pfm_file("Pf\n3 1\n-1.0\n", &[1.0; 3], PfmEndian::Little);
        let mut decoder = PfmDecoder::new_with_options(Cursor::new(file), options);

        let first = decoder.decode_headers().unwrap_err();
        assert!(matches!(first, PfmDecodeErrors::TooLargeDimensions("width", 2, 3)));

        // the reader sits past the dimensions line, retrying must not parse
        // the scale line as an identifier
        let second = decoder.decode().unwrap_err();
        match second {
            PfmDecodeErrors::InvalidHeader(msg) => assert!(msg.contains(&first.to_string())),
            err => panic!("unexpected error {err:?}")
        }
        assert!(decoder.header().is_none());
    }
}
