/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PFM header parsing and generation
//!
//! A PFM header is three newline terminated ASCII lines
//!
//! ```text
//! PF            <- identifier, `Pf` for grayscale, `PF` for RGB
//! 640 480       <- width and height
//! -1.0          <- scale, negative for little endian, positive for big endian
//! ```
use core::fmt::{Display, Formatter};

use zune_core::colorspace::ColorSpace;

use crate::errors::{PfmDecodeErrors, PfmEncodeErrors};
use crate::image::PfmImage;
use crate::shape::channels_for_shape;

/// PFM image variant, determined by the identifier line
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PfmVersion {
    /// `Pf`, a single channel per pixel
    Grayscale,
    /// `PF`, three channels per pixel
    Color
}

impl PfmVersion {
    /// Parse the identifier line
    ///
    /// Trailing whitespace is ignored
    ///
    /// # Example
    /// ```
    /// use zune_pfm::PfmVersion;
    ///
    /// assert_eq!(PfmVersion::from_line(b"Pf").unwrap().num_channels(), 1);
    /// assert_eq!(PfmVersion::from_line(b"PF\n").unwrap().num_channels(), 3);
    /// assert!(PfmVersion::from_line(b"P6").is_err());
    /// ```
    pub fn from_line(line: &[u8]) -> Result<PfmVersion, PfmDecodeErrors> {
        match line.trim_ascii_end() {
            b"Pf" => Ok(PfmVersion::Grayscale),
            b"PF" => Ok(PfmVersion::Color),
            other => Err(PfmDecodeErrors::InvalidHeader(format!(
                "Unknown identifier `{}`, expected `Pf` or `PF`",
                String::from_utf8_lossy(other)
            )))
        }
    }

    /// Map a channel count to its version, `None` for counts
    /// other than 1 and 3
    pub const fn from_channels(channels: usize) -> Option<PfmVersion> {
        match channels {
            1 => Some(PfmVersion::Grayscale),
            3 => Some(PfmVersion::Color),
            _ => None
        }
    }

    /// Identifier for an array of the given shape, `None` if the shape
    /// can't be stored as PFM
    pub fn from_shape(shape: &[usize]) -> Option<PfmVersion> {
        Self::from_channels(channels_for_shape(shape)?)
    }

    pub const fn num_channels(self) -> usize {
        match self {
            PfmVersion::Grayscale => 1,
            PfmVersion::Color => 3
        }
    }

    pub const fn colorspace(self) -> ColorSpace {
        match self {
            PfmVersion::Grayscale => ColorSpace::Luma,
            PfmVersion::Color => ColorSpace::RGB
        }
    }
}

impl Display for PfmVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Grayscale => write!(f, "Pf"),
            Self::Color => write!(f, "PF")
        }
    }
}

/// Byte order of the pixel data
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PfmEndian {
    Little,
    Big
}

impl PfmEndian {
    /// Byte order of the machine we are running on
    pub const fn native() -> PfmEndian {
        if cfg!(target_endian = "little") {
            PfmEndian::Little
        } else {
            PfmEndian::Big
        }
    }

    /// Sign the scale value carries for this byte order
    pub const fn sign(self) -> f32 {
        match self {
            PfmEndian::Little => -1.0,
            PfmEndian::Big => 1.0
        }
    }
}

/// Parse the dimension line into `(width, height)`
///
/// The line must contain exactly two whitespace separated positive
/// integers, width comes first.
///
/// # Example
/// ```
/// use zune_pfm::parse_dimensions_line;
///
/// assert_eq!(parse_dimensions_line(b"6 5\n").unwrap(), (6, 5));
/// assert!(parse_dimensions_line(b"1").is_err());
/// ```
pub fn parse_dimensions_line(line: &[u8]) -> Result<(usize, usize), PfmDecodeErrors> {
    let text = core::str::from_utf8(line).map_err(|_| {
        PfmDecodeErrors::InvalidHeader("Dimension line is not valid ASCII".to_string())
    })?;

    let mut tokens = text.split_ascii_whitespace();

    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(width), Some(height), None) => {
            let width = parse_dimension(width, "width")?;
            let height = parse_dimension(height, "height")?;
            Ok((width, height))
        }
        _ => Err(PfmDecodeErrors::InvalidHeader(format!(
            "Expected `<width> <height>` but found `{}`",
            text.trim()
        )))
    }
}

fn parse_dimension(token: &str, name: &str) -> Result<usize, PfmDecodeErrors> {
    match token.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        Ok(_) => Err(PfmDecodeErrors::InvalidHeader(format!(
            "Image {name} must be greater than zero"
        ))),
        Err(err) => Err(PfmDecodeErrors::InvalidHeader(format!(
            "Could not parse {name} `{token}`: {err}"
        )))
    }
}

/// Parse the scale line into its magnitude and the byte order its
/// sign encodes
///
/// # Example
/// ```
/// use zune_pfm::{parse_scale_line, PfmEndian};
///
/// assert_eq!(parse_scale_line(b"-1.0").unwrap(), (1.0, PfmEndian::Little));
/// assert_eq!(parse_scale_line(b"1.0").unwrap(), (1.0, PfmEndian::Big));
/// assert!(parse_scale_line(b"0.0").is_err());
/// ```
pub fn parse_scale_line(line: &[u8]) -> Result<(f32, PfmEndian), PfmDecodeErrors> {
    let text = core::str::from_utf8(line)
        .map_err(|_| PfmDecodeErrors::InvalidHeader("Scale line is not valid ASCII".to_string()))?
        .trim();

    // parse wide so that tiny non-zero scales don't round to zero before
    // their sign is read
    let scale = text.parse::<f64>().map_err(|err| {
        PfmDecodeErrors::InvalidHeader(format!("Could not parse scale `{text}`: {err}"))
    })?;

    if scale == 0.0 || scale.is_nan() {
        return Err(PfmDecodeErrors::InvalidScale(scale as f32));
    }
    let endian = if scale < 0.0 {
        PfmEndian::Little
    } else {
        PfmEndian::Big
    };
    // smallest positive subnormal, magnitudes below it would become zero
    let magnitude = (scale.abs() as f32).max(f32::from_bits(1));

    Ok((magnitude, endian))
}

/// Width and height of an array, width is axis 1, height is axis 0
///
/// Returns `None` for arrays with fewer than two axes
pub fn dimensions_from_shape(shape: &[usize]) -> Option<(usize, usize)> {
    match shape {
        [height, width, ..] => Some((*width, *height)),
        _ => None
    }
}

/// A decoded PFM header
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PfmHeader {
    pub version: PfmVersion,
    pub width:   usize,
    pub height:  usize,
    /// Scale magnitude, always positive
    pub scale:   f32,
    pub endian:  PfmEndian
}

impl PfmHeader {
    /// Derive the header needed to store `image` on this machine
    ///
    /// The sign of `scale` is ignored, the stored sign always reflects
    /// the native byte order.
    ///
    /// # Errors
    /// - [`InvalidScale`](PfmEncodeErrors::InvalidScale): `scale` is zero or NaN
    /// - [`InvalidShape`](PfmEncodeErrors::InvalidShape): the shape isn't a PFM shape
    /// - [`InvalidDataType`](PfmEncodeErrors::InvalidDataType): samples aren't `f32`
    pub fn from_image(image: &PfmImage, scale: f32) -> Result<PfmHeader, PfmEncodeErrors> {
        if scale == 0.0 || scale.is_nan() {
            return Err(PfmEncodeErrors::InvalidScale(scale));
        }
        let shape = image.shape();

        let version = PfmVersion::from_shape(shape)
            .ok_or_else(|| PfmEncodeErrors::InvalidShape(shape.to_vec()))?;

        if image.as_f32().is_none() {
            return Err(PfmEncodeErrors::InvalidDataType(image.data().type_name()));
        }
        let (width, height) = dimensions_from_shape(shape)
            .ok_or_else(|| PfmEncodeErrors::InvalidShape(shape.to_vec()))?;

        Ok(PfmHeader {
            version,
            width,
            height,
            scale: scale.abs(),
            endian: PfmEndian::native()
        })
    }

    /// Scale as stored in the file, its sign carries the byte order
    pub fn signed_scale(&self) -> f32 {
        self.endian.sign() * self.scale
    }

    /// Number of bytes in the pixel payload, `None` on overflow
    pub fn payload_size(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.version.num_channels())?
            .checked_mul(core::mem::size_of::<f32>())
    }

    /// Render the three header lines
    pub fn to_bytes(&self) -> Vec<u8> {
        // Debug formatting gives the shortest representation that
        // parses back to the same float, e.g -1.0 or 1e-9
        format!(
            "{}\n{} {}\n{:?}\n",
            self.version,
            self.width,
            self.height,
            self.signed_scale()
        )
        .into_bytes()
    }
}
