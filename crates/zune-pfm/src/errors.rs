/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};
use std::io;

/// PFM decoding errors
pub enum PfmDecodeErrors {
    /// The header is malformed, the string carries the reason
    ///
    /// Raised for an identifier other than `Pf`/`PF`, a dimension
    /// line that isn't exactly two positive integers, or a scale line
    /// that isn't a number
    InvalidHeader(String),
    /// The scale factor is zero (or NaN) and thus cannot encode endianness
    InvalidScale(f32),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// The payload is shorter than the header declares,
    /// expected vs found bytes
    TruncatedData(usize, usize),
    /// Bytes present after the payload, only raised in strict mode
    TrailingData(usize),
    /// The output array is too small to contain the whole
    /// image
    TooSmallOutputArray(usize, usize),
    IoErrors(io::Error)
}

impl Debug for PfmDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PfmDecodeErrors::InvalidHeader(reason) => {
                writeln!(f, "Invalid header, reason: {reason}")
            }
            PfmDecodeErrors::InvalidScale(scale) => {
                writeln!(
                    f,
                    "Invalid scale {scale}, scale must be a non-zero number whose sign encodes endianness"
                )
            }
            PfmDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            PfmDecodeErrors::TruncatedData(expected, found) => {
                writeln!(
                    f,
                    "Truncated data, expected {expected} bytes of pixel data but found {found}"
                )
            }
            PfmDecodeErrors::TrailingData(extra) => {
                writeln!(f, "Found at least {extra} unexpected byte(s) after pixel data")
            }
            PfmDecodeErrors::TooSmallOutputArray(expected, found) => {
                writeln!(f, "Too small of an output array, expected array of at least length {} but found {}", expected, found)
            }
            PfmDecodeErrors::IoErrors(err) => {
                writeln!(f, "I/O error {:?}", err)
            }
        }
    }
}

impl From<io::Error> for PfmDecodeErrors {
    fn from(value: io::Error) -> Self {
        PfmDecodeErrors::IoErrors(value)
    }
}

impl Display for PfmDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for PfmDecodeErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PfmDecodeErrors::IoErrors(err) => Some(err),
            _ => None
        }
    }
}

/// PFM encoding errors
pub enum PfmEncodeErrors {
    /// The scale is zero or NaN
    InvalidScale(f32),
    /// The image shape is not `(h, w)`, `(h, w, 1)` or `(h, w, 3)`
    InvalidShape(Vec<usize>),
    /// The image samples are not 32-bit floats, carries
    /// the name of the type found
    InvalidDataType(&'static str),
    /// The input size was expected to be of a certain size but isn't
    WrongInputSize(usize, usize),
    /// Generic message
    Static(&'static str),
    IoErrors(io::Error)
}

impl Debug for PfmEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            PfmEncodeErrors::InvalidScale(scale) => {
                writeln!(f, "Invalid scale {scale}, scale must be a non-zero number")
            }
            PfmEncodeErrors::InvalidShape(shape) => {
                writeln!(
                    f,
                    "Invalid shape {shape:?} for PFM, expected (h, w), (h, w, 1) or (h, w, 3)"
                )
            }
            PfmEncodeErrors::InvalidDataType(found) => {
                writeln!(f, "Unsupported data type {found}, PFM only stores f32 data")
            }
            PfmEncodeErrors::WrongInputSize(expected, found) => {
                writeln!(f, "Input array length {found} doesn't match {expected}")
            }
            PfmEncodeErrors::Static(err) => writeln!(f, "{}", err),
            PfmEncodeErrors::IoErrors(err) => writeln!(f, "I/O error {:?}", err)
        }
    }
}

impl Display for PfmEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for PfmEncodeErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PfmEncodeErrors::IoErrors(err) => Some(err),
            _ => None
        }
    }
}

impl From<&'static str> for PfmEncodeErrors {
    fn from(value: &'static str) -> Self {
        PfmEncodeErrors::Static(value)
    }
}

impl From<io::Error> for PfmEncodeErrors {
    fn from(value: io::Error) -> Self {
        PfmEncodeErrors::IoErrors(value)
    }
}
