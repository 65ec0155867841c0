/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Portable Float Map (PFM) decoder and encoder
//!
//! PFM stores a grid of 32-bit floats, one (`Pf`) or three (`PF`) channels
//! per pixel, after a three line ASCII header
//!
//! ```text
//! ╔══════════════╤══════════════════════════════════════════════════════╗
//! ║ Line         │ Description                                          ║
//! ╠══════════════╪══════════════════════════════════════════════════════╣
//! ║ `Pf` / `PF`  │ Grayscale or RGB                                     ║
//! ╟──────────────┼──────────────────────────────────────────────────────╢
//! ║ `<w> <h>`    │ Width then height                                    ║
//! ╟──────────────┼──────────────────────────────────────────────────────╢
//! ║ `<scale>`    │ Scale factor, negative for little endian data        ║
//! ╟──────────────┼──────────────────────────────────────────────────────╢
//! ║ [4444]       │ f32 samples, bottom row first, channels interleaved  ║
//! ╚══════════════╧══════════════════════════════════════════════════════╝
//! ```
//!
//! # Features
//! - Minimal interface, few dependencies
//! - No unsafe
//! - Reads files of either byte order, writes in native byte order
//!
//! # Usage notes
//! Images are returned top row first, the bottom to top storage order
//! is handled by the library.
//!
//! The scale factor is exposed by [`PfmDecoder::scale`] but never applied to the samples.
//!
//! # Example
//! ```no_run
//! use zune_pfm::{read_pfm, write_pfm, PfmImage};
//!
//! let image = PfmImage::from_f32(&[2, 2, 3], vec![0.5; 12]).unwrap();
//! write_pfm("sample.pfm", &image, 1.0).unwrap();
//!
//! let decoded = read_pfm("sample.pfm").unwrap();
//! assert_eq!(decoded, image);
//! ```
#![forbid(unsafe_code)]
pub extern crate zune_core;

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub use decoder::PfmDecoder;
pub use encoder::PfmEncoder;
pub use errors::{PfmDecodeErrors, PfmEncodeErrors};
pub use header::{
    dimensions_from_shape, parse_dimensions_line, parse_scale_line, PfmEndian, PfmHeader,
    PfmVersion
};
pub use image::{PfmImage, PixelData};
pub use shape::{channels_for_shape, is_valid_shape};

mod decoder;
mod encoder;
mod errors;
mod header;
mod image;
mod shape;
mod transcode;

/// Read a PFM file into memory
///
/// The file handle is closed before returning, whether decoding
/// succeeded or not.
///
/// # Errors
/// - [`InvalidHeader`](PfmDecodeErrors::InvalidHeader): malformed header lines
/// - [`InvalidScale`](PfmDecodeErrors::InvalidScale): the scale is zero
/// - [`TruncatedData`](PfmDecodeErrors::TruncatedData): the payload is too short
/// - [`IoErrors`](PfmDecodeErrors::IoErrors): the file couldn't be opened or read
pub fn read_pfm<P: AsRef<Path>>(path: P) -> Result<PfmImage, PfmDecodeErrors> {
    let file = File::open(path)?;

    PfmDecoder::new(BufReader::new(file)).decode()
}

/// Write `data` to a PFM file at `path`, replacing any existing file
///
/// Only the magnitude of `scale` is stored, its sign is replaced by the
/// native byte order marker. Validation happens before the file is
/// created, so an invalid image leaves the filesystem untouched.
///
/// # Errors
/// - [`InvalidScale`](PfmEncodeErrors::InvalidScale): `scale` is zero
/// - [`InvalidShape`](PfmEncodeErrors::InvalidShape): shape isn't `(h, w)`, `(h, w, 1)` or `(h, w, 3)`
/// - [`InvalidDataType`](PfmEncodeErrors::InvalidDataType): samples aren't `f32`
/// - [`IoErrors`](PfmEncodeErrors::IoErrors): the file couldn't be created or written
pub fn write_pfm<P: AsRef<Path>>(
    path: P, data: &PfmImage, scale: f32
) -> Result<(), PfmEncodeErrors> {
    let mut encoder = PfmEncoder::new(data);
    encoder.set_scale(scale);
    encoder.header()?;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut writer = BufWriter::new(file);
    encoder.encode(&mut writer)?;
    // flush explicitly, errors on drop are discarded
    writer.flush()?;

    Ok(())
}
