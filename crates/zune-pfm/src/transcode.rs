/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion between PFM pixel payloads and float samples
//!
//! PFM stores scanlines bottom to top, i.e the first row in the file is the
//! last row of the image. Both directions below undo that while copying,
//! so the flip happens exactly once per direction.
//!
//! ```text
//! file           memory
//! ┌─────────┐   ┌─────────┐
//! │f g h i j│   │a b c d e│
//! │a b c d e│   │f g h i j│
//! └─────────┘   └─────────┘
//! ```
use std::io::Write;

use crate::header::PfmEndian;

const SAMPLE_SIZE: usize = core::mem::size_of::<f32>();

/// Decode raw payload bytes into `output` in top to bottom row order
///
/// `row_stride` is the number of samples per row, i.e `width * channels`.
///
/// `input` and `output` are expected to hold the same number of samples,
/// `input` being `output.len() * 4` bytes.
pub(crate) fn decode_rows(input: &[u8], endian: PfmEndian, row_stride: usize, output: &mut [f32]) {
    let convert = match endian {
        PfmEndian::Little => f32::from_le_bytes,
        PfmEndian::Big => f32::from_be_bytes
    };

    for (in_row, out_row) in input
        .chunks_exact(row_stride * SAMPLE_SIZE)
        .zip(output.rchunks_exact_mut(row_stride))
    {
        for (bytes, sample) in in_row.chunks_exact(SAMPLE_SIZE).zip(out_row.iter_mut()) {
            // chunks_exact guarantees four bytes
            let mut sample_bytes = [0; SAMPLE_SIZE];
            sample_bytes.copy_from_slice(bytes);

            *sample = convert(sample_bytes);
        }
    }
}

/// Write `input` samples to `writer` as native endian bytes, bottom row first
///
/// Returns the number of bytes written
pub(crate) fn encode_rows<W: Write>(
    input: &[f32], row_stride: usize, writer: &mut W
) -> std::io::Result<usize> {
    let mut scanline = vec![0_u8; row_stride * SAMPLE_SIZE];
    let mut written = 0;

    for in_row in input.chunks_exact(row_stride).rev() {
        for (sample, out) in in_row
            .iter()
            .zip(scanline.chunks_exact_mut(SAMPLE_SIZE))
        {
            out.copy_from_slice(&sample.to_ne_bytes());
        }
        writer.write_all(&scanline)?;
        written += scanline.len();
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes(samples: &[f32], endian: PfmEndian) -> Vec<u8> {
        samples
            .iter()
            .flat_map(|x| match endian {
                PfmEndian::Little => x.to_le_bytes(),
                PfmEndian::Big => x.to_be_bytes()
            })
            .collect()
    }

    #[test]
    fn decode_flips_rows() {
        // file order: bottom row (3,4,5) first
        let payload = to_bytes(&[3.0, 4.0, 5.0, 0.0, 1.0, 2.0], PfmEndian::Little);
        let mut out = vec![0.0; 6];

        decode_rows(&payload, PfmEndian::Little, 3, &mut out);

        assert_eq!(out, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn decode_honours_byte_order() {
        let samples = [1.5_f32, -2.25, 1e-20, f32::MAX];
        let mut little = vec![0.0; 4];
        let mut big = vec![0.0; 4];

        decode_rows(&to_bytes(&samples, PfmEndian::Little), PfmEndian::Little, 4, &mut little);
        decode_rows(&to_bytes(&samples, PfmEndian::Big), PfmEndian::Big, 4, &mut big);

        assert_eq!(little, samples);
        assert_eq!(big, samples);
    }

    #[test]
    fn encode_writes_bottom_row_first() {
        let samples = [0.0_f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        let mut out = vec![];

        let written = encode_rows(&samples, 2, &mut out).unwrap();

        assert_eq!(written, 24);
        let expected: Vec<u8> = [4.0_f32, 5.0, 2.0, 3.0, 0.0, 1.0]
            .iter()
            .flat_map(|x| x.to_ne_bytes())
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn encode_then_decode_is_identity() {
        use nanorand::Rng;

        let (width, height, channels) = (7, 5, 3);
        let mut rand = nanorand::WyRand::new();
        let samples: Vec<f32> = (0..width * height * channels)
            .map(|_| rand.generate::<u32>() as f32 / 17.0)
            .collect();

        let mut payload = vec![];
        encode_rows(&samples, width * channels, &mut payload).unwrap();

        let mut decoded = vec![0.0; samples.len()];
        decode_rows(&payload, PfmEndian::native(), width * channels, &mut decoded);

        assert_eq!(decoded, samples);
    }
}
