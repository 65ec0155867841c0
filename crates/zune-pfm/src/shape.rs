/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Shape validation for images about to be written as PFM

/// Return the number of channels an array of `shape` would be stored with,
/// or `None` if PFM cannot represent that shape.
///
/// Accepted shapes are
/// - `(height, width)`: one channel
/// - `(height, width, 1)`: one channel
/// - `(height, width, 3)`: three channels
///
/// Height and width must be non-zero since the header cannot carry
/// zero dimensions.
///
/// # Example
/// ```
/// use zune_pfm::channels_for_shape;
///
/// assert_eq!(channels_for_shape(&[5, 5]), Some(1));
/// assert_eq!(channels_for_shape(&[5, 5, 3]), Some(3));
/// assert_eq!(channels_for_shape(&[5, 5, 2]), None);
/// ```
pub fn channels_for_shape(shape: &[usize]) -> Option<usize> {
    let channels = match shape {
        [_, _] => 1,
        [_, _, c @ (1 | 3)] => *c,
        _ => return None
    };
    if shape[0] == 0 || shape[1] == 0 {
        return None;
    }
    Some(channels)
}

/// Return true if `shape` can be stored as a PFM image
///
/// See [`channels_for_shape`] for the accepted shapes
pub fn is_valid_shape(shape: &[usize]) -> bool {
    channels_for_shape(shape).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_shapes_are_valid() {
        assert!(is_valid_shape(&[5, 5]));
        assert!(is_valid_shape(&[5, 5, 1]));
        assert_eq!(channels_for_shape(&[5, 5]), Some(1));
        assert_eq!(channels_for_shape(&[5, 5, 1]), Some(1));
    }

    #[test]
    fn color_shape_is_valid() {
        assert!(is_valid_shape(&[5, 5, 3]));
        assert_eq!(channels_for_shape(&[4, 7, 3]), Some(3));
    }

    #[test]
    fn one_dimensional_shape_is_invalid() {
        assert!(!is_valid_shape(&[5]));
        assert!(!is_valid_shape(&[]));
    }

    #[test]
    fn unsupported_channel_counts_are_invalid() {
        assert!(!is_valid_shape(&[5, 5, 2]));
        assert!(!is_valid_shape(&[5, 5, 4]));
        assert!(!is_valid_shape(&[5, 5, 3, 1]));
    }

    #[test]
    fn zero_sized_dimensions_are_invalid() {
        assert!(!is_valid_shape(&[0, 5]));
        assert!(!is_valid_shape(&[5, 0, 3]));
    }
}
