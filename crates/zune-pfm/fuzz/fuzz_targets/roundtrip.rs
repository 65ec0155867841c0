#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use std::io::Cursor;

    use zune_pfm::{PfmDecoder, PfmEncoder};

    let mut decoder = PfmDecoder::new(Cursor::new(data));

    if let Ok(image) = decoder.decode() {
        let mut encoded = vec![];
        PfmEncoder::new(&image).encode(&mut encoded).unwrap();

        let decoded = PfmDecoder::new(Cursor::new(encoded)).decode().unwrap();
        // compare bit patterns, NaN samples are allowed
        let a: Vec<u32> = image.as_f32().unwrap().iter().map(|x| x.to_bits()).collect();
        let b: Vec<u32> = decoded.as_f32().unwrap().iter().map(|x| x.to_bits()).collect();
        assert_eq!(a, b);
        assert_eq!(image.shape(), decoded.shape());
    }
});
