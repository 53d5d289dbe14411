#![no_main]
use imgcodec::rle::{decode_channel, encode_channel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let encoded = encode_channel(data);
    let decoded = decode_channel(&encoded).expect("encoder output must always decode");
    assert_eq!(decoded, data);
});
